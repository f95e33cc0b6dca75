use std::sync::Arc;

use tandem_core::{IceCandidate, IceServerConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::negotiation::Epoch;
use crate::transport::{PeerTransport, SdpKind, TransportEvent, TransportEvents, TransportFactory};

/// Work queued for the transport of one negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportOp {
    CreateOffer,
    /// Apply the partner's offer, then answer it.
    AcceptOffer(String),
    AcceptAnswer(String),
    AddCandidate(IceCandidate),
}

/// Result of a [`TransportOp`], reported back to the negotiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkerReport {
    OfferReady(String),
    AnswerReady(String),
    RemoteDescriptionSet,
    CandidateRejected(String),
    Failed(String),
}

/// Everything that reaches the negotiator from inside, tagged with its negotiation.
pub(crate) enum Internal<R> {
    Worker { epoch: Epoch, report: WorkerReport },
    Transport { epoch: Epoch, event: TransportEvent<R> },
}

/// Owner's side of a running worker. Dropping it cancels the worker.
pub(crate) struct WorkerHandle {
    ops: mpsc::UnboundedSender<TransportOp>,
    cancel: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub(crate) fn submit(&self, op: TransportOp) {
        if self.ops.send(op).is_err() {
            debug!("Transport worker already gone, op dropped");
        }
    }

    /// Stop the worker. The returned handle completes once its transport is closed.
    pub(crate) fn retire(mut self) -> JoinHandle<()> {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        self.join
    }
}

/// Runs the transport operations of a single negotiation, one at a time, in the order
/// they were submitted.
pub(crate) struct TransportWorker<F: TransportFactory> {
    factory: Arc<F>,
    local: F::Local,
    ice_servers: Vec<IceServerConfig>,
    epoch: Epoch,
    internal_tx: mpsc::UnboundedSender<Internal<F::Remote>>,
}

impl<F: TransportFactory> TransportWorker<F> {
    pub(crate) fn new(
        factory: Arc<F>,
        local: F::Local,
        ice_servers: Vec<IceServerConfig>,
        epoch: Epoch,
        internal_tx: mpsc::UnboundedSender<Internal<F::Remote>>,
    ) -> Self {
        Self {
            factory,
            local,
            ice_servers,
            epoch,
            internal_tx,
        }
    }

    /// Start the worker. It opens its transport only after `previous` has finished, so two
    /// transports of the same client never overlap.
    pub(crate) fn spawn(self, previous: Option<JoinHandle<()>>) -> WorkerHandle {
        let (ops, ops_rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(ops_rx, cancel_rx, previous));

        WorkerHandle {
            ops,
            cancel: Some(cancel),
            join,
        }
    }

    async fn run(
        self,
        mut ops_rx: mpsc::UnboundedReceiver<TransportOp>,
        mut cancel_rx: oneshot::Receiver<()>,
        previous: Option<JoinHandle<()>>,
    ) {
        if let Some(previous) = previous {
            tokio::select! {
                _ = &mut cancel_rx => return,
                _ = previous => {}
            }
        }

        let events = TransportEvents::new(self.epoch, self.internal_tx.clone());
        let opened = tokio::select! {
            _ = &mut cancel_rx => return,
            res = self.factory.open(&self.local, &self.ice_servers, events) => res,
        };
        let transport = match opened {
            Ok(t) => t,
            Err(e) => {
                self.report(WorkerReport::Failed(format!("could not open transport: {}", e)));
                return;
            }
        };
        debug!(epoch = self.epoch, "Transport opened");

        loop {
            let op = tokio::select! {
                biased;
                _ = &mut cancel_rx => break,
                op = ops_rx.recv() => match op {
                    Some(op) => op,
                    None => break,
                },
            };

            let done = tokio::select! {
                biased;
                _ = &mut cancel_rx => break,
                res = self.execute(&transport, op) => res,
            };
            if let Err(e) = done {
                self.report(WorkerReport::Failed(e.to_string()));
            }
        }

        if let Err(e) = transport.close().await {
            warn!(epoch = self.epoch, "Error closing transport: {}", e);
        }
        debug!(epoch = self.epoch, "Transport closed");
    }

    async fn execute(&self, transport: &F::Transport, op: TransportOp) -> Result<(), TransportError> {
        match op {
            TransportOp::CreateOffer => {
                let sdp = transport.create_offer().await?;
                self.report(WorkerReport::OfferReady(sdp));
            }
            TransportOp::AcceptOffer(sdp) => {
                transport.set_remote_description(SdpKind::Offer, sdp).await?;
                self.report(WorkerReport::RemoteDescriptionSet);
                let answer = transport.create_answer().await?;
                self.report(WorkerReport::AnswerReady(answer));
            }
            TransportOp::AcceptAnswer(sdp) => {
                transport.set_remote_description(SdpKind::Answer, sdp).await?;
                self.report(WorkerReport::RemoteDescriptionSet);
            }
            TransportOp::AddCandidate(candidate) => {
                // A single bad candidate does not sink the negotiation.
                if let Err(e) = transport.add_ice_candidate(candidate).await {
                    self.report(WorkerReport::CandidateRejected(e.to_string()));
                }
            }
        }
        Ok(())
    }

    fn report(&self, report: WorkerReport) {
        let _ = self.internal_tx.send(Internal::Worker {
            epoch: self.epoch,
            report,
        });
    }
}
