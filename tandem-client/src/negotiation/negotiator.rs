use std::sync::Arc;

use tandem_core::{
    ClientMessage, ConnectionId, IceServerConfig, Role, ServerMessage, SignalPayload,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::negotiation::session::PeerNegotiation;
use crate::negotiation::worker::{Internal, TransportOp, TransportWorker, WorkerReport};
use crate::negotiation::{
    ChatLine, ClientCommand, ClientStatus, Epoch, NegotiatorHandle, NegotiatorInput, Phase,
};
use crate::transport::{MediaDevice, TransportEvent, TransportFactory, TransportState};

const INPUT_CAPACITY: usize = 64;

/// Client-side actor that owns the pairing lifecycle and the handshake with the current
/// partner.
///
/// Every transport result comes back tagged with the epoch of the negotiation that
/// produced it. Ending a negotiation drops it synchronously, so anything still in flight
/// for it is recognised as stale and discarded.
pub struct Negotiator<M, F>
where
    M: MediaDevice,
    F: TransportFactory<Local = M::Local, Remote = M::Remote>,
{
    media: Arc<M>,
    factory: Arc<F>,
    local: Option<M::Local>,
    media_failed: bool,
    ice_servers: Vec<IceServerConfig>,
    self_id: Option<ConnectionId>,
    /// Skips sent but not yet answered with `Waiting`. A pairing that arrives meanwhile was
    /// made before the server saw the skip and is already undone.
    unacked_skips: usize,

    phase: Phase,
    epoch: Epoch,
    current: Option<PeerNegotiation>,
    /// Worker of the last negotiation, possibly still closing its transport.
    retired: Option<JoinHandle<()>>,

    input_rx: mpsc::Receiver<NegotiatorInput>,
    internal_tx: mpsc::UnboundedSender<Internal<M::Remote>>,
    internal_rx: mpsc::UnboundedReceiver<Internal<M::Remote>>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    status: watch::Sender<ClientStatus>,
    chat: mpsc::UnboundedSender<ChatLine>,
}

impl<M, F> Negotiator<M, F>
where
    M: MediaDevice,
    F: TransportFactory<Local = M::Local, Remote = M::Remote>,
{
    /// Start a negotiator on the current runtime. Messages for the server are written to
    /// `outbound`.
    pub fn spawn(
        media: Arc<M>,
        factory: Arc<F>,
        ice_servers: Vec<IceServerConfig>,
        outbound: mpsc::UnboundedSender<ClientMessage>,
    ) -> NegotiatorHandle {
        let (input, input_rx) = mpsc::channel(INPUT_CAPACITY);
        let (status, status_rx) = watch::channel(ClientStatus::Starting);
        let (chat, chat_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        let negotiator = Self {
            media,
            factory,
            local: None,
            media_failed: false,
            ice_servers,
            self_id: None,
            unacked_skips: 0,
            phase: Phase::Idle,
            epoch: 0,
            current: None,
            retired: None,
            input_rx,
            internal_tx,
            internal_rx,
            outbound,
            status,
            chat,
        };
        tokio::spawn(negotiator.run());

        NegotiatorHandle {
            input,
            status: status_rx,
            chat: chat_rx,
        }
    }

    async fn run(mut self) {
        self.acquire_media().await;

        loop {
            tokio::select! {
                input = self.input_rx.recv() => match input {
                    Some(NegotiatorInput::Disconnected) | None => {
                        self.on_disconnected();
                        break;
                    }
                    Some(input) => self.handle_input(input),
                },
                Some(internal) = self.internal_rx.recv() => self.handle_internal(internal),
            }
        }

        if let Some(retired) = self.retired.take() {
            let _ = retired.await;
        }
        info!("Negotiator stopped");
    }

    async fn acquire_media(&mut self) {
        match self.media.acquire().await {
            Ok(local) => {
                info!("Local media ready");
                self.local = Some(local);
                self.set_status(ClientStatus::Ready);
            }
            Err(e) => {
                warn!("Could not acquire local media: {}", e);
                self.media_failed = true;
                self.set_status(ClientStatus::MediaUnavailable(e.to_string()));
            }
        }
    }

    fn handle_input(&mut self, input: NegotiatorInput) {
        match input {
            NegotiatorInput::Command(cmd) => self.handle_command(cmd),
            NegotiatorInput::Server(msg) => self.handle_server_message(msg),
            NegotiatorInput::QueryPhase(reply) => {
                let _ = reply.send(self.phase);
            }
            NegotiatorInput::Disconnected => self.on_disconnected(),
        }
    }

    fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::Find => {
                if self.media_failed || self.local.is_none() {
                    warn!("Cannot search without local media");
                    return;
                }
                if !matches!(self.phase, Phase::Idle | Phase::Closed) {
                    debug!("Ignoring find in {:?}", self.phase);
                    return;
                }
                self.send(ClientMessage::Find);
                self.phase = Phase::Searching;
                self.set_status(ClientStatus::Searching);
            }

            ClientCommand::Skip => {
                if self.local.is_none() || self.phase == Phase::Idle {
                    debug!("Ignoring skip in {:?}", self.phase);
                    return;
                }
                self.end_negotiation("skipped");
                self.send(ClientMessage::Skip);
                self.unacked_skips += 1;
                self.phase = Phase::Searching;
                self.set_status(ClientStatus::Searching);
            }

            ClientCommand::Stop => {
                if self.phase == Phase::Idle {
                    return;
                }
                self.end_negotiation("stopped");
                self.send(ClientMessage::Stop);
                self.phase = Phase::Idle;
                self.set_status(ClientStatus::Stopped);
            }

            ClientCommand::Chat(text) => {
                if self.current.is_none() {
                    debug!("No partner, chat dropped");
                    return;
                }
                self.send(ClientMessage::Chat { text });
            }
        }
    }

    fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { connection_id } => {
                info!("Server assigned id {}", connection_id);
                self.self_id = Some(connection_id);
            }

            ServerMessage::IceConfig { ice_servers } => {
                if !ice_servers.is_empty() {
                    debug!("Using {} ICE server(s) from server", ice_servers.len());
                    self.ice_servers = ice_servers;
                }
            }

            ServerMessage::Waiting => {
                self.unacked_skips = self.unacked_skips.saturating_sub(1);
                if self.phase == Phase::Searching {
                    info!("Waiting for a partner");
                } else {
                    debug!("Ignoring waiting notice in {:?}", self.phase);
                }
            }

            ServerMessage::Paired { partner, role } => {
                if matches!(self.phase, Phase::Idle | Phase::Closed) {
                    debug!("Ignoring pairing with {} in {:?}", partner, self.phase);
                    return;
                }
                if self.unacked_skips > 0 {
                    debug!("Ignoring pairing with {} made before our skip", partner);
                    return;
                }
                if self.self_id == Some(partner) {
                    warn!("Server paired us with ourselves, ignored");
                    return;
                }
                self.end_negotiation("re-paired");
                self.start_negotiation(partner, role);
            }

            ServerMessage::Signal { from, payload } => self.handle_signal(from, payload),

            ServerMessage::Chat { text } => match &self.current {
                Some(negotiation) => {
                    let _ = self.chat.send(ChatLine {
                        from: negotiation.partner,
                        text,
                    });
                }
                None => debug!("Chat without a partner dropped"),
            },

            ServerMessage::PartnerLeft => {
                if self.current.is_none() {
                    debug!("Ignoring partner-left in {:?}", self.phase);
                    return;
                }
                self.end_negotiation("partner left");
                self.phase = Phase::Closed;
                self.set_status(ClientStatus::PartnerLeft);
            }
        }
    }

    fn start_negotiation(&mut self, partner: ConnectionId, role: Role) {
        let Some(local) = self.local.clone() else {
            warn!("Paired with {} but local media is missing", partner);
            return;
        };

        self.epoch += 1;
        info!(epoch = self.epoch, "Paired with {} as {}", partner, role);

        let worker = TransportWorker::new(
            self.factory.clone(),
            local,
            self.ice_servers.clone(),
            self.epoch,
            self.internal_tx.clone(),
        )
        .spawn(self.retired.take());
        self.current = Some(PeerNegotiation::new(partner, role, self.epoch, worker));
        self.phase = Phase::Paired;
        self.set_status(ClientStatus::Negotiating { partner, role });
        self.act_on_role();
    }

    fn act_on_role(&mut self) {
        let Some(negotiation) = self.current.as_ref().filter(|_| self.phase == Phase::Paired)
        else {
            return;
        };
        self.phase = match negotiation.role {
            Role::Initiator => {
                negotiation.submit(TransportOp::CreateOffer);
                Phase::Offering
            }
            Role::Responder => Phase::AwaitingOffer,
        };
    }

    /// Close the transport, forget the partner and its buffered candidates.
    fn end_negotiation(&mut self, reason: &str) {
        let Some(negotiation) = self.current.take() else {
            return;
        };
        info!(
            epoch = negotiation.epoch,
            "Ending negotiation with {} ({}): {}", negotiation.partner, negotiation.role, reason
        );

        self.retired = Some(negotiation.teardown());
        self.media.detach_remote();
        self.phase = Phase::Closed;
    }

    fn handle_signal(&mut self, from: ConnectionId, payload: SignalPayload) {
        let phase = self.phase;
        let Some(negotiation) = self.current.as_mut() else {
            debug!("Signal from {} without a negotiation, ignored", from);
            return;
        };
        if negotiation.partner != from {
            debug!("Signal from {} who is not our partner, ignored", from);
            return;
        }

        match (phase, payload) {
            (Phase::AwaitingOffer, SignalPayload::Offer { sdp }) => {
                negotiation.apply_remote_description(TransportOp::AcceptOffer(sdp));
                self.phase = Phase::AwaitingLocalAnswer;
            }
            (Phase::AwaitingAnswer, SignalPayload::Answer { sdp }) => {
                negotiation.apply_remote_description(TransportOp::AcceptAnswer(sdp));
                self.phase = Phase::ConnectPending;
            }
            (_, SignalPayload::Candidate(candidate)) => {
                negotiation.add_remote_candidate(candidate);
                if negotiation.pending_len() > 0 {
                    debug!("{} candidate(s) buffered", negotiation.pending_len());
                }
            }
            (phase, payload) => {
                debug!("Unexpected {} in {:?}, ignored", payload.kind(), phase);
            }
        }
    }

    fn handle_internal(&mut self, internal: Internal<M::Remote>) {
        let epoch = match &internal {
            Internal::Worker { epoch, .. } | Internal::Transport { epoch, .. } => *epoch,
        };
        let Some(partner) = self
            .current
            .as_ref()
            .filter(|n| n.epoch == epoch)
            .map(|n| n.partner)
        else {
            debug!(epoch, "Discarding result of a finished negotiation");
            return;
        };

        match internal {
            Internal::Worker { report, .. } => self.handle_report(partner, report),
            Internal::Transport { event, .. } => self.handle_transport_event(partner, event),
        }
    }

    fn handle_report(&mut self, partner: ConnectionId, report: WorkerReport) {
        match report {
            WorkerReport::OfferReady(sdp) => {
                self.send(ClientMessage::Signal {
                    to: partner,
                    payload: SignalPayload::Offer { sdp },
                });
                if self.phase == Phase::Offering {
                    self.phase = Phase::AwaitingAnswer;
                }
            }
            // Media may already be flowing by the time the answer is ready.
            WorkerReport::AnswerReady(sdp) => {
                self.send(ClientMessage::Signal {
                    to: partner,
                    payload: SignalPayload::Answer { sdp },
                });
                if self.phase == Phase::AwaitingLocalAnswer {
                    self.phase = Phase::ConnectPending;
                }
            }
            WorkerReport::RemoteDescriptionSet => debug!("Remote description set"),
            WorkerReport::CandidateRejected(reason) => {
                warn!("Remote candidate rejected: {}", reason);
            }
            WorkerReport::Failed(reason) => {
                warn!("Negotiation with {} failed: {}", partner, reason);
                self.set_status(ClientStatus::NegotiationFailed(reason));
            }
        }
    }

    fn handle_transport_event(&mut self, partner: ConnectionId, event: TransportEvent<M::Remote>) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                self.send(ClientMessage::Signal {
                    to: partner,
                    payload: SignalPayload::Candidate(candidate),
                });
            }
            TransportEvent::RemoteTrack(remote) => {
                self.media.attach_remote(remote);
                if self.phase != Phase::Connected && self.phase.is_negotiating() {
                    info!("Connected to {}", partner);
                    self.phase = Phase::Connected;
                    self.set_status(ClientStatus::Connected { partner });
                }
            }
            TransportEvent::StateChanged(TransportState::Failed) => {
                warn!("Transport to {} failed", partner);
                self.set_status(ClientStatus::NegotiationFailed(
                    "transport failed".to_owned(),
                ));
            }
            TransportEvent::StateChanged(state) => debug!("Transport state {:?}", state),
        }
    }

    fn on_disconnected(&mut self) {
        info!("Signaling connection lost");
        self.end_negotiation("disconnected");
        self.phase = Phase::Closed;
        self.set_status(ClientStatus::Disconnected);
    }

    fn send(&self, msg: ClientMessage) {
        if self.outbound.send(msg).is_err() {
            warn!("Outbound channel closed, message dropped");
        }
    }

    fn set_status(&self, status: ClientStatus) {
        self.status.send_replace(status);
    }
}
