use tandem_core::{ConnectionId, IceCandidate, Role};
use tokio::task::JoinHandle;

use crate::negotiation::worker::{TransportOp, WorkerHandle};
use crate::negotiation::Epoch;

/// State of the handshake with one partner.
pub(crate) struct PeerNegotiation {
    pub(crate) partner: ConnectionId,
    pub(crate) role: Role,
    pub(crate) epoch: Epoch,
    /// True once the partner's description has been handed to the worker. Anything
    /// queued after that point runs after it.
    remote_description_queued: bool,
    pending_candidates: Vec<IceCandidate>,
    worker: WorkerHandle,
}

impl PeerNegotiation {
    pub(crate) fn new(partner: ConnectionId, role: Role, epoch: Epoch, worker: WorkerHandle) -> Self {
        Self {
            partner,
            role,
            epoch,
            remote_description_queued: false,
            pending_candidates: Vec::new(),
            worker,
        }
    }

    pub(crate) fn submit(&self, op: TransportOp) {
        self.worker.submit(op);
    }

    /// Queue the partner's offer or answer, followed by every candidate that arrived early.
    pub(crate) fn apply_remote_description(&mut self, op: TransportOp) {
        self.worker.submit(op);
        self.remote_description_queued = true;

        for candidate in self.pending_candidates.drain(..) {
            self.worker.submit(TransportOp::AddCandidate(candidate));
        }
    }

    /// Apply the candidate now if the remote description is in, otherwise hold it.
    pub(crate) fn add_remote_candidate(&mut self, candidate: IceCandidate) {
        if self.remote_description_queued {
            self.worker.submit(TransportOp::AddCandidate(candidate));
        } else {
            self.pending_candidates.push(candidate);
        }
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Cancel the worker and drop anything buffered.
    pub(crate) fn teardown(mut self) -> JoinHandle<()> {
        self.pending_candidates.clear();
        self.worker.retire()
    }
}
