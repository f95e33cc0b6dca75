use serde::Serialize;
use tandem_core::ConnectionId;
use tokio::sync::oneshot;

/// Commands the matchmaker receives from connection tasks.
#[derive(Debug)]
pub enum MatchCommand {
    /// The connection wants a partner.
    Find { id: ConnectionId },

    /// End the current pairing and re-enter the queue.
    Skip { id: ConnectionId },

    /// End the current pairing and leave the queue.
    Stop { id: ConnectionId },

    /// Chat text for whoever `from` is paired with right now.
    Chat { from: ConnectionId, text: String },

    /// The socket is gone; the registry has already forgotten it.
    Disconnect { id: ConnectionId },

    Stats { reply: oneshot::Sender<MatchStats> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub waiting: usize,
    pub pairs: usize,
}
