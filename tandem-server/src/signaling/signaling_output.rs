use async_trait::async_trait;
use tandem_core::{ConnectionId, ServerMessage};

/// What the matchmaker needs from the connection layer: a way to reach a connection and
/// a way to ask whether it is still there.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue a message for one connection. Unknown connections are skipped.
    async fn send(&self, to: ConnectionId, msg: ServerMessage);

    fn is_live(&self, id: &ConnectionId) -> bool;
}
