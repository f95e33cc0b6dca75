use tandem_core::{ConnectionId, ServerMessage};
use tokio::sync::oneshot;

use crate::negotiation::Phase;

/// What the local user asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Find,
    Skip,
    Stop,
    Chat(String),
}

/// Everything the negotiator reacts to from outside its own transport.
#[derive(Debug)]
pub enum NegotiatorInput {
    Command(ClientCommand),
    Server(ServerMessage),
    /// The signaling connection is gone.
    Disconnected,
    QueryPhase(oneshot::Sender<Phase>),
}

/// A chat line received from the current partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub from: ConnectionId,
    pub text: String,
}
