use std::fmt;

use tandem_core::{ConnectionId, Role};

/// Where the client is in the pairing and handshake sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    /// Partner known and transport worker started; left as soon as the role is applied.
    Paired,
    /// Initiator: creating the offer.
    Offering,
    /// Responder: waiting for the partner's offer.
    AwaitingOffer,
    /// Initiator: offer sent, waiting for the answer.
    AwaitingAnswer,
    /// Responder: offer applied, creating the answer.
    AwaitingLocalAnswer,
    /// Descriptions exchanged; waiting for media to flow.
    ConnectPending,
    Connected,
    Closed,
}

impl Phase {
    pub fn is_negotiating(self) -> bool {
        !matches!(
            self,
            Phase::Idle | Phase::Searching | Phase::Closed
        )
    }
}

/// User-visible status, published on every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientStatus {
    Starting,
    Ready,
    /// Local media could not be acquired. Nothing else will work.
    MediaUnavailable(String),
    Searching,
    Negotiating {
        partner: ConnectionId,
        role: Role,
    },
    Connected {
        partner: ConnectionId,
    },
    PartnerLeft,
    /// The handshake with the current partner broke down. Skip to try someone else.
    NegotiationFailed(String),
    Stopped,
    Disconnected,
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientStatus::Starting => f.write_str("starting"),
            ClientStatus::Ready => f.write_str("ready"),
            ClientStatus::MediaUnavailable(reason) => write!(f, "media unavailable: {}", reason),
            ClientStatus::Searching => f.write_str("searching"),
            ClientStatus::Negotiating { partner, role } => {
                write!(f, "negotiating with {} as {}", partner, role)
            }
            ClientStatus::Connected { partner } => write!(f, "connected to {}", partner),
            ClientStatus::PartnerLeft => f.write_str("partner left"),
            ClientStatus::NegotiationFailed(reason) => write!(f, "negotiation failed: {}", reason),
            ClientStatus::Stopped => f.write_str("stopped"),
            ClientStatus::Disconnected => f.write_str("disconnected"),
        }
    }
}
