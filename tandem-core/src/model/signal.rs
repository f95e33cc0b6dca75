use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};

/// A connectivity candidate gathered by one side's transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// Handshake payload exchanged between the two members of a pair.
///
/// The server never looks inside; only the negotiating clients do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalPayload {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(IceCandidate),
}

impl SignalPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalPayload::Offer { .. } => "offer",
            SignalPayload::Answer { .. } => "answer",
            SignalPayload::Candidate(_) => "candidate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalEnvelope {
    pub from: ConnectionId,
    pub to: ConnectionId,
    pub payload: SignalPayload,
}
