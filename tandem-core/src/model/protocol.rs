use crate::model::connection::ConnectionId;
use crate::model::ice::IceServerConfig;
use crate::model::role::Role;
use crate::model::signal::SignalPayload;
use serde::{Deserialize, Serialize};

/// Frames a client sends to the signaling server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    /// Enter matchmaking.
    Find,
    /// End the current pairing and go back into the queue.
    Skip,
    /// End the current pairing and leave the queue.
    Stop,
    Signal {
        to: ConnectionId,
        payload: SignalPayload,
    },
    /// Chat text for the current partner.
    Chat { text: String },
}

/// Frames the signaling server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Waiting,
    Paired {
        partner: ConnectionId,
        role: Role,
    },
    Signal {
        from: ConnectionId,
        payload: SignalPayload,
    },
    Chat {
        text: String,
    },
    PartnerLeft,
}
