mod connection;
mod ice;
mod protocol;
mod role;
mod signal;

pub use connection::ConnectionId;
pub use ice::IceServerConfig;
pub use protocol::{ClientMessage, ServerMessage};
pub use role::Role;
pub use signal::{IceCandidate, SignalEnvelope, SignalPayload};
