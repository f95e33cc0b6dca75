//! Matchmaking and signaling relay for one-to-one sessions.
//!
//! Clients connect over a WebSocket at `/ws`, ask for a partner with `Find`, and once
//! paired exchange opaque handshake payloads through the relay until their direct
//! transport is up.

mod config;
mod error;
mod matchmaker;
mod server;
mod signaling;

pub use config::*;
pub use error::*;
pub use matchmaker::*;
pub use server::*;
pub use signaling::*;
