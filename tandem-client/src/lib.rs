//! Client side of a one-to-one session.
//!
//! [`ClientEngine`] connects to the signaling server and runs a [`Negotiator`], which
//! drives pairing and the offer/answer handshake against any [`TransportFactory`] and
//! [`MediaDevice`]. The [`rtc`] module provides the webrtc-rs implementations.

mod engine;
mod error;
mod negotiation;
pub mod rtc;
mod transport;

pub use engine::*;
pub use error::*;
pub use negotiation::*;
pub use transport::*;
