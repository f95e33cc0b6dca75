//! Anonymous one-to-one pairing with a signaling relay.
//!
//! Enable `server` for the matchmaker and relay, `client` for the negotiation engine.

pub use tandem_core::model::{ConnectionId, Role};

pub mod model {
    pub use tandem_core::model::*;
    pub use tandem_core::utils::default_ice_servers;
}

#[cfg(feature = "server")]
pub mod server {
    pub use tandem_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use tandem_client::*;
}
