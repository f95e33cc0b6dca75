use std::net::SocketAddr;
use tandem_core::IceServerConfig;
use tandem_core::utils::default_ice_servers;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Handed to every client right after it connects.
    pub ice_servers: Vec<IceServerConfig>,
    /// Capacity of the matchmaker command channel.
    pub command_capacity: usize,
    /// Chat text above this many characters is truncated.
    pub max_chat_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: default_ice_servers(),
            command_capacity: 256,
            max_chat_len: 2000,
        }
    }
}
