use tandem_core::IceServerConfig;
use tandem_core::utils::default_ice_servers;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the signaling server, e.g. `ws://127.0.0.1:5000/ws`.
    pub url: String,
    /// Opaque identity handle, passed along for the server's logs.
    pub handle: Option<String>,
    /// Used until the server announces its own list.
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handle: None,
            ice_servers: default_ice_servers(),
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub(crate) fn connect_url(&self) -> String {
        match &self.handle {
            Some(handle) => {
                let sep = if self.url.contains('?') { '&' } else { '?' };
                format!("{}{}handle={}", self.url, sep, handle)
            }
            None => self.url.clone(),
        }
    }
}
