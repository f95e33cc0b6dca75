use thiserror::Error;

/// Failure of one operation on the peer transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("webrtc: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("{0}")]
    Failed(String),
}

/// The local media source could not be opened. Fatal for the client.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("permission to capture media was denied")]
    PermissionDenied,

    #[error("media error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The negotiator task has exited.
    #[error("client is shut down")]
    Shutdown,
}
