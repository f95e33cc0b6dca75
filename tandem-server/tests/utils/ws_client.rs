use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::time::Duration;
use tandem_core::{ClientMessage, ConnectionId, ServerMessage};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected server message (ms).
pub const RECV_TIMEOUT_MS: u64 = 2000;

/// Window in which no message is expected to arrive (ms).
pub const QUIET_WINDOW_MS: u64 = 200;

/// A raw protocol client talking to a real server over WebSocket.
pub struct WsTestClient {
    pub id: ConnectionId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    /// Connect and consume the `Welcome` / `IceConfig` greeting.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{}/ws?handle=test", addr))
            .await
            .context("Failed to connect")?;

        let mut client = Self {
            id: ConnectionId::new(),
            stream,
        };

        match client.recv().await? {
            ServerMessage::Welcome { connection_id } => client.id = connection_id,
            other => anyhow::bail!("Expected Welcome, got {:?}", other),
        }
        match client.recv().await? {
            ServerMessage::IceConfig { .. } => {}
            other => anyhow::bail!("Expected IceConfig, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: ClientMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Next server message, or an error after `RECV_TIMEOUT_MS`.
    pub async fn recv(&mut self) -> Result<ServerMessage> {
        let deadline = Duration::from_millis(RECV_TIMEOUT_MS);

        loop {
            let frame = tokio::time::timeout(deadline, self.stream.next())
                .await
                .context("Timeout waiting for server message")?
                .context("Socket closed")??;

            if let Message::Text(text) = frame {
                return serde_json::from_str(&text).context("Invalid ServerMessage");
            }
        }
    }

    /// Assert that nothing arrives for `QUIET_WINDOW_MS`.
    pub async fn expect_silence(&mut self) -> Result<()> {
        let window = Duration::from_millis(QUIET_WINDOW_MS);
        match tokio::time::timeout(window, self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => anyhow::bail!("Expected silence, got {:?}", frame),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
