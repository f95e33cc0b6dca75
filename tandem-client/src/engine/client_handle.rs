use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ClientError;
use crate::negotiation::{ChatLine, ClientCommand, ClientStatus, NegotiatorHandle, Phase};

/// A connected client. Dropping it closes the signaling socket.
pub struct ClientHandle {
    negotiator: NegotiatorHandle,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ClientHandle {
    pub(crate) fn new(negotiator: NegotiatorHandle, reader: JoinHandle<()>, writer: JoinHandle<()>) -> Self {
        Self {
            negotiator,
            reader,
            writer,
        }
    }

    pub async fn find(&self) -> Result<(), ClientError> {
        self.negotiator.command(ClientCommand::Find).await
    }

    pub async fn skip(&self) -> Result<(), ClientError> {
        self.negotiator.command(ClientCommand::Skip).await
    }

    pub async fn stop(&self) -> Result<(), ClientError> {
        self.negotiator.command(ClientCommand::Stop).await
    }

    pub async fn chat(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.negotiator.command(ClientCommand::Chat(text.into())).await
    }

    pub async fn phase(&self) -> Result<Phase, ClientError> {
        self.negotiator.phase().await
    }

    pub fn status(&self) -> ClientStatus {
        self.negotiator.status()
    }

    /// A separate view of the status, for callers that also need `&mut self` elsewhere.
    pub fn subscribe(&self) -> watch::Receiver<ClientStatus> {
        self.negotiator.status.clone()
    }

    pub async fn wait_for_status<P>(&mut self, timeout: Duration, pred: P) -> Option<ClientStatus>
    where
        P: FnMut(&ClientStatus) -> bool,
    {
        self.negotiator.wait_for_status(timeout, pred).await
    }

    pub async fn next_chat(&mut self) -> Option<ChatLine> {
        self.negotiator.chat.recv().await
    }

    /// Close the signaling connection and wait for the negotiator to wind down.
    pub async fn close(mut self) {
        self.reader.abort();
        let _ = self.negotiator.disconnected().await;
        let _ = (&mut self.writer).await;
    }
}

impl Drop for ClientHandle {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
