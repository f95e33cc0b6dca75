use std::sync::Arc;

use tandem_core::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::error::ServerError;
use crate::matchmaker::{MatchCommand, MatchStats, Matchmaker};
use crate::signaling::SignalingOutput;

/// Cheap, cloneable front door to the matchmaker task.
#[derive(Clone)]
pub struct MatchmakerHandle {
    tx: mpsc::Sender<MatchCommand>,
}

impl MatchmakerHandle {
    pub fn new(tx: mpsc::Sender<MatchCommand>) -> Self {
        Self { tx }
    }

    /// Start a matchmaker on the current runtime and return a handle to it.
    pub fn spawn(output: Arc<dyn SignalingOutput>, capacity: usize, max_chat_len: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(Matchmaker::new(rx, output, max_chat_len).run());
        Self { tx }
    }

    pub async fn find(&self, id: ConnectionId) -> Result<(), ServerError> {
        self.send(MatchCommand::Find { id }).await
    }

    pub async fn skip(&self, id: ConnectionId) -> Result<(), ServerError> {
        self.send(MatchCommand::Skip { id }).await
    }

    pub async fn stop(&self, id: ConnectionId) -> Result<(), ServerError> {
        self.send(MatchCommand::Stop { id }).await
    }

    pub async fn chat(&self, from: ConnectionId, text: String) -> Result<(), ServerError> {
        self.send(MatchCommand::Chat { from, text }).await
    }

    pub async fn disconnect(&self, id: ConnectionId) -> Result<(), ServerError> {
        self.send(MatchCommand::Disconnect { id }).await
    }

    pub async fn stats(&self) -> Result<MatchStats, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.send(MatchCommand::Stats { reply }).await?;
        rx.await.map_err(|_| ServerError::MatchmakerGone)
    }

    async fn send(&self, cmd: MatchCommand) -> Result<(), ServerError> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| ServerError::MatchmakerGone)
    }
}
