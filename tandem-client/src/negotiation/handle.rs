use std::time::Duration;

use tandem_core::ServerMessage;
use tokio::sync::{mpsc, oneshot, watch};

use crate::error::ClientError;
use crate::negotiation::{ChatLine, ClientCommand, ClientStatus, NegotiatorInput, Phase};

/// Control side of a running [`Negotiator`](crate::Negotiator).
pub struct NegotiatorHandle {
    pub(crate) input: mpsc::Sender<NegotiatorInput>,
    pub status: watch::Receiver<ClientStatus>,
    pub chat: mpsc::UnboundedReceiver<ChatLine>,
}

impl NegotiatorHandle {
    pub async fn command(&self, cmd: ClientCommand) -> Result<(), ClientError> {
        self.send(NegotiatorInput::Command(cmd)).await
    }

    /// Feed a message that arrived from the signaling server.
    pub async fn server_message(&self, msg: ServerMessage) -> Result<(), ClientError> {
        self.send(NegotiatorInput::Server(msg)).await
    }

    pub async fn disconnected(&self) -> Result<(), ClientError> {
        self.send(NegotiatorInput::Disconnected).await
    }

    pub async fn phase(&self) -> Result<Phase, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(NegotiatorInput::QueryPhase(reply)).await?;
        rx.await.map_err(|_| ClientError::Shutdown)
    }

    pub fn status(&self) -> ClientStatus {
        self.status.borrow().clone()
    }

    /// Wait until the status satisfies `pred`, giving up after `timeout`.
    pub async fn wait_for_status<P>(&mut self, timeout: Duration, pred: P) -> Option<ClientStatus>
    where
        P: FnMut(&ClientStatus) -> bool,
    {
        let waited = tokio::time::timeout(timeout, self.status.wait_for(pred)).await;
        match waited {
            Ok(Ok(status)) => Some(status.clone()),
            _ => None,
        }
    }

    async fn send(&self, input: NegotiatorInput) -> Result<(), ClientError> {
        self.input
            .send(input)
            .await
            .map_err(|_| ClientError::Shutdown)
    }
}
