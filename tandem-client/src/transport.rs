//! Capabilities the negotiation drives but does not implement.
//!
//! A [`MediaDevice`] hands out the local media once; a [`TransportFactory`] opens one
//! [`PeerTransport`] per pairing, bound to that media. Everything a transport reports
//! back goes through [`TransportEvents`], tagged with the negotiation it belongs to.

use async_trait::async_trait;
use tandem_core::{IceCandidate, IceServerConfig};
use tokio::sync::mpsc;

use crate::error::{MediaError, TransportError};
use crate::negotiation::{Epoch, Internal};

#[async_trait]
pub trait MediaDevice: Send + Sync + 'static {
    /// Handle to the local media, shared read-only by every transport.
    type Local: Clone + Send + Sync + 'static;
    /// Handle to media received from the partner.
    type Remote: Send + 'static;

    async fn acquire(&self) -> Result<Self::Local, MediaError>;

    fn attach_remote(&self, remote: Self::Remote);

    /// The pairing that supplied the remote media has ended.
    fn detach_remote(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    /// Create an offer and install it as the local description.
    async fn create_offer(&self) -> Result<String, TransportError>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String)
    -> Result<(), TransportError>;

    /// Create an answer and install it as the local description.
    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    type Local: Clone + Send + Sync + 'static;
    type Remote: Send + 'static;
    type Transport: PeerTransport;

    async fn open(
        &self,
        local: &Self::Local,
        ice_servers: &[IceServerConfig],
        events: TransportEvents<Self::Remote>,
    ) -> Result<Self::Transport, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

pub enum TransportEvent<R> {
    LocalCandidate(IceCandidate),
    RemoteTrack(R),
    StateChanged(TransportState),
}

/// Sender for transport callbacks, bound to one negotiation.
pub struct TransportEvents<R> {
    epoch: Epoch,
    tx: mpsc::UnboundedSender<Internal<R>>,
}

impl<R> TransportEvents<R> {
    pub(crate) fn new(epoch: Epoch, tx: mpsc::UnboundedSender<Internal<R>>) -> Self {
        Self { epoch, tx }
    }

    /// Report an event. Events for a negotiation that already ended are discarded.
    pub fn emit(&self, event: TransportEvent<R>) {
        let _ = self.tx.send(Internal::Transport {
            epoch: self.epoch,
            event,
        });
    }
}

impl<R> Clone for TransportEvents<R> {
    fn clone(&self) -> Self {
        Self {
            epoch: self.epoch,
            tx: self.tx.clone(),
        }
    }
}
