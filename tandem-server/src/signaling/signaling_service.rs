use crate::matchmaker::MatchmakerHandle;
use crate::signaling::{RelayOutcome, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{ConnectionId, IceServerConfig, ServerMessage, SignalEnvelope};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Registry of live connections plus the stateless signal relay on top of it.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) matchmaker: MatchmakerHandle,
}

impl SignalingService {
    pub fn new(matchmaker: MatchmakerHandle, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
                ice_servers,
            }),
            matchmaker,
        }
    }

    pub fn matchmaker(&self) -> &MatchmakerHandle {
        &self.matchmaker
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn register(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(id, tx);
    }

    pub fn unregister(&self, id: &ConnectionId) {
        self.inner.connections.remove(id);
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Forward a handshake payload to `envelope.to`, stamped with the sender.
    pub fn relay(&self, envelope: SignalEnvelope) -> RelayOutcome {
        let SignalEnvelope { from, to, payload } = envelope;
        let kind = payload.kind();

        let outcome = self.deliver(to, &ServerMessage::Signal { from, payload });
        if !outcome.is_delivered() {
            debug!("Dropped {} from {} to {}: {:?}", kind, from, to, outcome);
        }
        outcome
    }

    pub fn send_message(&self, to: ConnectionId, msg: &ServerMessage) -> RelayOutcome {
        self.deliver(to, msg)
    }

    fn deliver(&self, to: ConnectionId, msg: &ServerMessage) -> RelayOutcome {
        let Some(conn) = self.inner.connections.get(&to) else {
            return RelayOutcome::DroppedUnknownTarget;
        };

        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize server message: {}", e);
                return RelayOutcome::DroppedClosed;
            }
        };

        match conn.send(Message::Text(json.into())) {
            Ok(()) => RelayOutcome::Delivered,
            Err(_) => RelayOutcome::DroppedClosed,
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, to: ConnectionId, msg: ServerMessage) {
        if let RelayOutcome::DroppedUnknownTarget = self.deliver(to, &msg) {
            warn!("Attempted to send to disconnected connection {}", to);
        }
    }

    fn is_live(&self, id: &ConnectionId) -> bool {
        self.is_connected(id)
    }
}
