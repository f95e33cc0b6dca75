use crate::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tandem_core::{ClientMessage, ConnectionId, ServerMessage, SignalEnvelope};
use tokio::sync::mpsc;
use tracing::{Instrument, error, info, info_span, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Opaque user handle from the identity provider. Only logged.
    pub handle: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let id = ConnectionId::new();
    let span = info_span!("connection", %id, handle = params.handle.as_deref().unwrap_or("-"));

    ws.on_upgrade(move |socket| handle_socket(socket, id, service).instrument(span))
}

async fn handle_socket(socket: WebSocket, id: ConnectionId, service: SignalingService) {
    info!("Connected: {}", id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.register(id, tx);
    service.send_message(id, &ServerMessage::Welcome { connection_id: id });
    service.send_message(
        id,
        &ServerMessage::IceConfig {
            ice_servers: service.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(request) => {
                            if let Err(e) = dispatch(&service, id, request).await {
                                error!("Matchmaker died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Invalid ClientMessage from {}: {}", id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
        .in_current_span()
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.unregister(&id);
    if let Err(e) = service.matchmaker().disconnect(id).await {
        error!("Could not report disconnect of {}: {}", id, e);
    }
    info!("Disconnected: {}", id);
}

/// Signals go to whatever live id the sender names. Pair scoping is enforced by the
/// receiving client, which drops signals from anyone but its current partner.
async fn dispatch(
    service: &SignalingService,
    id: ConnectionId,
    request: ClientMessage,
) -> Result<(), crate::ServerError> {
    match request {
        ClientMessage::Find => service.matchmaker().find(id).await,
        ClientMessage::Skip => service.matchmaker().skip(id).await,
        ClientMessage::Stop => service.matchmaker().stop(id).await,
        ClientMessage::Chat { text } => service.matchmaker().chat(id, text).await,
        ClientMessage::Signal { to, payload } => {
            service.relay(SignalEnvelope {
                from: id,
                to,
                payload,
            });
            Ok(())
        }
    }
}
