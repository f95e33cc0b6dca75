use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tandem_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::engine::{ClientConfig, ClientHandle};
use crate::error::ClientError;
use crate::negotiation::{Negotiator, NegotiatorInput};
use crate::transport::{MediaDevice, TransportFactory};

/// Wires a signaling socket to a [`Negotiator`].
pub struct ClientEngine;

impl ClientEngine {
    /// Connect to the server and start negotiating on behalf of the returned handle.
    ///
    /// Local media is acquired right away; watch the status for `Ready` before searching.
    pub async fn connect<M, F>(
        config: ClientConfig,
        media: Arc<M>,
        factory: Arc<F>,
    ) -> Result<ClientHandle, ClientError>
    where
        M: MediaDevice,
        F: TransportFactory<Local = M::Local, Remote = M::Remote>,
    {
        let url = config.connect_url();
        let (ws, _) = connect_async(&url).await?;
        info!("Connected to {}", config.url);

        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

        let negotiator = Negotiator::spawn(media, factory, config.ice_servers, outbound_tx);
        let input = negotiator.input.clone();
        let span = info_span!("client", url = %config.url);

        let writer = tokio::spawn(
            async move {
                while let Some(msg) = outbound_rx.recv().await {
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize {:?}: {}", msg, e);
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::text(json)).await {
                        warn!("Socket write failed: {}", e);
                        break;
                    }
                }
                let _ = sink.close().await;
            }
            .instrument(span.clone()),
        );

        let reader = tokio::spawn(
            async move {
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<ServerMessage>(&text) {
                                Ok(msg) => {
                                    if input.send(NegotiatorInput::Server(msg)).await.is_err() {
                                        break;
                                    }
                                }
                                Err(e) => warn!("Invalid ServerMessage: {}", e),
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            debug!("Socket read failed: {}", e);
                            break;
                        }
                    }
                }
                let _ = input.send(NegotiatorInput::Disconnected).await;
            }
            .instrument(span),
        );

        Ok(ClientHandle::new(negotiator, reader, writer))
    }
}
