use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::matchmaker::{MatchStats, Matchmaker, MatchmakerHandle};
use crate::signaling::{SignalingService, ws_handler};

/// Start the matchmaker task and return the service every connection shares.
pub fn spawn_service(config: &ServerConfig) -> SignalingService {
    let (tx, rx) = mpsc::channel(config.command_capacity);
    let service = SignalingService::new(MatchmakerHandle::new(tx), config.ice_servers.clone());

    let matchmaker = Matchmaker::new(rx, Arc::new(service.clone()), config.max_chat_len);
    tokio::spawn(matchmaker.run());

    service
}

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(service)
}

/// Bind `config.bind` and serve until the process ends.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind).await?;
    serve_with_listener(listener, config).await
}

pub async fn serve_with_listener(
    listener: TcpListener,
    config: ServerConfig,
) -> Result<(), ServerError> {
    let service = spawn_service(&config);

    info!("Signaling server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "OK"
}

/// Body of `GET /stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub connections: usize,
    #[serde(flatten)]
    pub matching: MatchStats,
}

async fn stats(
    State(service): State<SignalingService>,
) -> Result<Json<ServerStats>, StatusCode> {
    let matching = service
        .matchmaker()
        .stats()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(ServerStats {
        connections: service.connection_count(),
        matching,
    }))
}
