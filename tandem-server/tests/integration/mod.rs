//! Integration tests for tandem-server.
//!
//! Tests are organized by functionality:
//! - `matchmaking_tests` - queueing, pairing, skip and disconnect
//! - `relay_tests` - signal and chat forwarding over real sockets


use std::net::SocketAddr;
use std::sync::Arc;

use tandem_core::{ConnectionId, ServerMessage};
use tandem_server::{MatchmakerHandle, ServerConfig, router, spawn_service};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::MockSignalingOutput;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Spawn a matchmaker wired to a mock output.
///
/// Returns (handle, notice_rx, output) for test control.
pub fn create_test_matchmaker() -> (
    MatchmakerHandle,
    mpsc::UnboundedReceiver<(ConnectionId, ServerMessage)>,
    MockSignalingOutput,
) {
    let (output, rx) = MockSignalingOutput::new();
    let handle = MatchmakerHandle::spawn(Arc::new(output.clone()), 100, 64);
    (handle, rx, output)
}

/// Serve the full router on an ephemeral local port.
pub async fn start_test_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    let service = spawn_service(&ServerConfig::default());
    tokio::spawn(async move {
        axum::serve(listener, router(service)).await.ok();
    });

    addr
}

/// Receive the next notice, failing the test after a short timeout.
pub async fn next_notice(
    rx: &mut mpsc::UnboundedReceiver<(ConnectionId, ServerMessage)>,
) -> (ConnectionId, ServerMessage) {
    tokio::time::timeout(std::time::Duration::from_secs(2), rx.recv())
        .await
        .expect("Timeout waiting for notice")
        .expect("Notice channel closed")
}
