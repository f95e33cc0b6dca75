use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tandem_client::{ClientConfig, ClientEngine, ClientHandle, ClientStatus};
use tandem_server::{ServerConfig, serve_with_listener};
use tokio::net::TcpListener;

use crate::integration::{WAIT_MS, init_tracing};
use crate::utils::{MockMedia, MockTransportFactory};

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(serve_with_listener(listener, ServerConfig::default()));
    addr
}

async fn connect(addr: SocketAddr, name: &str) -> (ClientHandle, MockMedia) {
    let media = MockMedia::new();
    let config = ClientConfig::new(format!("ws://{}/ws", addr)).with_handle(name);
    let mut client = ClientEngine::connect(
        config,
        Arc::new(media.clone()),
        Arc::new(MockTransportFactory::new()),
    )
    .await
    .expect("connect");

    wait(&mut client, |s| *s == ClientStatus::Ready).await;
    (client, media)
}

async fn wait<P>(client: &mut ClientHandle, pred: P) -> ClientStatus
where
    P: FnMut(&ClientStatus) -> bool,
{
    client
        .wait_for_status(Duration::from_millis(WAIT_MS), pred)
        .await
        .unwrap_or_else(|| panic!("Timeout, last status: {}", client.status()))
}

#[tokio::test]
async fn test_two_engines_connect_through_server() {
    init_tracing();

    let addr = start_server().await;
    let (mut alice, alice_media) = connect(addr, "alice").await;
    let (mut bob, _bob_media) = connect(addr, "bob").await;

    alice.find().await.unwrap();
    wait(&mut alice, |s| *s == ClientStatus::Searching).await;
    bob.find().await.unwrap();

    let alice_sees = wait(&mut alice, |s| matches!(s, ClientStatus::Connected { .. })).await;
    let bob_sees = wait(&mut bob, |s| matches!(s, ClientStatus::Connected { .. })).await;
    assert!(matches!(alice_sees, ClientStatus::Connected { .. }));
    assert!(matches!(bob_sees, ClientStatus::Connected { .. }));
    assert_eq!(alice_media.attached().len(), 1);

    bob.chat("hi alice").await.unwrap();
    let line = tokio::time::timeout(Duration::from_millis(WAIT_MS), alice.next_chat())
        .await
        .expect("Timeout waiting for chat")
        .expect("chat line");
    assert_eq!(line.text, "hi alice");

    // Bob moves on, Alice is told.
    bob.skip().await.unwrap();
    wait(&mut alice, |s| *s == ClientStatus::PartnerLeft).await;
    wait(&mut bob, |s| *s == ClientStatus::Searching).await;

    alice.close().await;
    bob.close().await;
}

#[tokio::test]
async fn test_disconnect_reaches_partner_engine() {
    init_tracing();

    let addr = start_server().await;
    let (mut alice, _) = connect(addr, "alice").await;
    let (mut bob, _) = connect(addr, "bob").await;

    alice.find().await.unwrap();
    wait(&mut alice, |s| *s == ClientStatus::Searching).await;
    bob.find().await.unwrap();
    wait(&mut bob, |s| matches!(s, ClientStatus::Connected { .. })).await;

    alice.close().await;
    wait(&mut bob, |s| *s == ClientStatus::PartnerLeft).await;
    bob.close().await;
}
