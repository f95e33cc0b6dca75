use tandem_client::{ClientCommand, ClientStatus, Phase};
use tandem_core::{ClientMessage, Role, ServerMessage, SignalPayload};

use crate::integration::{TestClient, candidate, init_tracing, signal};
use crate::utils::{LOCAL_MEDIA, MockCall};

#[tokio::test]
async fn test_skip_tears_down_and_repairs() {
    init_tracing();

    let mut client = TestClient::start().await;
    let first = client.pair(Role::Responder).await;
    client
        .server(signal(first, SignalPayload::Candidate(candidate("buffered"))))
        .await;

    client.command(ClientCommand::Skip).await;
    assert_eq!(client.next_outbound().await, ClientMessage::Skip);
    assert_eq!(client.phase().await, Phase::Searching);
    assert_eq!(client.handle.status(), ClientStatus::Searching);
    assert_eq!(client.media.detach_count(), 1);
    client.server(ServerMessage::Waiting).await;

    let calls = client.wait_calls(0, 2).await;
    assert_eq!(
        calls,
        vec![MockCall::Open(LOCAL_MEDIA.into()), MockCall::Close]
    );

    // Next partner gets a brand new transport, and nothing from the old buffer.
    let second = client.pair(Role::Initiator).await;
    assert_eq!(
        client.next_outbound().await,
        ClientMessage::Signal {
            to: second,
            payload: SignalPayload::Offer {
                sdp: "offer-1".into()
            },
        }
    );
    client
        .server(signal(
            second,
            SignalPayload::Answer {
                sdp: "remote-answer".into(),
            },
        ))
        .await;
    client
        .wait_status(|s| matches!(s, ClientStatus::Connected { .. }))
        .await;

    assert!(
        !client
            .factory
            .calls_on(1)
            .contains(&MockCall::AddCandidate("buffered".into()))
    );
    assert_eq!(client.factory.opened(), 2);
}

#[tokio::test]
async fn test_skip_while_searching_requeues() {
    init_tracing();

    let mut client = TestClient::start().await;
    client.command(ClientCommand::Find).await;
    client.next_outbound().await;

    client.command(ClientCommand::Skip).await;
    assert_eq!(client.next_outbound().await, ClientMessage::Skip);
    assert_eq!(client.phase().await, Phase::Searching);
    assert_eq!(client.media.detach_count(), 0);
}

#[tokio::test]
async fn test_skip_before_find_ignored() {
    init_tracing();

    let mut client = TestClient::start().await;
    client.command(ClientCommand::Skip).await;

    assert_eq!(client.phase().await, Phase::Idle);
    client.expect_no_outbound().await;
}
