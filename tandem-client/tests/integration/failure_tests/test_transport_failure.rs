use tandem_client::{ClientCommand, ClientStatus, Phase, TransportEvent, TransportState};
use tandem_core::{ClientMessage, Role, SignalPayload};

use crate::integration::{TestClient, init_tracing, signal};
use crate::utils::{MockBehavior, MockMedia, MockTransportFactory};

#[tokio::test]
async fn test_rejected_description_fails_negotiation() {
    init_tracing();

    let mut client = TestClient::start_with(
        MockMedia::new(),
        MockTransportFactory::with_behavior(MockBehavior {
            reject_remote_description: true,
            ..Default::default()
        }),
    );
    client.wait_status(|s| *s == ClientStatus::Ready).await;

    let partner = client.pair(Role::Responder).await;
    client
        .server(signal(
            partner,
            SignalPayload::Offer {
                sdp: "garbage".into(),
            },
        ))
        .await;

    let status = client
        .wait_status(|s| matches!(s, ClientStatus::NegotiationFailed(_)))
        .await;
    assert!(status.to_string().contains("malformed sdp"));

    // No retry, no answer. The phase is left where it broke.
    client.expect_no_outbound().await;
    assert_eq!(client.phase().await, Phase::AwaitingLocalAnswer);

    // Skipping is the way out.
    client.command(ClientCommand::Skip).await;
    assert_eq!(client.next_outbound().await, ClientMessage::Skip);
    assert_eq!(client.phase().await, Phase::Searching);
}

#[tokio::test]
async fn test_open_failure_fails_negotiation() {
    init_tracing();

    let mut client = TestClient::start_with(
        MockMedia::new(),
        MockTransportFactory::with_behavior(MockBehavior {
            fail_open: true,
            ..Default::default()
        }),
    );
    client.wait_status(|s| *s == ClientStatus::Ready).await;

    client.pair(Role::Initiator).await;
    let status = client
        .wait_status(|s| matches!(s, ClientStatus::NegotiationFailed(_)))
        .await;
    assert!(status.to_string().contains("could not open transport"));
    client.expect_no_outbound().await;
}

#[tokio::test]
async fn test_failed_transport_state_reported() {
    init_tracing();

    let mut client = TestClient::start().await;
    client.pair(Role::Initiator).await;
    client.next_outbound().await; // offer

    client
        .factory
        .emit(0, TransportEvent::StateChanged(TransportState::Disconnected));
    client.phase().await;
    assert!(matches!(
        client.handle.status(),
        ClientStatus::Negotiating { .. }
    ));

    client
        .factory
        .emit(0, TransportEvent::StateChanged(TransportState::Failed));
    client
        .wait_status(|s| matches!(s, ClientStatus::NegotiationFailed(_)))
        .await;
    assert_eq!(client.phase().await, Phase::AwaitingAnswer);
}
