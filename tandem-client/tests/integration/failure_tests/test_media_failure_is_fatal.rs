use tandem_client::{ClientCommand, ClientStatus, Phase};
use tandem_core::{Role, ServerMessage};

use crate::integration::{TestClient, init_tracing};
use crate::utils::{MockMedia, MockTransportFactory};

#[tokio::test]
async fn test_media_failure_is_fatal() {
    init_tracing();

    let mut client = TestClient::start_with(MockMedia::denied(), MockTransportFactory::new());
    let status = client
        .wait_status(|s| matches!(s, ClientStatus::MediaUnavailable(_)))
        .await;
    assert!(status.to_string().contains("denied"));

    client.command(ClientCommand::Find).await;
    client.command(ClientCommand::Skip).await;
    client.expect_no_outbound().await;
    assert_eq!(client.phase().await, Phase::Idle);

    client
        .server(ServerMessage::Paired {
            partner: tandem_core::ConnectionId::new(),
            role: Role::Initiator,
        })
        .await;
    assert_eq!(client.phase().await, Phase::Idle);
    assert_eq!(client.factory.opened(), 0);
    assert!(matches!(
        client.handle.status(),
        ClientStatus::MediaUnavailable(_)
    ));
}
