use tandem_core::{ConnectionId, ServerMessage};

use crate::integration::{create_test_matchmaker, init_tracing, next_notice};

#[tokio::test]
async fn test_stale_waiter_is_skipped() {
    init_tracing();

    let (matchmaker, mut notices, output) = create_test_matchmaker();
    let ghost = ConnectionId::new();
    let b = ConnectionId::new();

    matchmaker.find(ghost).await.unwrap();
    assert_eq!(next_notice(&mut notices).await, (ghost, ServerMessage::Waiting));

    // The socket vanished but the disconnect has not been processed yet.
    output.mark_gone(ghost);

    matchmaker.find(b).await.unwrap();
    assert_eq!(next_notice(&mut notices).await, (b, ServerMessage::Waiting));
    assert_eq!(output.sent_to(&ghost).await, vec![ServerMessage::Waiting]);
}
