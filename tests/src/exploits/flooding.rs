use crate::harness::*;
use gs_01_data_store::{DataStoreApi, MemorySnapshotStore, RejectReason};
use gs_04_protocol::{HandlerOutcome, InboundMessageHandler};
use node_runtime::NodeConfig;
use shared_types::{AddDataMessage, ConnectionId};
use std::sync::Arc;

const FLOODER: ConnectionId = ConnectionId(13);

fn capped_node(time: &Arc<shared_types::ManualTimeSource>, max_entries: usize) -> TestNode {
    let mut config = NodeConfig::default();
    config.store.max_entries = max_entries;
    TestNode::spawn_with(config, time, Arc::new(MemorySnapshotStore::new()))
}

#[tokio::test]
async fn test_capacity_bounds_new_items_but_not_updates() {
    let time = clock();
    let node = capped_node(&time, 10);
    let flooder = owner(13);

    let outcomes: Vec<HandlerOutcome> = (0..20)
        .map(|i| {
            let entry = signed(&flooder, alert(&format!("spam-{i}")), 1, T0, MINUTE);
            node.protocol().on_message(FLOODER, AddDataMessage { entry }.into())
        })
        .collect();

    let applied = outcomes.iter().filter(|o| o.is_applied()).count();
    assert_eq!(applied, 10);
    assert_eq!(
        outcomes[10],
        HandlerOutcome::Rejected(RejectReason::CapacityExceeded { capacity: 10 })
    );
    assert_eq!(node.store().len(), 10);

    // An owner can still update an item the store already holds.
    let update = signed(&flooder, alert("spam-0"), 2, T0, 2 * MINUTE);
    assert!(node
        .protocol()
        .on_message(FLOODER, AddDataMessage { entry: update }.into())
        .is_applied());
}

#[tokio::test]
async fn test_capacity_frees_up_after_expiry() {
    let time = clock();
    let node = capped_node(&time, 2);
    let flooder = owner(14);
    for i in 0..2 {
        let entry = signed(&flooder, offer(&format!("o-{i}")), 1, T0, MINUTE);
        node.protocol().on_message(FLOODER, AddDataMessage { entry }.into());
    }

    time.advance(MINUTE);
    node.container.scheduler.tick().await.unwrap();

    let fresh = signed(&flooder, offer("o-new"), 1, T0 + MINUTE, MINUTE);
    assert!(node
        .protocol()
        .on_message(FLOODER, AddDataMessage { entry: fresh }.into())
        .is_applied());
}

#[tokio::test]
async fn test_excessive_ttl_rejected() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let entry = signed(&owner(15), offer("forever"), 1, T0, 365 * 24 * 60 * MINUTE);

    assert!(matches!(
        node.protocol().on_message(FLOODER, AddDataMessage { entry }.into()),
        HandlerOutcome::Rejected(RejectReason::TtlExceedsMaximum { .. })
    ));
}

#[tokio::test]
async fn test_future_dated_entry_rejected() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let entry = signed(&owner(16), alert("from the future"), 1, T0 + 60 * MINUTE, MINUTE);

    assert!(matches!(
        node.protocol().on_message(FLOODER, AddDataMessage { entry }.into()),
        HandlerOutcome::Rejected(RejectReason::CreationTimeInFuture { .. })
    ));
}
