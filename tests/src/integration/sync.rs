//! Initial sync of a newly connected node.

use crate::harness::*;
use gs_01_data_store::DataStoreApi;
use gs_02_broadcast::BroadcastApi;
use gs_04_protocol::LocalStoreApi;
use shared_types::{Capability, PayloadKind};

#[tokio::test]
async fn test_new_node_bootstraps_supported_kinds() {
    let time = clock();
    let seeder = TestNode::spawn(&time);
    let key = owner(4);
    for i in 0..5 {
        seeder
            .protocol()
            .add_local(signed(&key, offer(&format!("o-{i}")), 1, T0, 5 * MINUTE));
    }
    seeder.protocol().add_local(signed(&key, mailbox("m-1"), 1, T0, 60 * MINUTE));

    let joiner = TestNode::spawn(&time);
    let link = connect(&joiner, &seeder);
    joiner.protocol().request_sync(link.a).unwrap();

    assert!(eventually(|| joiner.store().len() == 5).await);
    settle().await;
    assert!(joiner.store().get_by_kind(PayloadKind::Mailbox).is_empty());
    // Sync responses are applied without gossiping them again.
    assert_eq!(joiner.container.broadcaster.stats().broadcasts, 0);
}

#[tokio::test]
async fn test_capable_peer_receives_mailbox_entries() {
    let time = clock();
    let seeder = TestNode::spawn(&time);
    seeder
        .protocol()
        .add_local(signed(&owner(4), mailbox("m-1"), 1, T0, 60 * MINUTE));

    let joiner = TestNode::spawn(&time);
    let link = connect(&joiner, &seeder);
    seeder.container.capabilities.register(link.b, [Capability::Mailbox]);
    joiner.protocol().request_sync(link.a).unwrap();

    assert!(eventually(|| joiner.store().len() == 1).await);
}

#[tokio::test]
async fn test_sync_skips_entries_already_held() {
    let time = clock();
    let (seeder, joiner) = (TestNode::spawn(&time), TestNode::spawn(&time));
    let key = owner(5);
    let shared = signed(&key, alert("shared"), 1, T0, 60 * MINUTE);
    seeder.protocol().add_local(shared.clone());
    seeder.protocol().add_local(signed(&key, alert("only-seeder"), 1, T0, 60 * MINUTE));
    joiner.protocol().add_local(shared);

    let link = connect(&joiner, &seeder);
    joiner.protocol().request_sync(link.a).unwrap();

    assert!(eventually(|| joiner.store().len() == 2).await);
    settle().await;
    // The only write the joiner saw was the one it lacked.
    assert_eq!(joiner.store().epoch(), 2);
}
