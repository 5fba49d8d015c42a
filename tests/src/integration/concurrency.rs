//! Concurrent writers racing on one item.

use crate::harness::*;
use gs_01_data_store::DataStoreApi;
use gs_04_protocol::InboundMessageHandler;
use shared_types::{AddDataMessage, ConnectionId, StorageMessage};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_highest_sequence_wins_under_contention() {
    let time = clock();
    let node = Arc::new(TestNode::spawn(&time));
    let key = owner(6);
    let payload = offer("contended");

    let handles: Vec<_> = (1..=32u64)
        .map(|seq| {
            let node = Arc::clone(&node);
            let message = StorageMessage::from(AddDataMessage {
                entry: signed(&key, payload.clone(), seq, T0, 5 * MINUTE),
            });
            tokio::spawn(async move {
                node.protocol().on_message(ConnectionId(1_000 + seq), message);
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let item = signed(&key, payload, 1, T0, MINUTE).item_id;
    assert_eq!(node.store().sequence_number(&item), Some(32));
    assert_eq!(node.store().get(&item).unwrap().sequence_number, 32);
    assert_eq!(node.store().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_writes_to_distinct_items_all_land() {
    let time = clock();
    let node = Arc::new(TestNode::spawn(&time));

    let handles: Vec<_> = (0..64u8)
        .map(|i| {
            let node = Arc::clone(&node);
            let entry = signed(&owner(i), alert(&format!("a-{i}")), 1, T0, MINUTE);
            tokio::spawn(async move {
                node.protocol()
                    .on_message(ConnectionId(u64::from(i)), AddDataMessage { entry }.into())
                    .is_applied()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(node.store().len(), 64);
}
