//! Snapshots and restart.

use crate::harness::*;
use gs_01_data_store::{DataStoreApi, RejectReason, SnapshotStore, WriteResult};
use gs_04_protocol::LocalStoreApi;
use node_runtime::adapters::open_snapshot_store;
use node_runtime::{NodeConfig, NodeRuntime, StorageConfig};
use shared_crypto::EntrySigner;

fn file_config(dir: &std::path::Path) -> NodeConfig {
    NodeConfig {
        storage: StorageConfig {
            data_dir: dir.to_path_buf(),
            persist: true,
        },
        ..NodeConfig::default()
    }
}

#[tokio::test]
async fn test_restart_restores_entries_and_sequence_history() {
    let dir = tempfile::tempdir().unwrap();
    let time = clock();
    let key = owner(7);
    let kept = signed(&key, alert("kept"), 3, T0, 60 * MINUTE);
    let removed_payload = alert("removed");
    let removed = signed(&key, removed_payload.clone(), 1, T0, 60 * MINUTE);

    {
        let config = file_config(dir.path());
        let snapshots = open_snapshot_store(&config.storage).unwrap();
        let node = TestNode::spawn_with(config, &time, snapshots);
        let runtime = NodeRuntime::new(node.container.clone());
        runtime.start();

        node.protocol().add_local(kept.clone());
        node.protocol().add_local(removed.clone());
        let remove = EntrySigner::new(&key).remove(&removed_payload, 2).unwrap();
        assert!(node.protocol().remove_local(remove).is_accepted());

        // Shutdown writes the final snapshot.
        runtime.shutdown().await;
    }

    let config = file_config(dir.path());
    let snapshots = open_snapshot_store(&config.storage).unwrap();
    let node = TestNode::spawn_with(config, &time, snapshots);

    assert_eq!(node.container.restore.restored, 1);
    assert_eq!(node.store().get(&kept.item_id), Some(kept.clone()));
    assert!(!node.store().contains(&removed.item_id));

    // The removal's sequence mark survived, so the old add cannot come back.
    assert_eq!(
        node.protocol().add_local(removed),
        WriteResult::Rejected(RejectReason::StaleSequenceNumber {
            stored: 2,
            received: 1
        })
    );
}

#[tokio::test]
async fn test_entries_expired_while_down_are_dropped_on_restore() {
    let dir = tempfile::tempdir().unwrap();
    let time = clock();
    let key = owner(8);
    let short = signed(&key, offer("short"), 1, T0, 2 * MINUTE);
    let long = signed(&key, alert("long"), 1, T0, 60 * MINUTE);

    {
        let config = file_config(dir.path());
        let node = TestNode::spawn_with(config.clone(), &time, open_snapshot_store(&config.storage).unwrap());
        node.protocol().add_local(short.clone());
        node.protocol().add_local(long.clone());
        assert!(node.container.scheduler.persist().await.is_written());
    }

    time.advance(10 * MINUTE);
    let config = file_config(dir.path());
    let node = TestNode::spawn_with(config.clone(), &time, open_snapshot_store(&config.storage).unwrap());

    assert_eq!(node.container.restore.restored, 1);
    assert_eq!(node.container.restore.dropped_expired, 1);
    assert!(node.store().contains(&long.item_id));
    assert_eq!(node.store().sequence_number(&short.item_id), Some(1));

    // The restored file no longer matches memory, so the next tick rewrites it.
    assert!(node.container.scheduler.tick().await.unwrap().snapshot.is_written());
}

#[tokio::test]
async fn test_data_directory_cannot_be_shared() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let first = open_snapshot_store(&config.storage).unwrap();

    assert!(open_snapshot_store(&config.storage).is_err());
    drop(first);
    assert!(open_snapshot_store(&config.storage).is_ok());
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("store.snapshot"), b"garbage").unwrap();

    let time = clock();
    let config = file_config(dir.path());
    let node = TestNode::spawn_with(config.clone(), &time, open_snapshot_store(&config.storage).unwrap());
    assert!(node.store().is_empty());

    node.protocol().add_local(signed(&owner(9), alert("fresh"), 1, T0, MINUTE));
    assert!(node.container.scheduler.tick().await.unwrap().snapshot.is_written());
    let reloaded = node.container.snapshots.load_snapshot().unwrap().unwrap();
    assert_eq!(reloaded.entries.len(), 1);
}
