//! Gossip of accepted mutations through the overlay.

use crate::harness::*;
use gs_01_data_store::DataStoreApi;
use gs_02_broadcast::BroadcastApi;
use gs_04_protocol::LocalStoreApi;
use shared_bus::{EventFilter, StoreEvent};
use shared_crypto::EntrySigner;
use shared_types::{Origin, PayloadKind};

#[tokio::test]
async fn test_add_reaches_every_node_on_a_line() {
    let time = clock();
    let (a, b, c) = (TestNode::spawn(&time), TestNode::spawn(&time), TestNode::spawn(&time));
    connect(&a, &b);
    connect(&b, &c);

    let entry = signed(&owner(1), offer("o-1"), 1, T0, 5 * MINUTE);
    assert!(a.protocol().add_local(entry.clone()).is_accepted());

    assert!(eventually(|| c.store().contains(&entry.item_id)).await);
    assert_eq!(b.store().get(&entry.item_id), Some(entry.clone()));
    assert_eq!(c.store().get(&entry.item_id), Some(entry));
    settle().await;

    // B relays to C only, never back to A; C has nobody left to tell.
    let (a_stats, b_stats, c_stats) = (
        a.container.broadcaster.stats(),
        b.container.broadcaster.stats(),
        c.container.broadcaster.stats(),
    );
    assert_eq!(a_stats.enqueued, 1);
    assert_eq!(b_stats.broadcasts, 1);
    assert_eq!(b_stats.enqueued, 1);
    assert_eq!(c_stats.enqueued, 0);
}

#[tokio::test]
async fn test_refresh_then_remove_propagate() {
    let time = clock();
    let (a, b, c) = (TestNode::spawn(&time), TestNode::spawn(&time), TestNode::spawn(&time));
    connect(&a, &b);
    connect(&b, &c);

    let key = owner(1);
    let payload = offer("o-2");
    let entry = signed(&key, payload.clone(), 1, T0, 5 * MINUTE);
    a.protocol().add_local(entry.clone());
    assert!(eventually(|| c.store().contains(&entry.item_id)).await);

    time.advance(MINUTE);
    let refresh = EntrySigner::new(&key).refresh(&payload, 2, 8 * MINUTE).unwrap();
    assert!(a.protocol().refresh_local(refresh).is_accepted());
    assert!(eventually(|| c.store().sequence_number(&entry.item_id) == Some(2)).await);

    let refreshed = c.store().get(&entry.item_id).unwrap();
    assert_eq!(refreshed.creation_timestamp, T0 + MINUTE);
    assert_eq!(refreshed.time_to_live_ms, 8 * MINUTE);

    let remove = EntrySigner::new(&key).remove(&payload, 3).unwrap();
    assert!(a.protocol().remove_local(remove).is_accepted());
    assert!(eventually(|| !c.store().contains(&entry.item_id)).await);
    assert_eq!(c.store().sequence_number(&entry.item_id), Some(3));
}

#[tokio::test]
async fn test_mesh_broadcasts_each_message_once_per_node() {
    let time = clock();
    let nodes: Vec<TestNode> = (0..5).map(|_| TestNode::spawn(&time)).collect();
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            connect(&nodes[i], &nodes[j]);
        }
    }

    let entry = signed(&owner(2), alert("upgrade"), 1, T0, 60 * MINUTE);
    nodes[0].protocol().add_local(entry.clone());

    assert!(eventually(|| nodes.iter().all(|n| n.store().contains(&entry.item_id))).await);
    settle().await;

    for node in &nodes {
        assert_eq!(node.container.broadcaster.stats().broadcasts, 1);
        assert_eq!(node.store().len(), 1);
    }
}

#[tokio::test]
async fn test_remote_node_publishes_added_event_with_peer_origin() {
    let time = clock();
    let (a, b) = (TestNode::spawn(&time), TestNode::spawn(&time));
    let link = connect(&a, &b);
    let mut alerts = b.container.bus.subscribe(EventFilter::kinds(vec![PayloadKind::Alert]));

    a.protocol().add_local(signed(&owner(1), offer("ignored"), 1, T0, MINUTE));
    let entry = signed(&owner(1), alert("news"), 1, T0, MINUTE);
    a.protocol().add_local(entry.clone());

    let event = tokio::time::timeout(std::time::Duration::from_secs(2), alerts.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        StoreEvent::Added {
            entry,
            origin: Origin::Peer(link.b),
        }
    );
}

#[tokio::test]
async fn test_expired_entries_swept_on_every_node() {
    let time = clock();
    let (a, b) = (TestNode::spawn(&time), TestNode::spawn(&time));
    connect(&a, &b);

    let short = signed(&owner(1), offer("short"), 1, T0, 2 * MINUTE);
    let long = signed(&owner(1), offer("long"), 1, T0, 9 * MINUTE);
    a.protocol().add_local(short.clone());
    a.protocol().add_local(long.clone());
    assert!(eventually(|| b.store().len() == 2).await);

    time.advance(2 * MINUTE);
    for node in [&a, &b] {
        let report = node.container.scheduler.tick().await.unwrap();
        assert_eq!(report.expired.len(), 1);
        assert!(report.expired.contains(&short.item_id));
        assert!(node.store().contains(&long.item_id));
    }
}

#[tokio::test]
async fn test_disconnected_peer_queue_pruned_on_tick() {
    let time = clock();
    let (a, b) = (TestNode::spawn(&time), TestNode::spawn(&time));
    let link = connect(&a, &b);

    a.protocol().add_local(signed(&owner(1), offer("o"), 1, T0, MINUTE));
    assert_eq!(a.container.broadcaster.queued_connections(), vec![link.a]);

    a.network.disconnect(link.a);
    let report = a.container.scheduler.tick().await.unwrap();
    assert_eq!(report.pruned_queues, 1);
    assert!(a.container.broadcaster.queued_connections().is_empty());
    assert_eq!(a.container.broadcaster.stats().broadcasts, 1);
}
