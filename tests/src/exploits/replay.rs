use crate::harness::*;
use gs_01_data_store::{DataStoreApi, RejectReason};
use gs_04_protocol::{codec, HandlerOutcome, InboundMessageHandler, LocalStoreApi};
use shared_crypto::EntrySigner;
use shared_types::{AddDataMessage, StorageMessage, DEFAULT_MAX_FRAME_BYTES};

#[tokio::test]
async fn test_replayed_add_after_removal_is_rejected_and_not_relayed() {
    let time = clock();
    let (victim, witness) = (TestNode::spawn(&time), TestNode::spawn(&time));
    let link = connect(&victim, &witness);

    let key = owner(1);
    let payload = offer("replayed");
    let entry = signed(&key, payload.clone(), 1, T0, 5 * MINUTE);
    let captured = codec::encode(&AddDataMessage { entry: entry.clone() }.into()).unwrap();

    victim.protocol().add_local(entry.clone());
    let remove = EntrySigner::new(&key).remove(&payload, 2).unwrap();
    victim.protocol().remove_local(remove);
    assert!(eventually(|| witness.store().sequence_number(&entry.item_id) == Some(2)).await);

    let outcome = witness.protocol().on_frame(link.b, &captured).unwrap();
    assert_eq!(
        outcome,
        HandlerOutcome::Rejected(RejectReason::StaleSequenceNumber {
            stored: 2,
            received: 1
        })
    );
    settle().await;
    assert!(!victim.store().contains(&entry.item_id));
    assert!(!witness.store().contains(&entry.item_id));
}

#[tokio::test]
async fn test_duplicate_delivery_applies_once() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let entry = signed(&owner(2), alert("dup"), 1, T0, MINUTE);
    let message: StorageMessage = AddDataMessage { entry }.into();
    let frame = codec::encode(&message).unwrap();

    let link_a = shared_types::ConnectionId(1);
    let link_b = shared_types::ConnectionId(2);
    assert!(node.protocol().on_frame(link_a, &frame).unwrap().is_applied());
    assert!(matches!(
        node.protocol().on_frame(link_b, &frame).unwrap(),
        HandlerOutcome::Rejected(RejectReason::StaleSequenceNumber { .. })
    ));
    assert_eq!(node.store().epoch(), 1);
}

#[tokio::test]
async fn test_stale_overwrite_rejected() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let key = owner(3);
    let newer = signed(&key, offer("o"), 5, T0, MINUTE);
    let older = signed(&key, offer("o"), 3, T0, 5 * MINUTE);

    assert!(node.protocol().add_local(newer.clone()).is_accepted());
    assert!(!node.protocol().add_local(older).is_accepted());
    assert_eq!(node.store().get(&newer.item_id), Some(newer));
}

#[tokio::test]
async fn test_oversized_frame_rejected_before_decoding() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let frame = vec![shared_types::WIRE_VERSION; DEFAULT_MAX_FRAME_BYTES + 1];

    assert!(node
        .protocol()
        .on_frame(shared_types::ConnectionId(1), &frame)
        .is_err());
    assert!(node.store().is_empty());
}
