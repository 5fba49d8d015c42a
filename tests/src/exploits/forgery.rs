use crate::harness::*;
use gs_01_data_store::{DataStoreApi, RejectReason};
use gs_04_protocol::{HandlerOutcome, InboundMessageHandler, LocalStoreApi};
use shared_crypto::EntrySigner;
use shared_types::{
    AddDataMessage, ConnectionId, RefreshEntryMessage, RemoveDataMessage, StoragePayload,
};

const ATTACKER: ConnectionId = ConnectionId(666);

#[tokio::test]
async fn test_non_owner_cannot_remove() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let (victim, attacker) = (owner(1), owner(2));
    let payload = offer("victim-offer");
    let entry = signed(&victim, payload.clone(), 1, T0, 5 * MINUTE);
    node.protocol().add_local(entry.clone());

    // Correctly signed, but by the wrong key.
    let remove = EntrySigner::new(&attacker).remove(&payload, 9).unwrap();
    assert_eq!(
        node.protocol().on_message(ATTACKER, remove.into()),
        HandlerOutcome::Rejected(RejectReason::OwnerKeyMismatch)
    );

    // Claims the victim's key, signed with its own.
    let mut spoofed = EntrySigner::new(&attacker).remove(&payload, 9).unwrap();
    spoofed.owner_public_key = victim.public_key();
    assert_eq!(
        node.protocol().on_message(ATTACKER, spoofed.into()),
        HandlerOutcome::Rejected(RejectReason::InvalidSignature)
    );

    assert_eq!(node.store().get(&entry.item_id), Some(entry.clone()));
    // Rejected writes do not raise the sequence mark.
    assert_eq!(node.store().sequence_number(&entry.item_id), Some(1));
}

#[tokio::test]
async fn test_non_owner_cannot_refresh() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let payload = offer("victim-offer");
    let entry = signed(&owner(1), payload.clone(), 1, T0, 2 * MINUTE);
    node.protocol().add_local(entry.clone());

    let refresh = EntrySigner::new(&owner(2)).refresh(&payload, 2, 9 * MINUTE).unwrap();
    assert_eq!(
        node.protocol().on_message(ATTACKER, refresh.into()),
        HandlerOutcome::Rejected(RejectReason::OwnerKeyMismatch)
    );
    assert_eq!(node.store().get(&entry.item_id).unwrap().time_to_live_ms, 2 * MINUTE);
}

#[tokio::test]
async fn test_relayed_refresh_replayed_as_remove() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let victim = owner(1);
    let payload = offer("victim-offer");
    let entry = signed(&victim, payload.clone(), 1, T0, 5 * MINUTE);
    node.protocol().add_local(entry.clone());

    // Attacker relays the owner's refresh, repackaged as a removal.
    let refresh = EntrySigner::new(&victim).refresh(&payload, 2, 5 * MINUTE).unwrap();
    let as_remove = RemoveDataMessage {
        item_id: refresh.item_id,
        owner_public_key: refresh.owner_public_key,
        sequence_number: refresh.sequence_number,
        signature: refresh.signature,
    };
    assert_eq!(
        node.protocol().on_message(ATTACKER, as_remove.into()),
        HandlerOutcome::Rejected(RejectReason::InvalidSignature)
    );
    assert!(node.store().contains(&entry.item_id));

    // The genuine refresh still lands.
    assert!(node
        .protocol()
        .on_message(ConnectionId(1), refresh.into())
        .is_applied());
}

#[tokio::test]
async fn test_relayed_remove_replayed_as_refresh() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let victim = owner(1);
    let payload = offer("victim-offer");
    let entry = signed(&victim, payload.clone(), 1, T0, 5 * MINUTE);
    node.protocol().add_local(entry.clone());

    let remove = EntrySigner::new(&victim).remove(&payload, 2).unwrap();
    let as_refresh = RefreshEntryMessage {
        item_id: remove.item_id,
        owner_public_key: remove.owner_public_key,
        sequence_number: remove.sequence_number,
        signature: remove.signature,
        new_expiry_extension_ms: 9 * MINUTE,
    };
    assert_eq!(
        node.protocol().on_message(ATTACKER, as_refresh.into()),
        HandlerOutcome::Rejected(RejectReason::InvalidSignature)
    );

    // The sequence number was not burnt, so the owner's removal still wins.
    assert!(node
        .protocol()
        .on_message(ConnectionId(1), remove.into())
        .is_applied());
    assert!(!node.store().contains(&entry.item_id));
}

#[tokio::test]
async fn test_refresh_extension_rewritten_in_transit() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let victim = owner(1);
    let payload = offer("victim-offer");
    let entry = signed(&victim, payload.clone(), 1, T0, 5 * MINUTE);
    node.protocol().add_local(entry.clone());

    let mut refresh = EntrySigner::new(&victim).refresh(&payload, 2, 5 * MINUTE).unwrap();
    refresh.new_expiry_extension_ms = 0;
    assert_eq!(
        node.protocol().on_message(ATTACKER, refresh.into()),
        HandlerOutcome::Rejected(RejectReason::InvalidSignature)
    );

    assert!(node.store().expire_stale_entries(T0).is_empty());
    assert_eq!(node.store().get(&entry.item_id), Some(entry));
}

#[tokio::test]
async fn test_takeover_by_new_owner_rejected() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let payload = alert("pinned");
    node.protocol().add_local(signed(&owner(1), payload.clone(), 1, T0, MINUTE));

    let hijack = signed(&owner(2), payload, 2, T0, MINUTE);
    assert_eq!(
        node.protocol().on_message(ATTACKER, AddDataMessage { entry: hijack }.into()),
        HandlerOutcome::Rejected(RejectReason::OwnerKeyMismatch)
    );
}

#[tokio::test]
async fn test_payload_swapped_under_valid_signature() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let mut entry = signed(&owner(1), offer("honest"), 1, T0, MINUTE);
    if let StoragePayload::Offer(offer) = &mut entry.payload {
        offer.price = 1;
    }

    assert_eq!(
        node.protocol().on_message(ATTACKER, AddDataMessage { entry }.into()),
        HandlerOutcome::Rejected(RejectReason::InvalidSignature)
    );
    assert!(node.store().is_empty());
}

#[tokio::test]
async fn test_item_id_not_matching_payload_rejected() {
    let time = clock();
    let node = TestNode::spawn(&time);
    let mut entry = signed(&owner(1), offer("honest"), 1, T0, MINUTE);
    entry.item_id = shared_types::ItemId([0x11; 32]);

    assert_eq!(
        node.protocol().on_message(ATTACKER, AddDataMessage { entry }.into()),
        HandlerOutcome::Rejected(RejectReason::ItemIdMismatch)
    );
}
