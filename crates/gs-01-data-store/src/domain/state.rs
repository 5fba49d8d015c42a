//! # Store State
//!
//! Everything guarded by the data store's lock: live entries, the per-kind
//! index and the sequence-number history. Kept together so a single write
//! lock makes every mutation atomic across all three.

use shared_types::{Entry, ItemId, PayloadKind, Timestamp};
use std::collections::{HashMap, HashSet};

use super::sequence_map::SequenceNumberMap;

#[derive(Debug, Default)]
pub struct StoreState {
    entries: HashMap<ItemId, Entry>,
    by_kind: HashMap<PayloadKind, HashSet<ItemId>>,
    pub(crate) sequence_numbers: SequenceNumberMap,
    epoch: u64,
}

impl StoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&Entry> {
        self.entries.get(item_id)
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.entries.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn ids_of_kind(&self, kind: PayloadKind) -> impl Iterator<Item = &ItemId> {
        self.by_kind.get(&kind).into_iter().flatten()
    }

    /// Highest sequence number seen for `item_id`, live or historical.
    pub fn high_water(&self, item_id: &ItemId) -> Option<u64> {
        let live = self.entries.get(item_id).map(|e| e.sequence_number);
        let recorded = self.sequence_numbers.high_water(item_id);
        live.max(recorded)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn set_epoch(&mut self, epoch: u64) {
        self.epoch = epoch;
    }

    /// Store `entry`, replacing any previous version, and raise its
    /// sequence mark.
    pub fn insert(&mut self, entry: Entry, now: Timestamp) -> Option<Entry> {
        let item_id = entry.item_id;
        self.sequence_numbers
            .record(item_id, entry.sequence_number, now);
        self.by_kind.entry(entry.kind()).or_default().insert(item_id);
        let previous = self.entries.insert(item_id, entry);
        self.epoch += 1;
        previous
    }

    /// Delete an entry. The sequence mark is left in place.
    pub fn remove(&mut self, item_id: &ItemId) -> Option<Entry> {
        let removed = self.entries.remove(item_id)?;
        if let Some(ids) = self.by_kind.get_mut(&removed.kind()) {
            ids.remove(item_id);
            if ids.is_empty() {
                self.by_kind.remove(&removed.kind());
            }
        }
        self.epoch += 1;
        Some(removed)
    }

    /// Raise the sequence mark without storing an entry (used by remove).
    pub fn record_sequence(&mut self, item_id: ItemId, sequence_number: u64, now: Timestamp) {
        if self.sequence_numbers.record(item_id, sequence_number, now) {
            self.epoch += 1;
        }
    }

    /// Ids of entries whose expiry is at or before `now`.
    pub fn expired_ids(&self, now: Timestamp) -> Vec<ItemId> {
        self.entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.item_id)
            .collect()
    }

    /// Prune aged sequence marks of items that are no longer stored.
    pub fn prune_sequence_numbers(&mut self, now: Timestamp, retention_ms: u64) -> usize {
        let entries = &self.entries;
        let pruned = self
            .sequence_numbers
            .prune(now, retention_ms, |id| entries.contains_key(id));
        if pruned > 0 {
            self.epoch += 1;
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AlertPayload, EntrySignature, OwnerPublicKey, StoragePayload};

    fn entry(id: u8, seq: u64) -> Entry {
        Entry {
            item_id: ItemId([id; 32]),
            payload: StoragePayload::Alert(AlertPayload {
                message: "m".into(),
                version: "v".into(),
                is_update_info: false,
            }),
            owner_public_key: OwnerPublicKey([1u8; 32]),
            sequence_number: seq,
            signature: EntrySignature([0u8; 64]),
            creation_timestamp: 0,
            time_to_live_ms: 100,
        }
    }

    #[test]
    fn test_kind_index_follows_entries() {
        let mut state = StoreState::new();
        state.insert(entry(1, 1), 0);
        state.insert(entry(2, 1), 0);
        assert_eq!(state.ids_of_kind(PayloadKind::Alert).count(), 2);

        state.remove(&ItemId([1; 32]));
        assert_eq!(state.ids_of_kind(PayloadKind::Alert).count(), 1);
        assert_eq!(state.ids_of_kind(PayloadKind::Offer).count(), 0);
    }

    #[test]
    fn test_remove_keeps_sequence_mark() {
        let mut state = StoreState::new();
        state.insert(entry(1, 4), 0);
        state.remove(&ItemId([1; 32]));

        assert!(!state.contains(&ItemId([1; 32])));
        assert_eq!(state.high_water(&ItemId([1; 32])), Some(4));
    }

    #[test]
    fn test_epoch_moves_on_every_mutation() {
        let mut state = StoreState::new();
        assert_eq!(state.epoch(), 0);
        state.insert(entry(1, 1), 0);
        state.record_sequence(ItemId([1; 32]), 2, 0);
        state.remove(&ItemId([1; 32]));
        assert_eq!(state.epoch(), 3);

        // Nothing to remove, nothing to raise.
        state.remove(&ItemId([1; 32]));
        state.record_sequence(ItemId([1; 32]), 2, 0);
        assert_eq!(state.epoch(), 3);
    }
}
