//! # Inbound Port - DataStoreApi
//!
//! The operations the protocol handler, the local API and the maintenance
//! scheduler perform on the store.

use shared_types::{
    Entry, ItemId, Origin, PayloadKind, RefreshEntryMessage, RemoveDataMessage, Timestamp,
};
use std::collections::BTreeSet;

use crate::domain::{StoreSnapshot, WriteResult};

/// Primary API of the Data Store subsystem.
pub trait DataStoreApi: Send + Sync {
    /// Validate and store a new entry or a newer version of one.
    fn add(&self, entry: Entry, origin: Origin) -> WriteResult;

    /// Validate a refresh and replace the stored entry with the extended copy.
    fn refresh(&self, request: &RefreshEntryMessage, origin: Origin) -> WriteResult;

    /// Validate a removal and delete the stored entry.
    fn remove(&self, request: &RemoveDataMessage, origin: Origin) -> WriteResult;

    /// Delete every entry whose expiry is at or before `now`.
    fn expire_stale_entries(&self, now: Timestamp) -> BTreeSet<ItemId>;

    /// Drop aged sequence-number records. Returns how many were dropped.
    fn prune_sequence_numbers(&self, now: Timestamp) -> usize;

    /// Copy of every live entry.
    fn get_all(&self) -> Vec<Entry>;

    fn get(&self, item_id: &ItemId) -> Option<Entry>;

    fn get_by_kind(&self, kind: PayloadKind) -> Vec<Entry>;

    fn contains(&self, item_id: &ItemId) -> bool {
        self.get(item_id).is_some()
    }

    /// Ids of every live entry, for the exclusion list of a sync request.
    fn item_ids(&self) -> Vec<ItemId>;

    /// Sequence-number high-water mark, live or historical.
    fn sequence_number(&self, item_id: &ItemId) -> Option<u64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutation counter; moves on every change that a snapshot would capture.
    fn epoch(&self) -> u64;

    /// Consistent copy of entries and sequence history.
    fn snapshot(&self) -> StoreSnapshot;
}
