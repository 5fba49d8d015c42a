//! Persisted image of the data store.

use serde::{Deserialize, Serialize};
use shared_types::{Entry, ItemId, Timestamp};

use super::sequence_map::SequenceRecord;

/// Live entries plus the full sequence-number history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub entries: Vec<Entry>,
    pub sequence_numbers: Vec<(ItemId, SequenceRecord)>,
    /// Store mutation counter when the snapshot was taken.
    pub epoch: u64,
    pub taken_at: Timestamp,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.sequence_numbers.is_empty()
    }
}

/// What happened to persisted entries while rebuilding the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    pub dropped_expired: usize,
    pub dropped_invalid: usize,
    pub sequence_records: usize,
}
