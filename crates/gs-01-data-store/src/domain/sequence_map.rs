//! # Sequence Number Map
//!
//! Remembers the highest sequence number ever accepted per item, including
//! items that have since been removed or expired. This is what stops a
//! replayed Add from resurrecting a removed entry.
//!
//! Records are only dropped by [`SequenceNumberMap::prune`], once they are
//! older than the retention ceiling and no live entry depends on them.

use serde::{Deserialize, Serialize};
use shared_types::{ItemId, Timestamp};
use std::collections::HashMap;

/// High-water mark of one item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub sequence_number: u64,
    /// When the mark was last raised.
    pub recorded_at: Timestamp,
}

#[derive(Debug, Default, Clone)]
pub struct SequenceNumberMap {
    records: HashMap<ItemId, SequenceRecord>,
}

impl SequenceNumberMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records, keeping the highest per item.
    pub fn from_records(records: impl IntoIterator<Item = (ItemId, SequenceRecord)>) -> Self {
        let mut map = Self::new();
        for (item_id, record) in records {
            map.record(item_id, record.sequence_number, record.recorded_at);
        }
        map
    }

    pub fn get(&self, item_id: &ItemId) -> Option<SequenceRecord> {
        self.records.get(item_id).copied()
    }

    pub fn high_water(&self, item_id: &ItemId) -> Option<u64> {
        self.records.get(item_id).map(|r| r.sequence_number)
    }

    /// Raise the mark for `item_id`. Lower or equal numbers are ignored, so
    /// the map never goes backwards. Returns whether the mark moved.
    pub fn record(&mut self, item_id: ItemId, sequence_number: u64, now: Timestamp) -> bool {
        match self.records.get_mut(&item_id) {
            Some(existing) if existing.sequence_number >= sequence_number => false,
            Some(existing) => {
                existing.sequence_number = sequence_number;
                existing.recorded_at = now;
                true
            }
            None => {
                self.records.insert(
                    item_id,
                    SequenceRecord {
                        sequence_number,
                        recorded_at: now,
                    },
                );
                true
            }
        }
    }

    /// Drop records older than `retention_ms` unless `is_live` says the item
    /// still has a stored entry. Returns how many were dropped.
    pub fn prune(
        &mut self,
        now: Timestamp,
        retention_ms: u64,
        is_live: impl Fn(&ItemId) -> bool,
    ) -> usize {
        let before = self.records.len();
        self.records.retain(|item_id, record| {
            now.saturating_sub(record.recorded_at) <= retention_ms || is_live(item_id)
        });
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &SequenceRecord)> {
        self.records.iter()
    }
}
