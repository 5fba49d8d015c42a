//! What a maintenance tick did.

use shared_types::ItemId;
use std::collections::BTreeSet;
use thiserror::Error;

/// Outcome of the snapshot step of a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Store unchanged since the last successful write.
    Unchanged,
    Written { epoch: u64, entries: usize },
    /// Write failed; retried on the next tick.
    Failed(MaintenanceError),
}

impl SnapshotOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SnapshotOutcome::Written { .. })
    }
}

/// Summary of one maintenance tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub expired: BTreeSet<ItemId>,
    pub pruned_sequence_numbers: usize,
    pub pruned_queues: usize,
    pub snapshot: SnapshotOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaintenanceError {
    #[error("Snapshot write failed: {0}")]
    Persistence(String),

    #[error("Snapshot task aborted: {0}")]
    TaskAborted(String),
}
