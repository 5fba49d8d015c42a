//! Result of handling one inbound message.

use gs_01_data_store::RejectReason;
use gs_02_broadcast::BroadcastOutcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Mutation accepted by the store. `broadcast` is `None` if fan-out failed.
    Applied { broadcast: Option<BroadcastOutcome> },
    /// Mutation refused by the store and dropped.
    Rejected(RejectReason),
    /// Initial-sync request answered with this many entries.
    SyncServed { entries: usize },
    /// Initial-sync response applied.
    SyncApplied { accepted: usize, rejected: usize },
    /// Message with nothing to act on, such as an unsolicited sync response.
    Ignored,
}

impl HandlerOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, HandlerOutcome::Applied { .. })
    }
}
