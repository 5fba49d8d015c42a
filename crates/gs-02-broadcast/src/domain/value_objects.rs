//! Value objects for broadcast configuration and statistics.

/// Broadcaster configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Number of peers a relayed message is forwarded to.
    pub fanout: usize,
    /// Upper bound on peers for messages this node originated. Locally issued
    /// mutations go to every connected peer up to this cap.
    pub owner_fanout: usize,
    /// How long a broadcast message id suppresses re-broadcast.
    pub dedup_window_ms: u64,
    /// Maximum remembered message ids; oldest evicted first.
    pub dedup_capacity: usize,
    /// Per-connection outbound queue length.
    pub queue_capacity: usize,
    /// Deadline for a single send on the transport.
    pub send_timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            fanout: 8,
            owner_fanout: 32,
            dedup_window_ms: 5 * 60 * 1000,
            dedup_capacity: 10_000,
            queue_capacity: 256,
            send_timeout_ms: 10_000,
        }
    }
}

/// Counters exposed for monitoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Messages fanned out.
    pub broadcasts: u64,
    /// Broadcasts skipped because the id was inside the dedup window.
    pub suppressed: u64,
    /// Frames placed on a connection queue.
    pub enqueued: u64,
    /// Frames dropped because a connection queue was full.
    pub dropped: u64,
    /// Frames handed to the transport successfully.
    pub sent: u64,
    /// Sends that failed or timed out.
    pub failed: u64,
}
