//! # Maintenance Scheduler Service
//!
//! Each tick:
//!
//! 1. `expire_stale_entries(now)`
//! 2. `prune_sequence_numbers(now)`
//! 3. drop outbound queues of disconnected peers
//! 4. write a snapshot if the store epoch moved since the last successful write
//!
//! Writes run on the blocking pool so file I/O never stalls the runtime.
//! Mutations are complete once applied in memory; a crash between a write and
//! the next snapshot loses that write locally, and the owner can resend it.

use gs_01_data_store::{DataStoreApi, SnapshotStore};
use gs_02_broadcast::BroadcastApi;
use parking_lot::Mutex;
use shared_types::TimeSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{MaintenanceConfig, MaintenanceError, SnapshotOutcome, TickReport};

/// Clears the running flag when a tick finishes, including on panic.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct MaintenanceScheduler {
    config: MaintenanceConfig,
    store: Arc<dyn DataStoreApi>,
    snapshots: Arc<dyn SnapshotStore>,
    broadcaster: Option<Arc<dyn BroadcastApi>>,
    time: Arc<dyn TimeSource>,
    running: AtomicBool,
    last_saved_epoch: Mutex<Option<u64>>,
}

impl MaintenanceScheduler {
    pub fn new(
        config: MaintenanceConfig,
        store: Arc<dyn DataStoreApi>,
        snapshots: Arc<dyn SnapshotStore>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            store,
            snapshots,
            broadcaster: None,
            time,
            running: AtomicBool::new(false),
            last_saved_epoch: Mutex::new(None),
        }
    }

    /// Also prune the broadcaster's queues each tick.
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn BroadcastApi>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Treat `epoch` as already persisted, e.g. after restoring from a snapshot.
    pub fn with_saved_epoch(self, epoch: u64) -> Self {
        *self.last_saved_epoch.lock() = Some(epoch);
        self
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }

    pub fn last_saved_epoch(&self) -> Option<u64> {
        *self.last_saved_epoch.lock()
    }

    /// Run one tick. Returns `None` if another tick is still running.
    pub async fn tick(&self) -> Option<TickReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous maintenance tick still running, skipping");
            return None;
        }
        let _guard = RunningGuard(&self.running);

        let now = self.time.now();
        let expired = self.store.expire_stale_entries(now);
        let pruned_sequence_numbers = self.store.prune_sequence_numbers(now);
        let pruned_queues = self
            .broadcaster
            .as_ref()
            .map_or(0, |broadcaster| broadcaster.prune_disconnected());

        let snapshot = self.persist().await;

        debug!(
            expired = expired.len(),
            pruned_sequence_numbers,
            pruned_queues,
            snapshot = ?snapshot,
            "Maintenance tick complete"
        );
        Some(TickReport {
            expired,
            pruned_sequence_numbers,
            pruned_queues,
            snapshot,
        })
    }

    /// Write a snapshot if the store changed since the last successful write.
    pub async fn persist(&self) -> SnapshotOutcome {
        if *self.last_saved_epoch.lock() == Some(self.store.epoch()) {
            return SnapshotOutcome::Unchanged;
        }

        let snapshot = self.store.snapshot();
        let epoch = snapshot.epoch;
        let entries = snapshot.entries.len();
        let snapshots = Arc::clone(&self.snapshots);

        let result = tokio::task::spawn_blocking(move || snapshots.save_snapshot(&snapshot)).await;
        match result {
            Ok(Ok(())) => {
                *self.last_saved_epoch.lock() = Some(epoch);
                SnapshotOutcome::Written { epoch, entries }
            }
            Ok(Err(e)) => {
                warn!(error = %e, epoch, "Snapshot write failed, will retry");
                SnapshotOutcome::Failed(MaintenanceError::Persistence(e.to_string()))
            }
            Err(e) => {
                warn!(error = %e, epoch, "Snapshot task aborted, will retry");
                SnapshotOutcome::Failed(MaintenanceError::TaskAborted(e.to_string()))
            }
        }
    }

    /// Tick every `interval` until `shutdown` flips to `true` or its sender
    /// is dropped.
    ///
    /// Ticks run as separate tasks; one that fires while the previous is still
    /// in flight is skipped.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.interval();
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<Option<TickReport>>> = None;

        info!(interval_ms = self.config.interval_ms, "Maintenance scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if in_flight.as_ref().is_some_and(|task| !task.is_finished()) {
                        debug!("Maintenance tick overlaps previous one, skipping");
                        continue;
                    }
                    let scheduler = Arc::clone(&self);
                    in_flight = Some(tokio::spawn(async move { scheduler.tick().await }));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if let Some(task) = in_flight {
            if let Err(e) = task.await {
                warn!(error = %e, "Maintenance tick aborted during shutdown");
            }
        }
        if self.config.snapshot_on_shutdown {
            let outcome = self.persist().await;
            info!(snapshot = ?outcome, "Final snapshot on shutdown");
        }
        info!("Maintenance scheduler stopped");
    }
}
