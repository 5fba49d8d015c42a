//! Scheduler configuration.

use std::time::Duration;

/// Maintenance Scheduler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaintenanceConfig {
    /// Period between ticks.
    pub interval_ms: u64,
    /// Write a last snapshot when the scheduler stops.
    pub snapshot_on_shutdown: bool,
}

impl MaintenanceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            snapshot_on_shutdown: true,
        }
    }
}
