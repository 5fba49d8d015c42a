//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Defaults suit a production node; the environment overrides individual
//! values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GS_DATA_DIR` | `storage.data_dir` |
//! | `GS_FANOUT` | `broadcast.fanout` |
//! | `GS_DEDUP_WINDOW_SECS` | `broadcast.dedup_window_ms` |
//! | `GS_MAINTENANCE_INTERVAL_SECS` | `maintenance.interval_ms` |
//! | `GS_SEQ_RETENTION_DAYS` | `store.sequence_retention_ms` |
//! | `GS_MAX_ENTRIES` | `store.max_entries` |

use gs_01_data_store::StoreConfig;
use gs_02_broadcast::BroadcastConfig;
use gs_03_maintenance::MaintenanceConfig;
use gs_04_protocol::ProtocolConfig;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const SECOND_MS: u64 = 1_000;
const DAY_MS: u64 = 24 * 60 * 60 * SECOND_MS;

/// Smallest frame limit that still fits one maximum-size payload.
const MIN_MESSAGE_BYTES: usize = shared_types::MAX_PAYLOAD_BYTES + 4 * 1024;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub store: StoreConfig,
    pub broadcast: BroadcastConfig,
    pub maintenance: MaintenanceConfig,
    pub protocol: ProtocolConfig,
}

/// Where snapshots live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// When false, snapshots are kept in memory only.
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            persist: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid value")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Broadcast fan-out must be at least 1")]
    ZeroFanout,

    #[error("Dedup window must be non-zero")]
    ZeroDedupWindow,

    #[error("Outbound queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("Maintenance interval must be non-zero")]
    ZeroMaintenanceInterval,

    #[error("Store capacity must be at least 1")]
    ZeroCapacity,

    #[error("max_message_bytes {actual} is below the minimum {min}")]
    MessageLimitTooSmall { actual: usize, min: usize },
}

impl NodeConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("GS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(fanout) = parse::<usize, _>(&lookup, "GS_FANOUT")? {
            self.broadcast.fanout = fanout;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "GS_DEDUP_WINDOW_SECS")? {
            self.broadcast.dedup_window_ms = secs.saturating_mul(SECOND_MS);
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "GS_MAINTENANCE_INTERVAL_SECS")? {
            self.maintenance.interval_ms = secs.saturating_mul(SECOND_MS);
        }
        if let Some(days) = parse::<u64, _>(&lookup, "GS_SEQ_RETENTION_DAYS")? {
            self.store.sequence_retention_ms = days.saturating_mul(DAY_MS);
        }
        if let Some(max) = parse::<usize, _>(&lookup, "GS_MAX_ENTRIES")? {
            self.store.max_entries = max;
        }
        Ok(())
    }

    /// Reject values the subsystems cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast.fanout == 0 || self.broadcast.owner_fanout == 0 {
            return Err(ConfigError::ZeroFanout);
        }
        if self.broadcast.dedup_window_ms == 0 {
            return Err(ConfigError::ZeroDedupWindow);
        }
        if self.broadcast.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.maintenance.interval_ms == 0 {
            return Err(ConfigError::ZeroMaintenanceInterval);
        }
        if self.store.max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.protocol.max_message_bytes < MIN_MESSAGE_BYTES {
            return Err(ConfigError::MessageLimitTooSmall {
                actual: self.protocol.max_message_bytes,
                min: MIN_MESSAGE_BYTES,
            });
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
