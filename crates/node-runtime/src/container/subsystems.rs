//! # Subsystem Container
//!
//! Holds all subsystem instances and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! 1. Event bus
//! 2. Data Store (restored from the latest snapshot when one exists)
//! 3. Broadcaster (needs the transport)
//! 4. Protocol Handler (needs store + broadcaster)
//! 5. Maintenance Scheduler (needs store + snapshot store + broadcaster)
//! ```

use gs_01_data_store::{
    DataStore, Ed25519EntryVerifier, EntryVerifier, PersistenceError, RestoreReport,
    SnapshotStore,
};
use gs_02_broadcast::{Broadcaster, PeerNetwork};
use gs_03_maintenance::MaintenanceScheduler;
use gs_04_protocol::{CapabilityRegistry, ProtocolHandler};
use shared_bus::StoreEventBus;
use shared_types::TimeSource;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::container::config::{ConfigError, NodeConfig};

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot storage unavailable: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Subsystems must be built inside a Tokio runtime")]
    NoRuntime,
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub bus: Arc<StoreEventBus>,
    pub store: Arc<DataStore>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub broadcaster: Arc<Broadcaster>,
    pub capabilities: Arc<CapabilityRegistry>,
    pub protocol: Arc<ProtocolHandler>,
    pub scheduler: Arc<MaintenanceScheduler>,
    /// What the startup restore kept and dropped.
    pub restore: RestoreReport,
}

impl SubsystemContainer {
    /// Validate `config` and build every subsystem.
    ///
    /// A snapshot that cannot be read is logged and the node starts empty;
    /// the next maintenance tick overwrites it.
    pub fn build(
        config: NodeConfig,
        network: Arc<dyn PeerNetwork>,
        snapshots: Arc<dyn SnapshotStore>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ContainerError::NoRuntime)?;

        let bus = Arc::new(StoreEventBus::new());
        let verifier: Arc<dyn EntryVerifier> = Arc::new(Ed25519EntryVerifier);

        let (store, restore, restored_epoch) = match snapshots.load_snapshot() {
            Ok(Some(snapshot)) => {
                let epoch = snapshot.epoch;
                let (store, report) = DataStore::from_snapshot(
                    snapshot,
                    config.store.clone(),
                    Arc::clone(&verifier),
                    Arc::clone(&time),
                    bus.clone(),
                );
                // Anything dropped on the way in makes the file stale.
                let clean = report.dropped_expired == 0 && report.dropped_invalid == 0;
                (store, report, clean.then_some(epoch))
            }
            Ok(None) => {
                info!("No snapshot found, starting with an empty store");
                let store = DataStore::new(
                    config.store.clone(),
                    Arc::clone(&verifier),
                    Arc::clone(&time),
                    bus.clone(),
                );
                (store, RestoreReport::default(), None)
            }
            Err(e) => {
                error!(error = %e, "Snapshot unreadable, starting with an empty store");
                let store = DataStore::new(
                    config.store.clone(),
                    Arc::clone(&verifier),
                    Arc::clone(&time),
                    bus.clone(),
                );
                (store, RestoreReport::default(), None)
            }
        };
        let store = Arc::new(store);

        let broadcaster = Arc::new(Broadcaster::new(
            config.broadcast.clone(),
            network,
            Arc::clone(&time),
            runtime,
        ));

        let capabilities = Arc::new(CapabilityRegistry::new());
        let protocol = Arc::new(ProtocolHandler::new(
            config.protocol.clone(),
            store.clone(),
            broadcaster.clone(),
            capabilities.clone(),
        ));

        let mut scheduler = MaintenanceScheduler::new(
            config.maintenance.clone(),
            store.clone(),
            Arc::clone(&snapshots),
            time,
        )
        .with_broadcaster(broadcaster.clone());
        if let Some(epoch) = restored_epoch {
            scheduler = scheduler.with_saved_epoch(epoch);
        } else if restore.dropped_expired + restore.dropped_invalid > 0 {
            warn!("Restored snapshot differs from memory, rewriting on next tick");
        }

        info!(
            fanout = config.broadcast.fanout,
            max_entries = config.store.max_entries,
            maintenance_interval_ms = config.maintenance.interval_ms,
            "Subsystems initialized"
        );

        Ok(Self {
            config,
            bus,
            store,
            snapshots,
            broadcaster,
            capabilities,
            protocol,
            scheduler: Arc::new(scheduler),
            restore,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DetachedNetwork;
    use gs_01_data_store::{MemorySnapshotStore, StoreSnapshot};
    use shared_types::ManualTimeSource;

    fn build(config: NodeConfig, snapshots: Arc<MemorySnapshotStore>) -> Result<SubsystemContainer, ContainerError> {
        SubsystemContainer::build(
            config,
            Arc::new(DetachedNetwork),
            snapshots,
            Arc::new(ManualTimeSource::new(1_700_000_000_000)),
        )
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let result = build(NodeConfig::default(), Arc::new(MemorySnapshotStore::new()));
        assert!(matches!(result, Err(ContainerError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = NodeConfig::default();
        config.broadcast.fanout = 0;
        let result = build(config, Arc::new(MemorySnapshotStore::new()));
        assert!(matches!(result, Err(ContainerError::Config(ConfigError::ZeroFanout))));
    }

    #[tokio::test]
    async fn test_restored_epoch_not_rewritten() {
        let snapshot = StoreSnapshot {
            epoch: 12,
            ..StoreSnapshot::default()
        };
        let snapshots = Arc::new(MemorySnapshotStore::with_snapshot(snapshot));
        let container = build(NodeConfig::default(), snapshots.clone()).unwrap();

        assert_eq!(container.scheduler.last_saved_epoch(), Some(12));
        let report = container.scheduler.tick().await.unwrap();
        assert_eq!(report.snapshot, gs_03_maintenance::SnapshotOutcome::Unchanged);
        assert_eq!(snapshots.save_count(), 0);
    }
}
