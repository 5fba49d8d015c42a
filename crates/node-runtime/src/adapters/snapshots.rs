use gs_01_data_store::{
    FileSnapshotStore, MemorySnapshotStore, PersistenceError, SnapshotStore,
};
use std::sync::Arc;
use tracing::info;

use crate::container::config::StorageConfig;

/// File-backed store in `data_dir`, or an in-memory one when persistence is off.
pub fn open_snapshot_store(
    config: &StorageConfig,
) -> Result<Arc<dyn SnapshotStore>, PersistenceError> {
    if config.persist {
        Ok(Arc::new(FileSnapshotStore::open(config.data_dir.clone())?))
    } else {
        info!("Persistence disabled, snapshots kept in memory");
        Ok(Arc::new(MemorySnapshotStore::new()))
    }
}
