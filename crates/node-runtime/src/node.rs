//! # Node Runtime
//!
//! Starts and stops the background tasks of an assembled node.
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown to the scheduler and event consumers
//! 2. Wait for the scheduler; it writes a final snapshot
//! 3. Drain outbound broadcast queues

use gs_01_data_store::DataStoreApi;
use gs_02_broadcast::BroadcastApi;
use parking_lot::Mutex;
use shared_bus::EventFilter;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::container::SubsystemContainer;
use crate::wiring::log_store_events;

pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    pub fn new(container: Arc<SubsystemContainer>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the maintenance scheduler and the event logger.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();

        let scheduler = Arc::clone(&self.container.scheduler);
        tasks.push(tokio::spawn(scheduler.run(self.shutdown_rx.clone())));

        let subscription = self.container.bus.subscribe(EventFilter::all());
        tasks.push(tokio::spawn(log_store_events(
            subscription,
            self.shutdown_rx.clone(),
        )));

        info!(
            entries = self.container.restore.restored,
            data_dir = %self.container.config.storage.data_dir.display(),
            "Gossip store node running"
        );
    }

    /// Stop background tasks, persist, and flush outbound queues.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Background task failed during shutdown");
            }
        }

        self.container.broadcaster.shutdown().await;

        let stats = self.container.broadcaster.stats();
        info!(
            entries = self.container.store.len(),
            broadcasts = stats.broadcasts,
            sent = stats.sent,
            dropped = stats.dropped,
            failed = stats.failed,
            "Shutdown complete"
        );
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
