//! # Gossip Store Node
//!
//! Runs a single node: restores the store from the data directory, keeps it
//! maintained and snapshotted, and shuts down cleanly on Ctrl-C.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`GS_LOG`, default `info`)
//! 2. Load configuration from the environment and validate it
//! 3. Open and lock the data directory
//! 4. Build subsystems, restoring the latest snapshot
//! 5. Start background tasks
//!
//! The peer transport is supplied by the embedding application; this binary
//! runs detached from any network.

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::adapters::{open_snapshot_store, DetachedNetwork};
use node_runtime::{NodeConfig, NodeRuntime, SubsystemContainer};
use shared_types::SystemTimeSource;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env("GS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("===========================================");
    info!("  Gossip Store Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    let snapshots = open_snapshot_store(&config.storage).with_context(|| {
        format!(
            "Failed to open data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    let container = SubsystemContainer::build(
        config,
        Arc::new(DetachedNetwork),
        snapshots,
        Arc::new(SystemTimeSource),
    )
    .context("Failed to initialize subsystems")?;

    let runtime = NodeRuntime::new(Arc::new(container));
    runtime.start();

    info!("Node running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
