//! # Adapters
//!
//! Port implementations the node is assembled from.

pub mod net;
pub mod snapshots;

pub use net::{DetachedNetwork, MemoryLink, MemoryNetwork};
pub use snapshots::open_snapshot_store;
