//! # Node Runtime Library
//!
//! Composition root of a gossip store node, exposed as a library so
//! integration tests can assemble nodes in-process.
//!
//! - `container/` - configuration and subsystem wiring
//! - `adapters/`  - transport and snapshot adapters
//! - `wiring/`    - event bus consumers
//! - `node`       - lifecycle of the background tasks

pub mod adapters;
pub mod container;
pub mod node;
pub mod wiring;

pub use container::{ConfigError, ContainerError, NodeConfig, StorageConfig, SubsystemContainer};
pub use node::NodeRuntime;
