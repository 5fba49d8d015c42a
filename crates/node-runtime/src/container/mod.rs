//! # Subsystem Container
//!
//! Central container holding all subsystem instances with their
//! configuration and dependency injection.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig, StorageConfig};
pub use subsystems::{ContainerError, SubsystemContainer};
