//! # Maintenance Scheduler Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Periodic housekeeping for the data store: removes expired entries, ages
//! out sequence-number history, and keeps a durable snapshot current.
//!
//! ## Guarantees
//!
//! | Property | Where |
//! |----------|-------|
//! | No overlapping ticks | `service.rs` - `running` flag + in-flight check in `run()` |
//! | Snapshot only when something changed | `service.rs` - `persist()` epoch comparison |
//! | Failed writes retried | `persist()` leaves `last_saved_epoch` untouched on error |

pub mod domain;
pub mod service;

pub use domain::{MaintenanceConfig, MaintenanceError, SnapshotOutcome, TickReport};
pub use service::MaintenanceScheduler;
