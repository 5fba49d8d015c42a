//! # Domain Layer - Data Store Subsystem
//!
//! Pure state and validation rules; no I/O.
//!
//! ## Components
//!
//! - `config`: `StoreConfig` limits
//! - `errors`: `RejectReason`, `WriteResult`, `PersistenceError`
//! - `invariants`: stateless write checks
//! - `sequence_map`: per-item sequence-number high-water marks
//! - `snapshot`: persisted image of the store
//! - `state`: the lock-guarded entry table

pub mod config;
pub mod errors;
pub mod invariants;
pub mod sequence_map;
pub mod snapshot;
pub mod state;

pub use config::*;
pub use errors::*;
pub use sequence_map::*;
pub use snapshot::*;
pub use state::*;
