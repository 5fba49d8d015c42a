//! # Shared Types Crate
//!
//! Contains the replicated data model and the storage protocol messages
//! used by every subsystem of the store.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Entries**: An `Entry` is replaced as a whole, never edited.
//! - **Deterministic Identity**: `ItemId` is derived from payload identity
//!   fields (see `shared-crypto`), never chosen freely by a sender.

pub mod entities;
pub mod errors;
pub mod messages;
pub mod time;
pub mod wire;

pub use entities::*;
pub use errors::*;
pub use messages::*;
pub use time::*;
pub use wire::{Frame, DEFAULT_MAX_FRAME_BYTES, WIRE_VERSION};
