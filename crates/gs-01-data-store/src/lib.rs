//! # Data Store Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Holds the entries this node currently considers valid and decides which
//! incoming mutations are allowed to change them. Every Add, Refresh and
//! Remove, local or from a peer, goes through the same pipeline.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One live entry per item id | `domain/state.rs` - `HashMap<ItemId, Entry>` |
//! | Sequence numbers never go backwards, even after removal or expiry | `domain/sequence_map.rs` - `record()` |
//! | Ties on sequence number are replays | `domain/invariants.rs` - `check_sequence()` |
//! | Owner key fixed for an item's lifetime | `domain/invariants.rs` - `check_owner()` |
//! | Item id derived from payload | `domain/invariants.rs` - `check_item_id()` |
//! | Signatures bound to one operation | `ports/outbound.rs` - `EntryVerifier` with `SignedOperation` |
//!
//! ## Validation Order
//!
//! ```text
//! add:            signature → sequence → ttl → item id → payload → owner → timing → capacity
//! refresh/remove: lookup → signature (stored payload, own op tag) → owner → sequence → ttl → expiry
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - Ed25519 verifier, file and memory snapshot stores  │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - DataStoreApi                               │
//! │  ports/outbound.rs - EntryVerifier, SnapshotStore, TimeSource   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/ - StoreState, SequenceNumberMap, invariants, errors    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{Ed25519EntryVerifier, FileSnapshotStore, MemorySnapshotStore};
pub use domain::{
    PersistenceError, RejectReason, RestoreReport, SequenceNumberMap, SequenceRecord, StoreConfig,
    StoreSnapshot, WriteResult,
};
pub use ports::{DataStoreApi, EntryVerifier, SnapshotStore};
pub use service::DataStore;
