//! Adapters implementing the outbound ports.

pub mod snapshot_file;
pub mod snapshot_memory;
pub mod verifier;

pub use snapshot_file::FileSnapshotStore;
pub use snapshot_memory::MemorySnapshotStore;
pub use verifier::Ed25519EntryVerifier;
