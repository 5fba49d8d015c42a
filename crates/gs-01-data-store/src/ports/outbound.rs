//! Outbound (Driven) ports for the Data Store subsystem.

use shared_types::{Entry, EntrySignature, ItemId, OwnerPublicKey, SignedOperation, StoragePayload};

use crate::domain::{PersistenceError, StoreSnapshot};

pub use shared_types::{ManualTimeSource, SystemTimeSource, TimeSource};

/// Signature and identity checks for entries.
///
/// Kept behind a trait so the store is independent of the signature scheme.
pub trait EntryVerifier: Send + Sync {
    /// True if `signature` is the owner's authorization of `operation` on
    /// `(payload, sequence_number)`.
    fn verify(
        &self,
        payload: &StoragePayload,
        sequence_number: u64,
        operation: &SignedOperation,
        signature: &EntrySignature,
        key: &OwnerPublicKey,
    ) -> bool;

    /// The item id `payload` must be stored under.
    fn item_id(&self, payload: &StoragePayload) -> ItemId;

    /// True if a complete entry carries a valid owner signature: either the
    /// add of its own lifetime, or the refresh that produced its current TTL.
    fn verify_entry(&self, entry: &Entry) -> bool {
        let refresh = SignedOperation::Refresh {
            new_expiry_extension_ms: entry.time_to_live_ms,
        };
        [SignedOperation::add_of(entry), refresh].iter().any(|op| {
            self.verify(
                &entry.payload,
                entry.sequence_number,
                op,
                &entry.signature,
                &entry.owner_public_key,
            )
        })
    }
}

/// Durable storage for store snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Most recent snapshot, or `None` on first start.
    fn load_snapshot(&self) -> Result<Option<StoreSnapshot>, PersistenceError>;

    /// Replace the stored snapshot. Must not leave a torn file behind.
    fn save_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), PersistenceError>;
}
