//! Data store error types.
//!
//! Validation failures are ordinary values ([`RejectReason`]); they are
//! expected from buggy or hostile peers and never abort processing.

use shared_types::{PayloadError, Timestamp};
use std::path::PathBuf;
use thiserror::Error;

/// Why a write was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Signature does not verify against the declared owner key.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Sequence number not strictly above the stored high-water mark.
    #[error("Stale sequence number: stored {stored}, received {received}")]
    StaleSequenceNumber { stored: u64, received: u64 },

    /// Requested lifetime is longer than allowed for the payload kind.
    #[error("TTL {ttl}ms exceeds maximum {max}ms")]
    TtlExceedsMaximum { ttl: u64, max: u64 },

    /// Declared item id is not the one derived from the payload.
    #[error("Item id does not match payload")]
    ItemIdMismatch,

    /// Refresh or remove for an item that is not stored.
    #[error("Target entry not found")]
    TargetNotFound,

    /// Write signed by a key other than the stored owner's.
    #[error("Owner key mismatch")]
    OwnerKeyMismatch,

    /// Creation timestamp too far ahead of local time.
    #[error("Creation time {created} is in the future (now {now})")]
    CreationTimeInFuture { created: Timestamp, now: Timestamp },

    /// Entry was already past its expiry when it arrived.
    #[error("Entry already expired at {expires_at} (now {now})")]
    AlreadyExpired { expires_at: Timestamp, now: Timestamp },

    /// Payload fails structural checks.
    #[error("Malformed payload: {0}")]
    MalformedPayload(PayloadError),

    /// Store is full and the write would add a new item.
    #[error("Store at capacity ({capacity} entries)")]
    CapacityExceeded { capacity: usize },
}

impl RejectReason {
    /// Stable label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::StaleSequenceNumber { .. } => "stale_sequence_number",
            Self::TtlExceedsMaximum { .. } => "ttl_exceeds_maximum",
            Self::ItemIdMismatch => "item_id_mismatch",
            Self::TargetNotFound => "target_not_found",
            Self::OwnerKeyMismatch => "owner_key_mismatch",
            Self::CreationTimeInFuture { .. } => "creation_time_in_future",
            Self::AlreadyExpired { .. } => "already_expired",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
        }
    }
}

/// Outcome of `add`, `refresh` and `remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    Accepted,
    Rejected(RejectReason),
}

impl WriteResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WriteResult::Accepted)
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self {
            WriteResult::Accepted => None,
            WriteResult::Rejected(reason) => Some(reason),
        }
    }
}

impl From<Result<(), RejectReason>> for WriteResult {
    fn from(result: Result<(), RejectReason>) -> Self {
        match result {
            Ok(()) => WriteResult::Accepted,
            Err(reason) => WriteResult::Rejected(reason),
        }
    }
}

/// Snapshot persistence failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot magic")]
    InvalidMagic,

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u8),

    #[error("Snapshot encoding failed: {0}")]
    Encoding(String),

    #[error("Data directory already in use ({})", path.display())]
    Locked { path: PathBuf },
}

impl From<bincode::Error> for PersistenceError {
    fn from(e: bincode::Error) -> Self {
        PersistenceError::Encoding(e.to_string())
    }
}
