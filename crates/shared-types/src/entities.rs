//! # Core Domain Entities
//!
//! Defines the replicated data model shared by every subsystem of the store.
//!
//! ## Clusters
//!
//! - **Identity**: `ItemId`, `OwnerPublicKey`, `EntrySignature`, `ConnectionId`
//! - **Payloads**: `StoragePayload` and its kinds (`OfferPayload`, `AlertPayload`, ...)
//! - **Entries**: `Entry`, the signed, versioned, time-limited unit of state

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::PayloadError;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// Unix timestamp in milliseconds.
pub type Timestamp = u64;

/// Maximum serialized size of a single payload.
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * MINUTE_MS;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Deterministic identity of a stored item, derived from the payload's
/// identity fields. Used as the key of the data store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ItemId(pub Hash);

impl ItemId {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.short())
    }
}

/// Ed25519 verifying key of the entry owner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerPublicKey(pub [u8; 32]);

impl OwnerPublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for OwnerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerPublicKey({})", hex::encode(&self.0[..4]))
    }
}

/// Ed25519 signature over the entry digest (64 bytes).
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySignature(#[serde_as(as = "Bytes")] pub [u8; 64]);

impl EntrySignature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for EntrySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntrySignature({}..)", hex::encode(&self.0[..4]))
    }
}

/// Transport-assigned identifier of a live peer connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Where a mutation entered this node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Issued by the owning peer through the local API.
    Local,
    /// Received on a peer connection.
    Peer(ConnectionId),
}

impl Origin {
    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Local)
    }

    /// The connection the mutation arrived on, if any.
    pub fn connection(&self) -> Option<ConnectionId> {
        match self {
            Origin::Local => None,
            Origin::Peer(conn) => Some(*conn),
        }
    }
}

// =============================================================================
// CLUSTER B: PAYLOADS
// =============================================================================

/// Discriminant of a payload, used for indices, subscriptions and TTL caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PayloadKind {
    Offer,
    Alert,
    Arbitrator,
    Mailbox,
}

impl PayloadKind {
    /// All known kinds.
    pub const ALL: [PayloadKind; 4] = [
        PayloadKind::Offer,
        PayloadKind::Alert,
        PayloadKind::Arbitrator,
        PayloadKind::Mailbox,
    ];

    /// Stable one-byte tag mixed into item ids.
    pub fn tag(&self) -> u8 {
        match self {
            PayloadKind::Offer => 0x01,
            PayloadKind::Alert => 0x02,
            PayloadKind::Arbitrator => 0x03,
            PayloadKind::Mailbox => 0x04,
        }
    }

    /// Default ceiling for `time_to_live_ms` of entries of this kind.
    ///
    /// Offers are short-lived and kept alive by refreshes; registrations and
    /// mailbox messages live for days.
    pub fn default_max_ttl_ms(&self) -> u64 {
        match self {
            PayloadKind::Offer => 9 * MINUTE_MS,
            PayloadKind::Alert => 10 * DAY_MS,
            PayloadKind::Arbitrator => 10 * DAY_MS,
            PayloadKind::Mailbox => 15 * DAY_MS,
        }
    }

    /// Capability a peer must declare to receive this kind during initial sync.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            PayloadKind::Offer | PayloadKind::Alert => None,
            PayloadKind::Arbitrator => Some(Capability::Arbitration),
            PayloadKind::Mailbox => Some(Capability::Mailbox),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Offer => "offer",
            PayloadKind::Alert => "alert",
            PayloadKind::Arbitrator => "arbitrator",
            PayloadKind::Mailbox => "mailbox",
        };
        f.write_str(name)
    }
}

/// Optional protocol features a peer may declare at connection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    Arbitration,
    Mailbox,
}

/// Side of an offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferDirection {
    Buy,
    Sell,
}

/// A trade offer published to the order book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferPayload {
    pub offer_id: String,
    /// Network address of the maker.
    pub owner_node_address: String,
    pub direction: OfferDirection,
    pub base_currency: String,
    pub counter_currency: String,
    /// Price in the counter currency's smallest unit.
    pub price: u64,
    pub amount: u64,
    pub min_amount: u64,
    pub date_ms: Timestamp,
    pub extra_data: BTreeMap<String, String>,
}

/// A network-wide alert issued by a privileged key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub message: String,
    pub version: String,
    pub is_update_info: bool,
}

/// Registration of an arbitrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitratorPayload {
    pub node_address: String,
    pub languages: Vec<String>,
    pub registration_date_ms: Timestamp,
    pub email: Option<String>,
}

/// Sealed message stored for an offline receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxPayload {
    pub receiver_address: String,
    pub uid: String,
    pub sealed_content: Vec<u8>,
}

/// Type-tagged, immutable content of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoragePayload {
    Offer(OfferPayload),
    Alert(AlertPayload),
    Arbitrator(ArbitratorPayload),
    Mailbox(MailboxPayload),
}

impl StoragePayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            StoragePayload::Offer(_) => PayloadKind::Offer,
            StoragePayload::Alert(_) => PayloadKind::Alert,
            StoragePayload::Arbitrator(_) => PayloadKind::Arbitrator,
            StoragePayload::Mailbox(_) => PayloadKind::Mailbox,
        }
    }

    /// The identity fields hashed into the item id. Fields are length-prefixed
    /// so that ("ab", "c") and ("a", "bc") never collide.
    pub fn identity_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut push = |field: &[u8]| {
            out.extend_from_slice(&(field.len() as u32).to_be_bytes());
            out.extend_from_slice(field);
        };
        match self {
            StoragePayload::Offer(offer) => {
                push(offer.offer_id.as_bytes());
                push(offer.owner_node_address.as_bytes());
            }
            StoragePayload::Alert(alert) => {
                push(alert.version.as_bytes());
                push(alert.message.as_bytes());
            }
            StoragePayload::Arbitrator(arbitrator) => {
                push(arbitrator.node_address.as_bytes());
            }
            StoragePayload::Mailbox(mailbox) => {
                push(mailbox.receiver_address.as_bytes());
                push(mailbox.uid.as_bytes());
            }
        }
        out
    }

    /// Canonical serialized form, the input of signing digests.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        bincode::serialize(self).map_err(|e| PayloadError::Encoding(e.to_string()))
    }

    /// Structural checks independent of any store state.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self {
            StoragePayload::Offer(offer) => {
                require_non_empty("offer_id", &offer.offer_id)?;
                require_non_empty("owner_node_address", &offer.owner_node_address)?;
                if offer.min_amount > offer.amount {
                    return Err(PayloadError::InvalidField {
                        field: "min_amount",
                        reason: "exceeds amount".into(),
                    });
                }
            }
            StoragePayload::Alert(alert) => {
                require_non_empty("message", &alert.message)?;
                require_non_empty("version", &alert.version)?;
            }
            StoragePayload::Arbitrator(arbitrator) => {
                require_non_empty("node_address", &arbitrator.node_address)?;
                if arbitrator.languages.is_empty() {
                    return Err(PayloadError::InvalidField {
                        field: "languages",
                        reason: "at least one language required".into(),
                    });
                }
            }
            StoragePayload::Mailbox(mailbox) => {
                require_non_empty("receiver_address", &mailbox.receiver_address)?;
                require_non_empty("uid", &mailbox.uid)?;
            }
        }

        let size = self.canonical_bytes()?.len();
        if size > MAX_PAYLOAD_BYTES {
            return Err(PayloadError::TooLarge {
                size,
                max: MAX_PAYLOAD_BYTES,
            });
        }
        Ok(())
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), PayloadError> {
    if value.trim().is_empty() {
        return Err(PayloadError::InvalidField {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

// =============================================================================
// CLUSTER C: ENTRIES
// =============================================================================

/// A signed, versioned, time-limited unit of replicated state.
///
/// Entries are immutable; a newer entry with a higher sequence number
/// replaces the stored one as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Derived from `payload`; must match on every write.
    pub item_id: ItemId,
    pub payload: StoragePayload,
    pub owner_public_key: OwnerPublicKey,
    /// Owner-assigned counter; strictly increasing per item.
    pub sequence_number: u64,
    /// Signature over `(payload, sequence_number)`.
    pub signature: EntrySignature,
    pub creation_timestamp: Timestamp,
    pub time_to_live_ms: u64,
}

impl Entry {
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// `creation_timestamp + time_to_live_ms`, saturating.
    pub fn expires_at(&self) -> Timestamp {
        self.creation_timestamp.saturating_add(self.time_to_live_ms)
    }

    /// True once the expiry instant has been reached.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at() <= now
    }
}

/// The mutation an owner signature authorizes.
///
/// Each variant is hashed with its own tag, so a signature made for one
/// operation never verifies as another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignedOperation {
    /// Publish `(payload, seq)` with this exact lifetime.
    Add {
        creation_timestamp: Timestamp,
        time_to_live_ms: u64,
    },
    /// Extend the item holding `payload` by exactly this much.
    Refresh { new_expiry_extension_ms: u64 },
    Remove,
}

impl SignedOperation {
    /// The add authorization of a fully formed entry.
    pub fn add_of(entry: &Entry) -> Self {
        SignedOperation::Add {
            creation_timestamp: entry.creation_timestamp,
            time_to_live_ms: entry.time_to_live_ms,
        }
    }

    /// Stable one-byte tag mixed into signing digests.
    pub fn tag(&self) -> u8 {
        match self {
            SignedOperation::Add { .. } => 0x01,
            SignedOperation::Refresh { .. } => 0x02,
            SignedOperation::Remove => 0x03,
        }
    }
}
