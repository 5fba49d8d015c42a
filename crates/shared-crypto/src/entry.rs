//! # Entry Signing
//!
//! Digest and identity rules shared by every peer:
//!
//! - `item_id = SHA-256(ITEM_ID_DOMAIN || kind tag || identity_bytes)`
//! - `digest  = SHA-256(SIGNING_DOMAIN || op tag || bincode(payload) || seq || op fields)`
//!
//! Op fields are `creation || ttl` for an add, the extension for a refresh and
//! nothing for a remove, all big-endian u64. Refresh and remove are computed
//! over the stored payload.
//!
//! A refreshed entry carries the refresh signature, so an entry verifies
//! either as an add of its own lifetime or as a refresh by its own TTL.

use shared_types::{
    Entry, EntrySignature, Hash, ItemId, OwnerPublicKey, RefreshEntryMessage, RemoveDataMessage,
    SignedOperation, StoragePayload, Timestamp,
};

use crate::hashing::Sha256Hasher;
use crate::signatures::{verify_signature, OwnerKeyPair};
use crate::CryptoError;

/// Domain separator for item-id derivation.
pub const ITEM_ID_DOMAIN: &[u8] = b"gossip-store/item-id/v1";

/// Domain separator for owner signatures.
pub const SIGNING_DOMAIN: &[u8] = b"gossip-store/entry-sig/v2";

/// Derive the item id of a payload from its identity fields.
pub fn derive_item_id(payload: &StoragePayload) -> ItemId {
    let mut hasher = Sha256Hasher::new();
    hasher
        .update(ITEM_ID_DOMAIN)
        .update(&[payload.kind().tag()])
        .update(&payload.identity_bytes());
    ItemId(hasher.finalize())
}

/// Digest signed by the owner to authorize `operation` on `(payload, sequence_number)`.
pub fn signing_digest(
    payload: &StoragePayload,
    sequence_number: u64,
    operation: &SignedOperation,
) -> Result<Hash, CryptoError> {
    let encoded = payload
        .canonical_bytes()
        .map_err(|e| CryptoError::Encoding(e.to_string()))?;

    let mut hasher = Sha256Hasher::new();
    hasher
        .update(SIGNING_DOMAIN)
        .update(&[operation.tag()])
        .update(&encoded)
        .update(&sequence_number.to_be_bytes());
    match operation {
        SignedOperation::Add {
            creation_timestamp,
            time_to_live_ms,
        } => {
            hasher
                .update(&creation_timestamp.to_be_bytes())
                .update(&time_to_live_ms.to_be_bytes());
        }
        SignedOperation::Refresh {
            new_expiry_extension_ms,
        } => {
            hasher.update(&new_expiry_extension_ms.to_be_bytes());
        }
        SignedOperation::Remove => {}
    }
    Ok(hasher.finalize())
}

/// Verify an owner signature authorizing `operation`.
pub fn verify_entry_signature(
    payload: &StoragePayload,
    sequence_number: u64,
    operation: &SignedOperation,
    signature: &EntrySignature,
    key: &OwnerPublicKey,
) -> Result<(), CryptoError> {
    let digest = signing_digest(payload, sequence_number, operation)?;
    verify_signature(key, &digest, signature)
}

/// Builds signed entries and mutation messages for one owner.
///
/// Used by the local API and by tests; the store itself only verifies.
pub struct EntrySigner<'a> {
    keypair: &'a OwnerKeyPair,
}

impl<'a> EntrySigner<'a> {
    /// Signer backed by `keypair`.
    pub fn new(keypair: &'a OwnerKeyPair) -> Self {
        Self { keypair }
    }

    fn sign(
        &self,
        payload: &StoragePayload,
        sequence_number: u64,
        operation: &SignedOperation,
    ) -> Result<EntrySignature, CryptoError> {
        let digest = signing_digest(payload, sequence_number, operation)?;
        Ok(self.keypair.sign(&digest))
    }

    /// A signed entry with a derived item id.
    pub fn entry(
        &self,
        payload: StoragePayload,
        sequence_number: u64,
        creation_timestamp: Timestamp,
        time_to_live_ms: u64,
    ) -> Result<Entry, CryptoError> {
        let operation = SignedOperation::Add {
            creation_timestamp,
            time_to_live_ms,
        };
        let signature = self.sign(&payload, sequence_number, &operation)?;
        Ok(Entry {
            item_id: derive_item_id(&payload),
            payload,
            owner_public_key: self.keypair.public_key(),
            sequence_number,
            signature,
            creation_timestamp,
            time_to_live_ms,
        })
    }

    /// Refresh of the item holding `stored_payload`.
    pub fn refresh(
        &self,
        stored_payload: &StoragePayload,
        sequence_number: u64,
        new_expiry_extension_ms: u64,
    ) -> Result<RefreshEntryMessage, CryptoError> {
        Ok(RefreshEntryMessage {
            item_id: derive_item_id(stored_payload),
            owner_public_key: self.keypair.public_key(),
            sequence_number,
            signature: self.sign(
                stored_payload,
                sequence_number,
                &SignedOperation::Refresh {
                    new_expiry_extension_ms,
                },
            )?,
            new_expiry_extension_ms,
        })
    }

    /// Removal of the item holding `stored_payload`.
    pub fn remove(
        &self,
        stored_payload: &StoragePayload,
        sequence_number: u64,
    ) -> Result<RemoveDataMessage, CryptoError> {
        Ok(RemoveDataMessage {
            item_id: derive_item_id(stored_payload),
            owner_public_key: self.keypair.public_key(),
            sequence_number,
            signature: self.sign(stored_payload, sequence_number, &SignedOperation::Remove)?,
        })
    }
}
