//! Ed25519 / SHA-256 entry verifier.

use shared_crypto::{derive_item_id, verify_entry_signature};
use shared_types::{EntrySignature, ItemId, OwnerPublicKey, SignedOperation, StoragePayload};

use crate::ports::EntryVerifier;

#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519EntryVerifier;

impl EntryVerifier for Ed25519EntryVerifier {
    fn verify(
        &self,
        payload: &StoragePayload,
        sequence_number: u64,
        operation: &SignedOperation,
        signature: &EntrySignature,
        key: &OwnerPublicKey,
    ) -> bool {
        verify_entry_signature(payload, sequence_number, operation, signature, key).is_ok()
    }

    fn item_id(&self, payload: &StoragePayload) -> ItemId {
        derive_item_id(payload)
    }
}
