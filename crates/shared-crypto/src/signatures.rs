//! # Ed25519 Owner Keys
//!
//! Every entry is owned by an Ed25519 key pair. The store only ever sees the
//! 32-byte verifying key ([`OwnerPublicKey`]).

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{EntrySignature, OwnerPublicKey};

/// Ed25519 key pair of an entry owner.
pub struct OwnerKeyPair {
    signing_key: SigningKey,
}

impl OwnerKeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Get public key.
    pub fn public_key(&self) -> OwnerPublicKey {
        OwnerPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> EntrySignature {
        EntrySignature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for OwnerKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerKeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Verify `signature` over `message` with an owner key.
pub fn verify_signature(
    key: &OwnerPublicKey,
    message: &[u8],
    signature: &EntrySignature,
) -> Result<(), CryptoError> {
    let verifying_key =
        VerifyingKey::from_bytes(key.as_bytes()).map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());

    verifying_key
        .verify(message, &sig)
        .map_err(|_| CryptoError::SignatureVerificationFailed)
}
