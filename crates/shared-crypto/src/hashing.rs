//! # SHA-256 Hashing
//!
//! One hash function for every identifier in the store: item ids, signing
//! digests and broadcast message ids.

use sha2::{Digest, Sha256};
use shared_types::Hash;

/// Stateful SHA-256 hasher.
#[derive(Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Hash multiple inputs as one stream.
pub fn sha256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256Hasher::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize()
}
