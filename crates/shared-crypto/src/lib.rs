//! # Shared Crypto - Entry Signing Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Item ids, signing digests, message ids |
//! | `signatures` | Ed25519 | Owner key pairs |
//! | `entry` | SHA-256 + Ed25519 | Signing and verifying entries, refreshes, removes |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Item ids**: Domain-separated, so ids of different kinds never collide

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use entry::{derive_item_id, signing_digest, verify_entry_signature, EntrySigner};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Sha256Hasher};
pub use signatures::{verify_signature, OwnerKeyPair};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
