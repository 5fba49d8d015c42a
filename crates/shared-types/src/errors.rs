//! # Error Types
//!
//! Errors raised by the shared model itself.

use thiserror::Error;

/// Structural problems with a payload, independent of store state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// A required field is empty or out of range.
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Serialized payload exceeds the size limit.
    #[error("Payload too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// Canonical encoding failed.
    #[error("Payload encoding failed: {0}")]
    Encoding(String),
}

/// Failures turning frames into messages and back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Frame is larger than the configured maximum.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Frame has no version byte.
    #[error("Empty frame")]
    Empty,

    /// Frame was produced by an incompatible protocol version.
    #[error("Unsupported wire version {0}")]
    UnsupportedVersion(u8),

    /// Body could not be decoded.
    #[error("Malformed frame: {0}")]
    Malformed(String),
}
