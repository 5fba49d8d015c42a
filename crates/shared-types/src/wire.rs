//! # Wire Codec
//!
//! Frame layout: `[VERSION (1)][bincode(StorageMessage)]`.
//!
//! Encoding is deterministic, so the same message always yields the same
//! frame on every peer. Broadcast message ids rely on this.

use bincode::Options;
use std::sync::Arc;

use crate::errors::CodecError;
use crate::messages::StorageMessage;

/// Current protocol version.
pub const WIRE_VERSION: u8 = 1;

/// Default upper bound on a single frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// An encoded message, shared between per-connection queues.
pub type Frame = Arc<[u8]>;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a message into a frame.
pub fn encode(message: &StorageMessage) -> Result<Frame, CodecError> {
    let body = options()
        .serialize(message)
        .map_err(|e| CodecError::Malformed(e.to_string()))?;
    let mut frame = Vec::with_capacity(body.len() + 1);
    frame.push(WIRE_VERSION);
    frame.extend_from_slice(&body);
    Ok(frame.into())
}

/// Decode a frame, rejecting oversized input before touching the body.
pub fn decode(frame: &[u8], max_frame_bytes: usize) -> Result<StorageMessage, CodecError> {
    if frame.len() > max_frame_bytes {
        return Err(CodecError::FrameTooLarge {
            size: frame.len(),
            max: max_frame_bytes,
        });
    }
    let (&version, body) = frame.split_first().ok_or(CodecError::Empty)?;
    if version != WIRE_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    options()
        .with_limit(max_frame_bytes as u64)
        .deserialize(body)
        .map_err(|e| CodecError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{GetAllDataRequest, StorageMessage};
    use crate::entities::ItemId;

    fn request() -> StorageMessage {
        StorageMessage::GetAllDataRequest(GetAllDataRequest {
            nonce: 42,
            excluded_item_ids: vec![ItemId([1u8; 32]), ItemId([2u8; 32])],
        })
    }

    #[test]
    fn test_decode_encoded() {
        let frame = encode(&request()).unwrap();
        assert_eq!(frame[0], WIRE_VERSION);
        assert_eq!(decode(&frame, DEFAULT_MAX_FRAME_BYTES).unwrap(), request());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        assert_eq!(encode(&request()).unwrap(), encode(&request()).unwrap());
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let frame = encode(&request()).unwrap();
        assert_eq!(
            decode(&frame, 8),
            Err(CodecError::FrameTooLarge {
                size: frame.len(),
                max: 8
            })
        );
    }

    #[test]
    fn test_bad_frames_rejected() {
        assert_eq!(decode(&[], 1024), Err(CodecError::Empty));

        let mut frame = encode(&request()).unwrap().to_vec();
        frame[0] = 7;
        assert_eq!(decode(&frame, 1024), Err(CodecError::UnsupportedVersion(7)));

        assert!(matches!(
            decode(&[WIRE_VERSION, 0xFF, 0xFF], 1024),
            Err(CodecError::Malformed(_))
        ));

        let mut trailing = encode(&request()).unwrap().to_vec();
        trailing.push(0);
        assert!(matches!(decode(&trailing, 1024), Err(CodecError::Malformed(_))));
    }
}
