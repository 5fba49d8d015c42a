use gs_02_broadcast::BroadcastError;
use shared_types::CodecError;
use thiserror::Error;

/// Errors surfaced to the transport layer.
///
/// Rejected writes are not errors; see [`crate::HandlerOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Undecodable frame: {0}")]
    Codec(#[from] CodecError),

    #[error("Broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),
}
