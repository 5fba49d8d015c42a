//! Broadcast errors.

use shared_types::{CodecError, ConnectionId};
use thiserror::Error;

/// Transport-level failures. None of these reach the writer of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("Encoding failed: {0}")]
    Encoding(#[from] CodecError),

    #[error("Send to {connection} failed: {reason}")]
    Transport {
        connection: ConnectionId,
        reason: String,
    },

    #[error("Send to {0} timed out")]
    Timeout(ConnectionId),

    #[error("Outbound queue for {0} is full")]
    QueueFull(ConnectionId),

    #[error("Connection {0} is closed")]
    Disconnected(ConnectionId),
}
