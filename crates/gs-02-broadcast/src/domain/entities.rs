//! Core entities for the Broadcaster subsystem.

use shared_crypto::sha256;
use shared_types::{ConnectionId, Hash};
use std::fmt;

/// Identity of a broadcast: SHA-256 of its encoded frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub Hash);

impl MessageId {
    pub fn of_frame(frame: &[u8]) -> Self {
        Self(sha256(frame))
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId(")?;
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

/// Result of a broadcast request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Frame queued for these connections.
    Sent {
        message_id: MessageId,
        targets: Vec<ConnectionId>,
    },
    /// Same message already broadcast within the dedup window.
    Suppressed { message_id: MessageId },
}

impl BroadcastOutcome {
    pub fn message_id(&self) -> MessageId {
        match self {
            BroadcastOutcome::Sent { message_id, .. }
            | BroadcastOutcome::Suppressed { message_id } => *message_id,
        }
    }

    /// Connections the frame was queued for; empty when suppressed.
    pub fn targets(&self) -> &[ConnectionId] {
        match self {
            BroadcastOutcome::Sent { targets, .. } => targets,
            BroadcastOutcome::Suppressed { .. } => &[],
        }
    }
}
