//! Outbound ports (SPI) for the Broadcaster subsystem.

use async_trait::async_trait;
use shared_types::{ConnectionId, Frame};

use crate::domain::BroadcastError;

/// Peer transport. Implementations own connection setup and framing on the
/// socket; the broadcaster only hands them encoded frames.
#[async_trait]
pub trait PeerNetwork: Send + Sync {
    /// Connections currently open.
    fn connected_peers(&self) -> Vec<ConnectionId>;

    /// Deliver one frame on one connection.
    async fn send(&self, connection: ConnectionId, frame: Frame) -> Result<(), BroadcastError>;
}
