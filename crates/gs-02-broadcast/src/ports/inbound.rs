//! Inbound port (API) for the Broadcaster subsystem.

use shared_types::{ConnectionId, Origin, StorageMessage};

use crate::domain::{BroadcastError, BroadcastOutcome, BroadcastStats, MessageId};

/// Broadcaster API used by the protocol handler and the maintenance scheduler.
///
/// Every method returns without waiting on the network. Frames are queued
/// per connection and written by background tasks.
pub trait BroadcastApi: Send + Sync {
    /// Fan an accepted mutation out to peers.
    fn broadcast(
        &self,
        message: &StorageMessage,
        origin: Origin,
    ) -> Result<BroadcastOutcome, BroadcastError>;

    /// Remember that `connection` delivered `message_id`.
    fn note_received(&self, message_id: MessageId, connection: ConnectionId);

    /// Queue a message for a single connection, bypassing dedup.
    fn send_direct(
        &self,
        connection: ConnectionId,
        message: &StorageMessage,
    ) -> Result<(), BroadcastError>;

    /// Drop queues of connections the transport no longer reports.
    fn prune_disconnected(&self) -> usize;

    fn stats(&self) -> BroadcastStats;
}
