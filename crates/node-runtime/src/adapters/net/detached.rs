use async_trait::async_trait;
use gs_02_broadcast::{BroadcastError, PeerNetwork};
use shared_types::{ConnectionId, Frame};

/// A node with no peers. Local writes are stored and snapshotted; nothing
/// leaves the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedNetwork;

#[async_trait]
impl PeerNetwork for DetachedNetwork {
    fn connected_peers(&self) -> Vec<ConnectionId> {
        Vec::new()
    }

    async fn send(&self, connection: ConnectionId, _frame: Frame) -> Result<(), BroadcastError> {
        Err(BroadcastError::Disconnected(connection))
    }
}
