//! # In-Process Network
//!
//! Connects nodes living in one process. Each node owns a `MemoryNetwork`;
//! [`MemoryNetwork::link`] opens a bidirectional connection between two of
//! them. Frames are handed to the remote node's protocol handler exactly as a
//! socket transport would after reading them off the wire.

use async_trait::async_trait;
use gs_02_broadcast::{BroadcastError, PeerNetwork};
use gs_04_protocol::InboundMessageHandler;
use parking_lot::RwLock;
use shared_types::{ConnectionId, Frame};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Clone)]
struct Peer {
    network: Weak<MemoryNetwork>,
    remote_connection: ConnectionId,
}

/// The two ends of a link, as seen by each node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryLink {
    /// Connection id on the first node.
    pub a: ConnectionId,
    /// Connection id on the second node.
    pub b: ConnectionId,
}

#[derive(Default)]
pub struct MemoryNetwork {
    peers: RwLock<HashMap<ConnectionId, Peer>>,
    inbound: RwLock<Option<Arc<dyn InboundMessageHandler>>>,
}

impl MemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Route frames arriving at this node to `handler`.
    pub fn attach(&self, handler: Arc<dyn InboundMessageHandler>) {
        *self.inbound.write() = Some(handler);
    }

    /// Open a connection between `a` and `b`.
    pub fn link(a: &Arc<MemoryNetwork>, b: &Arc<MemoryNetwork>) -> MemoryLink {
        let link = MemoryLink {
            a: next_connection_id(),
            b: next_connection_id(),
        };
        a.peers.write().insert(
            link.a,
            Peer {
                network: Arc::downgrade(b),
                remote_connection: link.b,
            },
        );
        b.peers.write().insert(
            link.b,
            Peer {
                network: Arc::downgrade(a),
                remote_connection: link.a,
            },
        );
        debug!(a = %link.a, b = %link.b, "Memory link opened");
        link
    }

    /// Close `connection` on this node and its remote end.
    pub fn disconnect(&self, connection: ConnectionId) {
        let Some(peer) = self.peers.write().remove(&connection) else {
            return;
        };
        if let Some(remote) = peer.network.upgrade() {
            remote.peers.write().remove(&peer.remote_connection);
        }
        debug!(%connection, "Memory link closed");
    }

    fn deliver(&self, connection: ConnectionId, frame: &[u8]) {
        let handler = self.inbound.read().clone();
        let Some(handler) = handler else {
            trace!(%connection, "No handler attached, frame discarded");
            return;
        };
        if let Err(e) = handler.on_frame(connection, frame) {
            debug!(%connection, error = %e, "Inbound frame dropped");
        }
    }
}

#[async_trait]
impl PeerNetwork for MemoryNetwork {
    fn connected_peers(&self) -> Vec<ConnectionId> {
        let mut peers: Vec<ConnectionId> = self.peers.read().keys().copied().collect();
        peers.sort();
        peers
    }

    async fn send(&self, connection: ConnectionId, frame: Frame) -> Result<(), BroadcastError> {
        let peer = self
            .peers
            .read()
            .get(&connection)
            .cloned()
            .ok_or(BroadcastError::Disconnected(connection))?;
        let remote = peer
            .network
            .upgrade()
            .ok_or(BroadcastError::Disconnected(connection))?;
        remote.deliver(peer.remote_connection, &frame);
        Ok(())
    }
}
