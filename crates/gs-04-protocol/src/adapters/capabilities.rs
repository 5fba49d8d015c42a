//! In-memory record of per-connection capabilities.

use parking_lot::RwLock;
use shared_types::{Capability, ConnectionId};
use std::collections::{BTreeSet, HashMap};

use crate::ports::PeerCapabilities;

/// Connections without a registration get an empty set and only receive
/// kinds that need no capability.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    peers: RwLock<HashMap<ConnectionId, BTreeSet<Capability>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection: ConnectionId, capabilities: impl IntoIterator<Item = Capability>) {
        self.peers
            .write()
            .insert(connection, capabilities.into_iter().collect());
    }

    pub fn unregister(&self, connection: ConnectionId) {
        self.peers.write().remove(&connection);
    }
}

impl PeerCapabilities for CapabilityRegistry {
    fn capabilities(&self, connection: ConnectionId) -> BTreeSet<Capability> {
        self.peers
            .read()
            .get(&connection)
            .cloned()
            .unwrap_or_default()
    }
}
