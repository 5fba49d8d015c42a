use shared_types::{Capability, ConnectionId};
use std::collections::BTreeSet;

/// Capabilities a peer declared when its connection was set up.
///
/// Negotiation happens in the transport; the handler only reads the result.
pub trait PeerCapabilities: Send + Sync {
    fn capabilities(&self, connection: ConnectionId) -> BTreeSet<Capability>;
}
