//! Transport adapters implementing `PeerNetwork`.
//!
//! Real transports (sockets, onion routing) live outside this workspace and
//! plug in through the same port.

pub mod detached;
pub mod memory;

pub use detached::DetachedNetwork;
pub use memory::{MemoryNetwork, MemoryLink};
