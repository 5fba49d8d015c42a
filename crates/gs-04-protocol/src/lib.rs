//! # Protocol Handler Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Translates storage protocol messages into data store operations and
//! accepted mutations into broadcasts. Also answers and applies the bulk
//! initial-sync exchange for newly connected peers, and exposes the local
//! write API used by the owner running the node.
//!
//! ## Message Routing
//!
//! | Message | Action |
//! |---------|--------|
//! | `AddData` / `RefreshEntry` / `RemoveData` | store, then broadcast if accepted |
//! | `GetAllDataRequest` | reply with entries the peer supports and lacks |
//! | `GetAllDataResponse` | add each entry, no broadcast; nonce must match |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Wire codec for storage protocol frames.
pub use shared_types::wire as codec;

pub use adapters::CapabilityRegistry;
pub use domain::{select_sync_entries, HandlerOutcome, ProtocolConfig, ProtocolError};
pub use ports::{InboundMessageHandler, LocalStoreApi, PeerCapabilities};
pub use service::ProtocolHandler;
