//! # Broadcaster Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Propagates mutations the data store accepted to a bounded, randomly chosen
//! set of peer connections, suppressing loops with a time-windowed cache of
//! message ids.
//!
//! ## Fan-out
//!
//! | Origin | Targets |
//! |--------|---------|
//! | Local API | every connected peer, capped at `owner_fanout` |
//! | Peer connection | `fanout` random peers, never the origin or known senders |
//!
//! ## Module Structure
//!
//! ```text
//! domain/   - MessageId, SeenMessageCache, select_targets, config, errors
//! ports/    - BroadcastApi (inbound), PeerNetwork (outbound)
//! service   - Broadcaster: dedup + per-connection bounded queues
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    BroadcastConfig, BroadcastError, BroadcastOutcome, BroadcastStats, MessageId, SeenMessageCache,
};
pub use ports::{BroadcastApi, PeerNetwork};
pub use service::Broadcaster;
