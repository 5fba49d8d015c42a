//! # Shared Bus - Store Event Subscriptions
//!
//! The data store publishes a [`StoreEvent`] for every accepted mutation and
//! every expiry. Upper layers (an order book, an alert view, a mailbox poller)
//! subscribe with an [`EventFilter`] and react without polling the store.
//!
//! ```text
//! ┌──────────────┐    publish()     ┌──────────────┐   subscribe()   ┌──────────────┐
//! │  Data Store  │ ───────────────▶ │  Event Bus   │ ──────────────▶ │  Upper layer │
//! └──────────────┘                  └──────────────┘                 └──────────────┘
//! ```
//!
//! Publishing never blocks the writer: slow subscribers lag and lose the
//! oldest events instead of holding back the store.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, StoreEvent};
pub use publisher::{EventPublisher, NoopPublisher, StoreEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
