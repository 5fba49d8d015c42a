//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{EventFilter, StoreEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::trace;

/// Trait for publishing store events.
///
/// Publishing is synchronous so the store can call it right after releasing
/// its lock, without an async context.
pub trait EventPublisher: Send + Sync {
    /// Publish an event. Returns the number of subscribers it reached.
    fn publish(&self, event: StoreEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
pub struct StoreEventBus {
    sender: broadcast::Sender<StoreEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl StoreEventBus {
    /// Create a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        trace!(topics = ?filter.topics, kinds = ?filter.kinds, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StoreEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for StoreEventBus {
    fn publish(&self, event: StoreEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let topic = event.topic();
        let item = event.item_id().short();
        // No receivers is the normal case for a headless node.
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(?topic, item = %item, receivers, "Event published");
        receivers
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: StoreEvent) -> usize {
        0
    }

    fn events_published(&self) -> u64 {
        0
    }
}
