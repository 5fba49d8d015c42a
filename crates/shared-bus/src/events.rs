//! # Store Events
//!
//! Events emitted by the data store after a mutation has been applied.

use shared_types::entities::{Entry, ItemId, Origin, PayloadKind, Timestamp};

/// A change to the set of live entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new entry, or a newer version of an existing one, was stored.
    Added { entry: Entry, origin: Origin },

    /// An entry's lifetime was extended.
    Refreshed {
        item_id: ItemId,
        kind: PayloadKind,
        sequence_number: u64,
        expires_at: Timestamp,
        origin: Origin,
    },

    /// An entry was deleted by its owner.
    Removed {
        item_id: ItemId,
        kind: PayloadKind,
        sequence_number: u64,
        origin: Origin,
    },

    /// An entry reached the end of its time-to-live.
    Expired { item_id: ItemId, kind: PayloadKind },
}

impl StoreEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Added { .. } => EventTopic::Added,
            Self::Refreshed { .. } => EventTopic::Refreshed,
            Self::Removed { .. } => EventTopic::Removed,
            Self::Expired { .. } => EventTopic::Expired,
        }
    }

    /// Payload kind of the affected entry.
    #[must_use]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Added { entry, .. } => entry.kind(),
            Self::Refreshed { kind, .. } | Self::Removed { kind, .. } | Self::Expired { kind, .. } => {
                *kind
            }
        }
    }

    /// Item the event refers to.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        match self {
            Self::Added { entry, .. } => entry.item_id,
            Self::Refreshed { item_id, .. }
            | Self::Removed { item_id, .. }
            | Self::Expired { item_id, .. } => *item_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Added,
    Refreshed,
    Removed,
    Expired,
}

/// Filter for subscribing to specific events. Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to receive.
    pub topics: Vec<EventTopic>,
    /// Payload kinds to receive.
    pub kinds: Vec<PayloadKind>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific payload kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<PayloadKind>) -> Self {
        Self {
            topics: Vec::new(),
            kinds,
        }
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            kinds: Vec::new(),
        }
    }

    /// Narrow an existing filter to the given topics.
    #[must_use]
    pub fn with_topics(mut self, topics: Vec<EventTopic>) -> Self {
        self.topics = topics;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &StoreEvent) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());
        let kind_match = self.kinds.is_empty() || self.kinds.contains(&event.kind());
        topic_match && kind_match
    }
}
