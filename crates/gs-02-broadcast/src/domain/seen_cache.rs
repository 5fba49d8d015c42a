//! # Seen Message Cache
//!
//! Loop suppression for gossip. Remembers, per message id, whether this node
//! already broadcast it and which connections delivered it. Bounded by both
//! a time window and a capacity; the oldest ids go first.

use parking_lot::Mutex;
use shared_types::{ConnectionId, Timestamp};
use std::collections::{HashMap, HashSet, VecDeque};

use super::MessageId;

#[derive(Clone, Debug)]
struct SeenMessage {
    first_seen: Timestamp,
    broadcast: bool,
    senders: HashSet<ConnectionId>,
}

#[derive(Debug, Default)]
struct SeenInner {
    messages: HashMap<MessageId, SeenMessage>,
    order: VecDeque<MessageId>,
}

/// Time-windowed, capacity-bounded record of recent messages.
#[derive(Debug)]
pub struct SeenMessageCache {
    inner: Mutex<SeenInner>,
    window_ms: u64,
    capacity: usize,
}

impl SeenMessageCache {
    pub fn new(window_ms: u64, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(SeenInner::default()),
            window_ms,
            capacity: capacity.max(1),
        }
    }

    /// Record that `connection` delivered `id`.
    pub fn note_received(&self, id: MessageId, connection: ConnectionId, now: Timestamp) {
        let mut inner = self.inner.lock();
        self.evict(&mut inner, now);
        self.entry(&mut inner, id, now).senders.insert(connection);
    }

    /// Claim the right to broadcast `id`.
    ///
    /// Returns the connections that already delivered it, or `None` if it was
    /// broadcast inside the window.
    pub fn claim_broadcast(&self, id: MessageId, now: Timestamp) -> Option<HashSet<ConnectionId>> {
        let mut inner = self.inner.lock();
        self.evict(&mut inner, now);
        let seen = self.entry(&mut inner, id, now);
        if seen.broadcast {
            return None;
        }
        seen.broadcast = true;
        Some(seen.senders.clone())
    }

    pub fn was_broadcast(&self, id: &MessageId) -> bool {
        self.inner
            .lock()
            .messages
            .get(id)
            .is_some_and(|m| m.broadcast)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().messages.is_empty()
    }

    fn entry<'a>(&self, inner: &'a mut SeenInner, id: MessageId, now: Timestamp) -> &'a mut SeenMessage {
        if !inner.messages.contains_key(&id) {
            if inner.messages.len() >= self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    inner.messages.remove(&oldest);
                }
            }
            inner.order.push_back(id);
        }
        inner.messages.entry(id).or_insert_with(|| SeenMessage {
            first_seen: now,
            broadcast: false,
            senders: HashSet::new(),
        })
    }

    fn evict(&self, inner: &mut SeenInner, now: Timestamp) {
        while let Some(oldest) = inner.order.front().copied() {
            let expired = inner
                .messages
                .get(&oldest)
                .map_or(true, |m| now.saturating_sub(m.first_seen) >= self.window_ms);
            if !expired {
                break;
            }
            inner.order.pop_front();
            inner.messages.remove(&oldest);
        }
    }
}
