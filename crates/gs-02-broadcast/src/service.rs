//! # Broadcaster Service
//!
//! Gossips accepted mutations to a bounded subset of peers.
//!
//! ## Flow
//!
//! ```text
//! broadcast(message, origin)
//!   encode → message id → dedup claim → select targets → enqueue per connection
//!                                                             ↓
//!                                   send task: timeout(network.send(frame))
//! ```
//!
//! `broadcast` never waits on the network. Each connection owns a bounded
//! queue drained by one task, so a slow peer only delays itself. A full queue
//! drops the frame for that peer; failed or timed-out sends are counted and
//! logged. None of it is reported back to the writer of the mutation.

use parking_lot::Mutex;
use shared_types::wire;
use shared_types::{ConnectionId, Frame, Origin, StorageMessage, TimeSource};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::domain::{
    select_targets, BroadcastConfig, BroadcastError, BroadcastOutcome, BroadcastStats, MessageId,
    SeenMessageCache,
};
use crate::ports::{BroadcastApi, PeerNetwork};

#[derive(Debug, Default)]
struct Counters {
    broadcasts: AtomicU64,
    suppressed: AtomicU64,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BroadcastStats {
        BroadcastStats {
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

struct OutboundQueue {
    sender: mpsc::Sender<Frame>,
    task: JoinHandle<()>,
}

/// Broadcaster service.
///
/// Thread-safe; share it behind an `Arc`.
pub struct Broadcaster {
    config: BroadcastConfig,
    network: Arc<dyn PeerNetwork>,
    time: Arc<dyn TimeSource>,
    runtime: Handle,
    seen: SeenMessageCache,
    queues: Mutex<HashMap<ConnectionId, OutboundQueue>>,
    counters: Arc<Counters>,
}

impl Broadcaster {
    /// Create a broadcaster whose send tasks run on `runtime`.
    pub fn new(
        config: BroadcastConfig,
        network: Arc<dyn PeerNetwork>,
        time: Arc<dyn TimeSource>,
        runtime: Handle,
    ) -> Self {
        Self {
            seen: SeenMessageCache::new(config.dedup_window_ms, config.dedup_capacity),
            config,
            network,
            time,
            runtime,
            queues: Mutex::new(HashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Connections with a live outbound queue.
    pub fn queued_connections(&self) -> Vec<ConnectionId> {
        let mut conns: Vec<_> = self.queues.lock().keys().copied().collect();
        conns.sort();
        conns
    }

    /// Close every queue and wait for the send tasks to drain.
    pub async fn shutdown(&self) {
        let queues: Vec<OutboundQueue> = self.queues.lock().drain().map(|(_, q)| q).collect();
        for queue in queues {
            drop(queue.sender);
            if let Err(e) = queue.task.await {
                warn!(error = %e, "Send task ended abnormally");
            }
        }
    }

    fn enqueue(&self, connection: ConnectionId, frame: Frame) -> Result<(), BroadcastError> {
        let mut queues = self.queues.lock();
        let queue = queues
            .entry(connection)
            .or_insert_with(|| self.spawn_queue(connection));

        match queue.sender.try_send(frame) {
            Ok(()) => {
                Counters::bump(&self.counters.enqueued);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                Counters::bump(&self.counters.dropped);
                warn!(%connection, "Outbound queue full, frame dropped");
                Err(BroadcastError::QueueFull(connection))
            }
            Err(TrySendError::Closed(frame)) => {
                // The send task gave up on a dead connection. Start over once.
                let fresh = self.spawn_queue(connection);
                let result = fresh.sender.try_send(frame);
                queues.insert(connection, fresh);
                match result {
                    Ok(()) => {
                        Counters::bump(&self.counters.enqueued);
                        Ok(())
                    }
                    Err(_) => {
                        Counters::bump(&self.counters.dropped);
                        Err(BroadcastError::Disconnected(connection))
                    }
                }
            }
        }
    }

    fn spawn_queue(&self, connection: ConnectionId) -> OutboundQueue {
        let (sender, receiver) = mpsc::channel(self.config.queue_capacity.max(1));
        let task = self.runtime.spawn(send_loop(
            connection,
            receiver,
            Arc::clone(&self.network),
            Duration::from_millis(self.config.send_timeout_ms),
            Arc::clone(&self.counters),
        ));
        trace!(%connection, "Outbound queue opened");
        OutboundQueue { sender, task }
    }
}

async fn send_loop(
    connection: ConnectionId,
    mut receiver: mpsc::Receiver<Frame>,
    network: Arc<dyn PeerNetwork>,
    send_timeout: Duration,
    counters: Arc<Counters>,
) {
    while let Some(frame) = receiver.recv().await {
        match tokio::time::timeout(send_timeout, network.send(connection, frame)).await {
            Ok(Ok(())) => Counters::bump(&counters.sent),
            Ok(Err(BroadcastError::Disconnected(_))) => {
                Counters::bump(&counters.failed);
                debug!(%connection, "Connection closed, stopping send task");
                break;
            }
            Ok(Err(e)) => {
                Counters::bump(&counters.failed);
                warn!(%connection, error = %e, "Send failed");
            }
            Err(_) => {
                Counters::bump(&counters.failed);
                warn!(%connection, timeout_ms = send_timeout.as_millis() as u64, "Send timed out");
            }
        }
    }
}

impl BroadcastApi for Broadcaster {
    fn broadcast(
        &self,
        message: &StorageMessage,
        origin: Origin,
    ) -> Result<BroadcastOutcome, BroadcastError> {
        let frame = wire::encode(message)?;
        let message_id = MessageId::of_frame(&frame);

        let Some(mut excluded) = self.seen.claim_broadcast(message_id, self.time.now()) else {
            Counters::bump(&self.counters.suppressed);
            debug!(?message_id, kind = message.name(), "Broadcast suppressed");
            return Ok(BroadcastOutcome::Suppressed { message_id });
        };
        if let Some(connection) = origin.connection() {
            excluded.insert(connection);
        }

        let fanout = if origin.is_local() {
            self.config.owner_fanout
        } else {
            self.config.fanout
        };
        let targets = select_targets(&self.network.connected_peers(), &excluded, fanout);

        let queued: Vec<ConnectionId> = targets
            .into_iter()
            .filter(|conn| self.enqueue(*conn, Arc::clone(&frame)).is_ok())
            .collect();

        Counters::bump(&self.counters.broadcasts);
        debug!(
            ?message_id,
            kind = message.name(),
            targets = queued.len(),
            local = origin.is_local(),
            "Broadcast queued"
        );
        Ok(BroadcastOutcome::Sent {
            message_id,
            targets: queued,
        })
    }

    fn note_received(&self, message_id: MessageId, connection: ConnectionId) {
        self.seen.note_received(message_id, connection, self.time.now());
    }

    fn send_direct(
        &self,
        connection: ConnectionId,
        message: &StorageMessage,
    ) -> Result<(), BroadcastError> {
        let frame = wire::encode(message)?;
        self.enqueue(connection, frame)
    }

    fn prune_disconnected(&self) -> usize {
        let connected: HashSet<ConnectionId> = self.network.connected_peers().into_iter().collect();
        let mut queues = self.queues.lock();
        let before = queues.len();
        // Dropping the sender lets the task drain what is queued and exit.
        queues.retain(|conn, _| connected.contains(conn));
        let pruned = before - queues.len();
        if pruned > 0 {
            debug!(pruned, "Outbound queues pruned");
        }
        pruned
    }

    fn stats(&self) -> BroadcastStats {
        self.counters.snapshot()
    }
}
