//! # Protocol Handler Service
//!
//! ```text
//! frame → decode → AddData / RefreshEntry / RemoveData → DataStore
//!                                         accepted ──→ Broadcaster (Origin::Peer)
//!                → GetAllDataRequest  → filtered get_all → GetAllDataResponse (same connection)
//!                → GetAllDataResponse → DataStore::add for each entry, no re-broadcast
//! ```

use gs_01_data_store::{DataStoreApi, WriteResult};
use gs_02_broadcast::{BroadcastApi, BroadcastOutcome, MessageId};
use parking_lot::Mutex;
use shared_types::wire;
use shared_types::{
    ConnectionId, Entry, GetAllDataRequest, GetAllDataResponse, ItemId, Origin,
    RefreshEntryMessage, RemoveDataMessage, StorageMessage,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{select_sync_entries, HandlerOutcome, ProtocolConfig, ProtocolError};
use crate::ports::{InboundMessageHandler, LocalStoreApi, PeerCapabilities};

/// Encoded size of one item id in an exclusion list.
const ITEM_ID_WIRE_BYTES: usize = 32;

pub struct ProtocolHandler {
    config: ProtocolConfig,
    store: Arc<dyn DataStoreApi>,
    broadcaster: Arc<dyn BroadcastApi>,
    capabilities: Arc<dyn PeerCapabilities>,
    /// Outstanding initial-sync request nonce per connection.
    pending_syncs: Mutex<HashMap<ConnectionId, u64>>,
}

impl ProtocolHandler {
    pub fn new(
        config: ProtocolConfig,
        store: Arc<dyn DataStoreApi>,
        broadcaster: Arc<dyn BroadcastApi>,
        capabilities: Arc<dyn PeerCapabilities>,
    ) -> Self {
        Self {
            config,
            store,
            broadcaster,
            capabilities,
            pending_syncs: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Ask a newly connected peer for everything it holds that we lack.
    ///
    /// Returns the request nonce; only a response echoing it is applied.
    pub fn request_sync(&self, connection: ConnectionId) -> Result<u64, ProtocolError> {
        let nonce = rand::random::<u64>();
        let max_ids = self.config.max_message_bytes.saturating_sub(64) / ITEM_ID_WIRE_BYTES;
        let mut excluded_item_ids: Vec<ItemId> = self.store.item_ids();
        excluded_item_ids.truncate(max_ids);

        let request = StorageMessage::from(GetAllDataRequest {
            nonce,
            excluded_item_ids,
        });
        self.pending_syncs.lock().insert(connection, nonce);
        if let Err(e) = self.broadcaster.send_direct(connection, &request) {
            self.pending_syncs.lock().remove(&connection);
            return Err(e.into());
        }
        info!(%connection, "Initial sync requested");
        Ok(nonce)
    }

    /// Forget per-connection state.
    pub fn connection_closed(&self, connection: ConnectionId) {
        self.pending_syncs.lock().remove(&connection);
    }

    fn handle(
        &self,
        connection: ConnectionId,
        message: StorageMessage,
        message_id: Option<MessageId>,
    ) -> HandlerOutcome {
        if let Some(id) = message_id {
            self.broadcaster.note_received(id, connection);
        }
        let origin = Origin::Peer(connection);

        let result = match &message {
            StorageMessage::AddData(add) => self.store.add(add.entry.clone(), origin),
            StorageMessage::RefreshEntry(refresh) => self.store.refresh(refresh, origin),
            StorageMessage::RemoveData(remove) => self.store.remove(remove, origin),
            StorageMessage::GetAllDataRequest(request) => {
                return self.serve_sync(connection, request);
            }
            StorageMessage::GetAllDataResponse(response) => {
                return self.apply_sync(connection, response);
            }
        };

        match result {
            WriteResult::Accepted => HandlerOutcome::Applied {
                broadcast: self.gossip(&message, origin),
            },
            WriteResult::Rejected(reason) => {
                debug!(
                    %connection,
                    kind = message.name(),
                    reason = reason.label(),
                    "Peer write rejected"
                );
                HandlerOutcome::Rejected(reason)
            }
        }
    }

    fn serve_sync(&self, connection: ConnectionId, request: &GetAllDataRequest) -> HandlerOutcome {
        let capabilities = self.capabilities.capabilities(connection);
        let entries: Vec<Entry> = select_sync_entries(
            self.store.get_all(),
            &capabilities,
            &request.excluded_item_ids,
            self.config.max_entries_per_response,
            self.config.max_message_bytes,
        );
        let count = entries.len();

        let response = StorageMessage::from(GetAllDataResponse {
            request_nonce: request.nonce,
            entries,
        });
        if let Err(e) = self.broadcaster.send_direct(connection, &response) {
            warn!(%connection, error = %e, "Failed to send sync response");
        }
        debug!(%connection, entries = count, "Sync request served");
        HandlerOutcome::SyncServed { entries: count }
    }

    fn apply_sync(&self, connection: ConnectionId, response: &GetAllDataResponse) -> HandlerOutcome {
        let expected = self.pending_syncs.lock().remove(&connection);
        if expected != Some(response.request_nonce) {
            debug!(%connection, "Unsolicited sync response ignored");
            return HandlerOutcome::Ignored;
        }

        let origin = Origin::Peer(connection);
        let (mut accepted, mut rejected) = (0, 0);
        for entry in &response.entries {
            match self.store.add(entry.clone(), origin) {
                WriteResult::Accepted => accepted += 1,
                WriteResult::Rejected(reason) => {
                    rejected += 1;
                    debug!(item = %entry.item_id.short(), reason = reason.label(), "Sync entry rejected");
                }
            }
        }
        info!(%connection, accepted, rejected, "Initial sync applied");
        HandlerOutcome::SyncApplied { accepted, rejected }
    }

    fn gossip(&self, message: &StorageMessage, origin: Origin) -> Option<BroadcastOutcome> {
        match self.broadcaster.broadcast(message, origin) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(kind = message.name(), error = %e, "Broadcast failed");
                None
            }
        }
    }

    fn local(&self, message: StorageMessage, result: WriteResult) -> WriteResult {
        match &result {
            WriteResult::Accepted => {
                self.gossip(&message, Origin::Local);
            }
            WriteResult::Rejected(reason) => {
                debug!(kind = message.name(), reason = reason.label(), "Local write rejected");
            }
        }
        result
    }
}

impl InboundMessageHandler for ProtocolHandler {
    fn on_frame(
        &self,
        connection: ConnectionId,
        frame: &[u8],
    ) -> Result<HandlerOutcome, ProtocolError> {
        let message = wire::decode(frame, self.config.max_message_bytes).map_err(|e| {
            debug!(%connection, error = %e, "Dropping undecodable frame");
            e
        })?;
        let message_id = message.is_broadcast().then(|| MessageId::of_frame(frame));
        Ok(self.handle(connection, message, message_id))
    }

    fn on_message(&self, connection: ConnectionId, message: StorageMessage) -> HandlerOutcome {
        let message_id = if message.is_broadcast() {
            wire::encode(&message)
                .ok()
                .map(|frame| MessageId::of_frame(&frame))
        } else {
            None
        };
        self.handle(connection, message, message_id)
    }
}

impl LocalStoreApi for ProtocolHandler {
    fn add_local(&self, entry: Entry) -> WriteResult {
        let result = self.store.add(entry.clone(), Origin::Local);
        self.local(StorageMessage::from(shared_types::AddDataMessage { entry }), result)
    }

    fn refresh_local(&self, request: RefreshEntryMessage) -> WriteResult {
        let result = self.store.refresh(&request, Origin::Local);
        self.local(request.into(), result)
    }

    fn remove_local(&self, request: RemoveDataMessage) -> WriteResult {
        let result = self.store.remove(&request, Origin::Local);
        self.local(request.into(), result)
    }
}
