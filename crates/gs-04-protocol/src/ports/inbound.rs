//! Inbound ports: what the transport and the local application call.

use gs_01_data_store::WriteResult;
use shared_types::{ConnectionId, Entry, RefreshEntryMessage, RemoveDataMessage, StorageMessage};

use crate::domain::{HandlerOutcome, ProtocolError};

/// Entry point for frames arriving on peer connections.
pub trait InboundMessageHandler: Send + Sync {
    /// Decode and handle a raw frame.
    fn on_frame(&self, connection: ConnectionId, frame: &[u8])
        -> Result<HandlerOutcome, ProtocolError>;

    /// Handle an already decoded message.
    fn on_message(&self, connection: ConnectionId, message: StorageMessage) -> HandlerOutcome;
}

/// Mutations issued by the owner running this node.
///
/// Results go back to the caller; accepted writes are gossiped.
pub trait LocalStoreApi: Send + Sync {
    fn add_local(&self, entry: Entry) -> WriteResult;

    fn refresh_local(&self, request: RefreshEntryMessage) -> WriteResult;

    fn remove_local(&self, request: RemoveDataMessage) -> WriteResult;
}
