//! # Protocol Messages
//!
//! The storage protocol exchanged between directly connected peers.
//!
//! ## Design Rules
//!
//! - One tagged enum (`StorageMessage`) carries every variant so a single
//!   validation pipeline handles Add, Refresh and Remove.
//! - Refresh and Remove do not resend the payload; their signature is checked
//!   against the payload already stored under `item_id`.

use serde::{Deserialize, Serialize};

use crate::entities::{Entry, EntrySignature, ItemId, OwnerPublicKey, PayloadKind};

/// Publish a new entry or a newer version of an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDataMessage {
    pub entry: Entry,
}

/// Extend the lifetime of a stored entry without resending its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshEntryMessage {
    pub item_id: ItemId,
    pub owner_public_key: OwnerPublicKey,
    pub sequence_number: u64,
    pub signature: EntrySignature,
    /// New time-to-live, counted from the moment the refresh is applied.
    pub new_expiry_extension_ms: u64,
}

/// Delete a stored entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDataMessage {
    pub item_id: ItemId,
    pub owner_public_key: OwnerPublicKey,
    pub sequence_number: u64,
    pub signature: EntrySignature,
}

/// Bulk request sent by a newly connected peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllDataRequest {
    /// Echoed in the response for correlation.
    pub nonce: u64,
    /// Items the requester already holds.
    pub excluded_item_ids: Vec<ItemId>,
}

/// Answer to [`GetAllDataRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAllDataResponse {
    pub request_nonce: u64,
    pub entries: Vec<Entry>,
}

/// Every message of the storage protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMessage {
    AddData(AddDataMessage),
    RefreshEntry(RefreshEntryMessage),
    RemoveData(RemoveDataMessage),
    GetAllDataRequest(GetAllDataRequest),
    GetAllDataResponse(GetAllDataResponse),
}

impl StorageMessage {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            StorageMessage::AddData(_) => "add_data",
            StorageMessage::RefreshEntry(_) => "refresh_entry",
            StorageMessage::RemoveData(_) => "remove_data",
            StorageMessage::GetAllDataRequest(_) => "get_all_data_request",
            StorageMessage::GetAllDataResponse(_) => "get_all_data_response",
        }
    }

    /// True for the mutation variants that are gossiped.
    pub fn is_broadcast(&self) -> bool {
        matches!(
            self,
            StorageMessage::AddData(_)
                | StorageMessage::RefreshEntry(_)
                | StorageMessage::RemoveData(_)
        )
    }

    /// Item targeted by a mutation.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            StorageMessage::AddData(msg) => Some(msg.entry.item_id),
            StorageMessage::RefreshEntry(msg) => Some(msg.item_id),
            StorageMessage::RemoveData(msg) => Some(msg.item_id),
            _ => None,
        }
    }

    /// Payload kind, when the message itself carries the payload.
    pub fn payload_kind(&self) -> Option<PayloadKind> {
        match self {
            StorageMessage::AddData(msg) => Some(msg.entry.kind()),
            _ => None,
        }
    }
}

impl From<AddDataMessage> for StorageMessage {
    fn from(msg: AddDataMessage) -> Self {
        StorageMessage::AddData(msg)
    }
}

impl From<RefreshEntryMessage> for StorageMessage {
    fn from(msg: RefreshEntryMessage) -> Self {
        StorageMessage::RefreshEntry(msg)
    }
}

impl From<RemoveDataMessage> for StorageMessage {
    fn from(msg: RemoveDataMessage) -> Self {
        StorageMessage::RemoveData(msg)
    }
}

impl From<GetAllDataRequest> for StorageMessage {
    fn from(msg: GetAllDataRequest) -> Self {
        StorageMessage::GetAllDataRequest(msg)
    }
}

impl From<GetAllDataResponse> for StorageMessage {
    fn from(msg: GetAllDataResponse) -> Self {
        StorageMessage::GetAllDataResponse(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_variants() {
        let remove = StorageMessage::from(RemoveDataMessage {
            item_id: ItemId([7u8; 32]),
            owner_public_key: OwnerPublicKey([1u8; 32]),
            sequence_number: 3,
            signature: EntrySignature([0u8; 64]),
        });
        assert!(remove.is_broadcast());
        assert_eq!(remove.item_id(), Some(ItemId([7u8; 32])));
        assert_eq!(remove.name(), "remove_data");

        let request = StorageMessage::GetAllDataRequest(GetAllDataRequest::default());
        assert!(!request.is_broadcast());
        assert_eq!(request.item_id(), None);
    }
}
