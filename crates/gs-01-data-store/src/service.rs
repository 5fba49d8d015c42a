//! # Data Store Service
//!
//! The authoritative in-memory map of live entries and the write pipeline
//! every mutation passes through.
//!
//! ## Locking
//!
//! One `parking_lot::RwLock` guards entries, the kind index and the
//! sequence-number history together. Signature checks never run under the
//! write lock:
//!
//! - `add` verifies before taking the lock.
//! - `refresh`/`remove` copy the stored payload under a read lock, verify
//!   against that copy, then take the write lock and confirm the stored
//!   payload is unchanged before applying.
//!
//! Store events are published after the lock is released.

use parking_lot::RwLock;
use shared_bus::{EventPublisher, StoreEvent};
use shared_types::{
    Entry, EntrySignature, ItemId, Origin, OwnerPublicKey, PayloadKind, RefreshEntryMessage,
    RemoveDataMessage, SignedOperation, StoragePayload, Timestamp,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::invariants::{
    check_capacity, check_item_id, check_owner, check_refresh_expiry, check_sequence,
    check_timing, check_ttl,
};
use crate::domain::{
    RejectReason, RestoreReport, SequenceNumberMap, StoreConfig, StoreSnapshot, StoreState,
    WriteResult,
};
use crate::ports::{DataStoreApi, EntryVerifier, TimeSource};

/// The replicated key/value store of one node.
pub struct DataStore {
    state: RwLock<StoreState>,
    config: StoreConfig,
    verifier: Arc<dyn EntryVerifier>,
    time: Arc<dyn TimeSource>,
    events: Arc<dyn EventPublisher>,
}

/// Copy of the fields of a stored entry that refresh/remove verify against.
struct Target {
    payload: StoragePayload,
    kind: PayloadKind,
}

impl DataStore {
    /// Empty store.
    pub fn new(
        config: StoreConfig,
        verifier: Arc<dyn EntryVerifier>,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
            config,
            verifier,
            time,
            events,
        }
    }

    /// Rebuild a store from a persisted snapshot.
    ///
    /// Every entry is re-verified: a snapshot file is not trusted more than a
    /// peer. Entries that fail verification or have expired meanwhile are
    /// dropped; the sequence history is restored in full.
    pub fn from_snapshot(
        snapshot: StoreSnapshot,
        config: StoreConfig,
        verifier: Arc<dyn EntryVerifier>,
        time: Arc<dyn TimeSource>,
        events: Arc<dyn EventPublisher>,
    ) -> (Self, RestoreReport) {
        let now = time.now();
        let mut report = RestoreReport::default();
        let mut state = StoreState::new();
        state.sequence_numbers = SequenceNumberMap::from_records(snapshot.sequence_numbers);
        report.sequence_records = state.sequence_numbers.len();

        for entry in snapshot.entries {
            let valid = verifier.verify_entry(&entry)
                && verifier.item_id(&entry.payload) == entry.item_id;

            if !valid {
                warn!(item = %entry.item_id.short(), "Dropping invalid entry from snapshot");
                report.dropped_invalid += 1;
                continue;
            }
            if entry.is_expired(now) {
                report.dropped_expired += 1;
                continue;
            }
            if state.len() >= config.max_entries {
                warn!(item = %entry.item_id.short(), "Snapshot exceeds store capacity");
                report.dropped_invalid += 1;
                continue;
            }
            let recorded_at = state
                .sequence_numbers
                .get(&entry.item_id)
                .map_or(now, |r| r.recorded_at);
            state.insert(entry, recorded_at);
            report.restored += 1;
        }
        state.set_epoch(snapshot.epoch);

        info!(
            restored = report.restored,
            dropped_expired = report.dropped_expired,
            dropped_invalid = report.dropped_invalid,
            sequence_records = report.sequence_records,
            "Data store restored from snapshot"
        );

        let store = Self {
            state: RwLock::new(state),
            config,
            verifier,
            time,
            events,
        };
        (store, report)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn finish(
        &self,
        op: &'static str,
        item_id: &ItemId,
        origin: Origin,
        result: Result<(), RejectReason>,
    ) -> WriteResult {
        if let Err(reason) = &result {
            debug!(
                op,
                item = %item_id.short(),
                origin = ?origin,
                reason = reason.label(),
                "Write rejected: {}",
                reason
            );
        }
        result.into()
    }

    fn try_add(&self, entry: Entry, origin: Origin) -> Result<(), RejectReason> {
        let now = self.time.now();

        // 1. Signature, outside the lock.
        if !self.verifier.verify_entry(&entry) {
            return Err(RejectReason::InvalidSignature);
        }
        let derived = self.verifier.item_id(&entry.payload);
        let payload_check = entry.payload.validate();

        let mut state = self.state.write();

        // 2. Sequence number.
        check_sequence(state.high_water(&entry.item_id), entry.sequence_number)?;

        // 3. Semantic checks.
        check_ttl(&self.config, entry.kind(), entry.time_to_live_ms)?;
        check_item_id(&entry.item_id, &derived)?;
        payload_check.map_err(RejectReason::MalformedPayload)?;
        let live = state.get(&entry.item_id);
        check_owner(live, &entry.owner_public_key)?;
        check_timing(&self.config, &entry, now)?;
        check_capacity(&self.config, state.len(), live.is_none())?;

        state.insert(entry.clone(), now);
        drop(state);

        debug!(
            item = %entry.item_id.short(),
            kind = %entry.kind(),
            seq = entry.sequence_number,
            origin = ?origin,
            "Entry added"
        );
        self.events.publish(StoreEvent::Added { entry, origin });
        Ok(())
    }

    /// Read the stored payload and verify the owner's authorization of
    /// `operation` against it.
    fn verify_target(
        &self,
        item_id: &ItemId,
        sequence_number: u64,
        operation: &SignedOperation,
        signature: &EntrySignature,
        key: &OwnerPublicKey,
    ) -> Result<Target, RejectReason> {
        let target = {
            let state = self.state.read();
            let live = state.get(item_id).ok_or(RejectReason::TargetNotFound)?;
            Target {
                payload: live.payload.clone(),
                kind: live.kind(),
            }
        };

        if !self
            .verifier
            .verify(&target.payload, sequence_number, operation, signature, key)
        {
            return Err(RejectReason::InvalidSignature);
        }
        Ok(target)
    }

    fn try_refresh(&self, request: &RefreshEntryMessage, origin: Origin) -> Result<(), RejectReason> {
        let now = self.time.now();
        let operation = SignedOperation::Refresh {
            new_expiry_extension_ms: request.new_expiry_extension_ms,
        };
        let target = self.verify_target(
            &request.item_id,
            request.sequence_number,
            &operation,
            &request.signature,
            &request.owner_public_key,
        )?;

        let mut state = self.state.write();
        let live = state
            .get(&request.item_id)
            .ok_or(RejectReason::TargetNotFound)?;
        // Replaced between verification and apply: the signature covered
        // a payload that is no longer stored.
        if live.payload != target.payload {
            return Err(RejectReason::InvalidSignature);
        }
        check_owner(Some(live), &request.owner_public_key)?;
        check_sequence(state.high_water(&request.item_id), request.sequence_number)?;
        check_ttl(&self.config, target.kind, request.new_expiry_extension_ms)?;
        check_refresh_expiry(now, request.new_expiry_extension_ms)?;

        let refreshed = Entry {
            sequence_number: request.sequence_number,
            signature: request.signature,
            creation_timestamp: now,
            time_to_live_ms: request.new_expiry_extension_ms,
            ..live.clone()
        };
        let expires_at = refreshed.expires_at();
        state.insert(refreshed, now);
        drop(state);

        debug!(
            item = %request.item_id.short(),
            seq = request.sequence_number,
            expires_at,
            origin = ?origin,
            "Entry refreshed"
        );
        self.events.publish(StoreEvent::Refreshed {
            item_id: request.item_id,
            kind: target.kind,
            sequence_number: request.sequence_number,
            expires_at,
            origin,
        });
        Ok(())
    }

    fn try_remove(&self, request: &RemoveDataMessage, origin: Origin) -> Result<(), RejectReason> {
        let now = self.time.now();
        let target = self.verify_target(
            &request.item_id,
            request.sequence_number,
            &SignedOperation::Remove,
            &request.signature,
            &request.owner_public_key,
        )?;

        let mut state = self.state.write();
        let live = state
            .get(&request.item_id)
            .ok_or(RejectReason::TargetNotFound)?;
        if live.payload != target.payload {
            return Err(RejectReason::InvalidSignature);
        }
        check_owner(Some(live), &request.owner_public_key)?;
        check_sequence(state.high_water(&request.item_id), request.sequence_number)?;

        state.remove(&request.item_id);
        state.record_sequence(request.item_id, request.sequence_number, now);
        drop(state);

        debug!(
            item = %request.item_id.short(),
            seq = request.sequence_number,
            origin = ?origin,
            "Entry removed"
        );
        self.events.publish(StoreEvent::Removed {
            item_id: request.item_id,
            kind: target.kind,
            sequence_number: request.sequence_number,
            origin,
        });
        Ok(())
    }
}

impl DataStoreApi for DataStore {
    fn add(&self, entry: Entry, origin: Origin) -> WriteResult {
        let item_id = entry.item_id;
        let result = self.try_add(entry, origin);
        self.finish("add", &item_id, origin, result)
    }

    fn refresh(&self, request: &RefreshEntryMessage, origin: Origin) -> WriteResult {
        let result = self.try_refresh(request, origin);
        self.finish("refresh", &request.item_id, origin, result)
    }

    fn remove(&self, request: &RemoveDataMessage, origin: Origin) -> WriteResult {
        let result = self.try_remove(request, origin);
        self.finish("remove", &request.item_id, origin, result)
    }

    fn expire_stale_entries(&self, now: Timestamp) -> BTreeSet<ItemId> {
        let expired: Vec<Entry> = {
            let mut state = self.state.write();
            state
                .expired_ids(now)
                .into_iter()
                .filter_map(|id| state.remove(&id))
                .collect()
        };

        if !expired.is_empty() {
            debug!(count = expired.len(), "Expired stale entries");
        }
        expired
            .into_iter()
            .map(|entry| {
                self.events.publish(StoreEvent::Expired {
                    item_id: entry.item_id,
                    kind: entry.kind(),
                });
                entry.item_id
            })
            .collect()
    }

    fn prune_sequence_numbers(&self, now: Timestamp) -> usize {
        let pruned = self
            .state
            .write()
            .prune_sequence_numbers(now, self.config.sequence_retention_ms);
        if pruned > 0 {
            debug!(pruned, "Pruned sequence number records");
        }
        pruned
    }

    fn get_all(&self) -> Vec<Entry> {
        self.state.read().entries().cloned().collect()
    }

    fn get(&self, item_id: &ItemId) -> Option<Entry> {
        self.state.read().get(item_id).cloned()
    }

    fn get_by_kind(&self, kind: PayloadKind) -> Vec<Entry> {
        let state = self.state.read();
        state
            .ids_of_kind(kind)
            .filter_map(|id| state.get(id).cloned())
            .collect()
    }

    fn contains(&self, item_id: &ItemId) -> bool {
        self.state.read().contains(item_id)
    }

    fn item_ids(&self) -> Vec<ItemId> {
        self.state.read().entries().map(|e| e.item_id).collect()
    }

    fn sequence_number(&self, item_id: &ItemId) -> Option<u64> {
        self.state.read().high_water(item_id)
    }

    fn len(&self) -> usize {
        self.state.read().len()
    }

    fn epoch(&self) -> u64 {
        self.state.read().epoch()
    }

    fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        StoreSnapshot {
            entries: state.entries().cloned().collect(),
            sequence_numbers: state
                .sequence_numbers
                .iter()
                .map(|(id, record)| (*id, *record))
                .collect(),
            epoch: state.epoch(),
            taken_at: self.time.now(),
        }
    }
}
