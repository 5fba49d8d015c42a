//! # Write Invariants
//!
//! Stateless checks of the validation pipeline. The order in which the
//! service calls them is part of the contract: signature, then sequence
//! number, then the semantic checks below.

use shared_types::{Entry, ItemId, OwnerPublicKey, PayloadKind, Timestamp};

use super::config::StoreConfig;
use super::errors::RejectReason;

/// Sequence numbers must strictly increase; ties are replays.
pub fn check_sequence(stored: Option<u64>, received: u64) -> Result<(), RejectReason> {
    match stored {
        Some(stored) if received <= stored => {
            Err(RejectReason::StaleSequenceNumber { stored, received })
        }
        _ => Ok(()),
    }
}

pub fn check_ttl(config: &StoreConfig, kind: PayloadKind, ttl: u64) -> Result<(), RejectReason> {
    let max = config.max_ttl_ms(kind);
    if ttl > max {
        return Err(RejectReason::TtlExceedsMaximum { ttl, max });
    }
    Ok(())
}

pub fn check_item_id(declared: &ItemId, derived: &ItemId) -> Result<(), RejectReason> {
    if declared != derived {
        return Err(RejectReason::ItemIdMismatch);
    }
    Ok(())
}

/// The first owner of an item keeps it for the item's lifetime.
pub fn check_owner(live: Option<&Entry>, key: &OwnerPublicKey) -> Result<(), RejectReason> {
    match live {
        Some(entry) if entry.owner_public_key != *key => Err(RejectReason::OwnerKeyMismatch),
        _ => Ok(()),
    }
}

/// Creation time may lead local time by at most the configured skew, and the
/// entry must not already be expired.
pub fn check_timing(config: &StoreConfig, entry: &Entry, now: Timestamp) -> Result<(), RejectReason> {
    if entry.creation_timestamp > now.saturating_add(config.max_clock_skew_ms) {
        return Err(RejectReason::CreationTimeInFuture {
            created: entry.creation_timestamp,
            now,
        });
    }
    if entry.is_expired(now) {
        return Err(RejectReason::AlreadyExpired {
            expires_at: entry.expires_at(),
            now,
        });
    }
    Ok(())
}

/// A refresh must leave the entry alive; a zero extension would delete it at
/// the next sweep.
pub fn check_refresh_expiry(now: Timestamp, extension_ms: u64) -> Result<(), RejectReason> {
    let expires_at = now.saturating_add(extension_ms);
    if expires_at <= now {
        return Err(RejectReason::AlreadyExpired { expires_at, now });
    }
    Ok(())
}

/// A full store only accepts updates of items it already holds.
pub fn check_capacity(
    config: &StoreConfig,
    live_count: usize,
    is_new_item: bool,
) -> Result<(), RejectReason> {
    if is_new_item && live_count >= config.max_entries {
        return Err(RejectReason::CapacityExceeded {
            capacity: config.max_entries,
        });
    }
    Ok(())
}
