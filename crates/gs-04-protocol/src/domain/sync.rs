//! Initial-sync response assembly.

use shared_types::{Capability, Entry, ItemId};
use std::collections::{BTreeSet, HashSet};

/// Bytes reserved for the response envelope around the entry list.
const RESPONSE_OVERHEAD_BYTES: usize = 64;

/// Choose the entries to send a newly connected peer.
///
/// Skips kinds the peer has not declared support for and ids it already
/// holds, then stops at `max_entries` or when the encoded size would exceed
/// `max_bytes`.
pub fn select_sync_entries(
    entries: Vec<Entry>,
    capabilities: &BTreeSet<Capability>,
    excluded: &[ItemId],
    max_entries: usize,
    max_bytes: usize,
) -> Vec<Entry> {
    let excluded: HashSet<&ItemId> = excluded.iter().collect();
    let mut budget = max_bytes.saturating_sub(RESPONSE_OVERHEAD_BYTES);
    let mut selected = Vec::new();

    for entry in entries {
        if selected.len() >= max_entries {
            break;
        }
        let supported = entry
            .kind()
            .required_capability()
            .map_or(true, |cap| capabilities.contains(&cap));
        if !supported || excluded.contains(&entry.item_id) {
            continue;
        }
        let size = match bincode::serialized_size(&entry) {
            Ok(size) => size as usize,
            Err(_) => continue,
        };
        if size > budget {
            continue;
        }
        budget -= size;
        selected.push(entry);
    }
    selected
}
