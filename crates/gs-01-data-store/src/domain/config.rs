//! Data store configuration.

use serde::{Deserialize, Serialize};
use shared_types::PayloadKind;
use std::collections::BTreeMap;

const MINUTE_MS: u64 = 60 * 1000;
const DAY_MS: u64 = 24 * 60 * MINUTE_MS;

/// Limits applied by the validation pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of live entries. Writes that would add a new item
    /// beyond this are rejected; updates of existing items are not.
    pub max_entries: usize,

    /// Per-kind overrides of the maximum time-to-live.
    pub max_ttl_overrides: BTreeMap<PayloadKind, u64>,

    /// How far in the future a creation timestamp may lie.
    pub max_clock_skew_ms: u64,

    /// Sequence-number records older than this are pruned.
    pub sequence_retention_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 100_000,
            max_ttl_overrides: BTreeMap::new(),
            max_clock_skew_ms: 2 * MINUTE_MS,
            sequence_retention_ms: 10 * DAY_MS,
        }
    }
}

impl StoreConfig {
    /// Effective TTL ceiling for a kind.
    pub fn max_ttl_ms(&self, kind: PayloadKind) -> u64 {
        self.max_ttl_overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_max_ttl_ms())
    }

    /// Builder-style TTL override.
    pub fn with_max_ttl(mut self, kind: PayloadKind, max_ttl_ms: u64) -> Self {
        self.max_ttl_overrides.insert(kind, max_ttl_ms);
        self
    }
}
