use shared_types::DEFAULT_MAX_FRAME_BYTES;

/// Protocol Handler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Frames above this size are rejected before decoding. Also bounds the
    /// size of initial-sync responses this node builds.
    pub max_message_bytes: usize,
    /// Maximum entries in one initial-sync response.
    pub max_entries_per_response: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_FRAME_BYTES,
            max_entries_per_response: 10_000,
        }
    }
}
