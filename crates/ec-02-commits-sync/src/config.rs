//! Commits-sync configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the commits synchronization protocol.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum header+commits pairs in one response.
    pub max_response_entries: usize,

    /// Maximum serialized message size accepted from a peer.
    pub max_message_bytes: usize,

    /// Misbehavior score at which a peer is banned.
    pub ban_threshold: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_response_entries: 500,
            max_message_bytes: 4 * 1024 * 1024,
            ban_threshold: 100,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (small batches).
    pub fn for_testing() -> Self {
        Self {
            max_response_entries: 4,
            max_message_bytes: 64 * 1024,
            ban_threshold: 100,
        }
    }
}
