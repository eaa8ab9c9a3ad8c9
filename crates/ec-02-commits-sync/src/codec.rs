//! Wire codec for sync messages.
//!
//! Messages travel inside the node's standard peer framing; this module
//! only handles the payload bytes.

use crate::domain::messages::SyncMessage;
use crate::error::SyncError;

/// Serialize a message for the wire.
pub fn encode(message: &SyncMessage) -> Result<Vec<u8>, SyncError> {
    bincode::serialize(message).map_err(|e| SyncError::Codec {
        reason: e.to_string(),
    })
}

/// Deserialize a message received from a peer.
///
/// Inputs longer than `max_message_bytes` are rejected before any parsing
/// happens.
pub fn decode(bytes: &[u8], max_message_bytes: usize) -> Result<SyncMessage, SyncError> {
    if bytes.len() > max_message_bytes {
        return Err(SyncError::Codec {
            reason: format!(
                "message of {} bytes exceeds cap of {max_message_bytes}",
                bytes.len()
            ),
        });
    }
    bincode::deserialize(bytes).map_err(|e| SyncError::Codec {
        reason: e.to_string(),
    })
}
