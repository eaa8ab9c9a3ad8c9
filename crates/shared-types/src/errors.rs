//! Error types for block-index access.

use crate::entities::Hash;
use thiserror::Error;

/// Errors surfaced by the block index behind [`crate::chain::ActiveChain`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// No index entry for the given hash.
    #[error("block not found: {0:02x?}")]
    NotFound(Hash),

    /// Header references a parent the index has never seen.
    #[error("orphan header {block:02x?}: unknown parent {parent:02x?}")]
    OrphanHeader {
        /// Hash of the rejected header.
        block: Hash,
        /// The missing parent hash.
        parent: Hash,
    },

    /// Header failed a structural or contextual check.
    #[error("invalid header {block:02x?}: {reason}")]
    InvalidHeader {
        /// Hash of the rejected header.
        block: Hash,
        /// Which check failed.
        reason: String,
    },

    /// The entry claims no block data is stored on disk.
    #[error("no block data on disk for {0:02x?}")]
    MissingBlockData(Hash),

    /// Block data exists but could not be read back.
    #[error("corrupt block data for {0:02x?}")]
    CorruptBlockData(Hash),
}
