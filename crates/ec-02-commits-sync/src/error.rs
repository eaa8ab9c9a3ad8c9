//! Error types for the commits-sync subsystem.

use crate::domain::messages::CommitsLocator;
use ec_01_finality::FinalityError;
use shared_types::{ChainError, Hash};
use thiserror::Error;

/// Commits-sync errors.
///
/// Peer-attributable failures carry a misbehavior score via
/// [`penalty`](SyncError::penalty) and the first offending block hash via
/// [`failing_block`](SyncError::failing_block). Local failures score zero
/// and must not be charged to the peer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// No usable start point in the locator. Non-fatal: the requester is
    /// expected to retry with a different locator.
    #[error("cannot resolve start point in locator: {locator}")]
    StartNotFound {
        /// The locator that failed to resolve.
        locator: CommitsLocator,
    },

    /// A transaction attached to a header is not a finalization commit.
    /// The whole message is discarded.
    #[error("non-commit transaction attached to block {block:02x?}")]
    InvalidCommitTransaction {
        /// Header the offending transaction was attached to.
        block: Hash,
    },

    /// A header in the batch was rejected by the block index.
    #[error("header {block:02x?} rejected")]
    InvalidHeader {
        /// Hash of the rejected header.
        block: Hash,
        /// The index's rejection reason.
        #[source]
        source: ChainError,
    },

    /// A block on the active chain has no readable data on disk. This is
    /// local corruption, not peer misbehavior; processing must halt.
    #[error("block {block:02x?} is on the active chain but its data is unreadable")]
    StorageInconsistency {
        /// The block whose data is missing or corrupt.
        block: Hash,
    },

    /// The finality subsystem could not serve the request.
    #[error(transparent)]
    Finality(#[from] FinalityError),

    /// A message failed to encode or decode.
    #[error("wire codec failure: {reason}")]
    Codec {
        /// Serialization failure detail.
        reason: String,
    },
}

impl SyncError {
    /// Misbehavior score to charge the sending peer.
    pub fn penalty(&self) -> u32 {
        match self {
            SyncError::InvalidCommitTransaction { .. } | SyncError::InvalidHeader { .. } => 100,
            SyncError::Codec { .. } => 10,
            SyncError::StartNotFound { .. }
            | SyncError::StorageInconsistency { .. }
            | SyncError::Finality(_) => 0,
        }
    }

    /// The first offending block hash, for precise re-requests or bans.
    pub fn failing_block(&self) -> Option<Hash> {
        match self {
            SyncError::InvalidCommitTransaction { block }
            | SyncError::InvalidHeader { block, .. }
            | SyncError::StorageInconsistency { block } => Some(*block),
            _ => None,
        }
    }
}
