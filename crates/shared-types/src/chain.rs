//! # Block Index Port
//!
//! The finalization layer never owns the tree of block headers; it reads
//! ancestry and tip information through this port and accepts new headers
//! into it. Implementations are expected to be internally synchronized;
//! callers hold the node's chain-state lock for the duration of any
//! state-machine call that combines multiple accesses.

use crate::entities::{Block, BlockHeader, Hash, Height};
use crate::errors::ChainError;

/// Immutable value snapshot of one block-index entry.
///
/// Keyed by block hash; holding one across index reorganizations is safe
/// because it never points into the index's own storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockIndexEntry {
    /// The block header this entry was created from.
    pub header: BlockHeader,
    /// Cached header hash (the entry's identity).
    pub hash: Hash,
    /// Whether the full block body is available on disk.
    pub has_data: bool,
}

impl BlockIndexEntry {
    /// Height of the underlying block.
    pub fn height(&self) -> Height {
        self.header.height
    }

    /// Hash of the parent block.
    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }
}

/// Access to the externally-owned block index and active chain.
pub trait ActiveChain: Send + Sync {
    /// Look up an entry by block hash, whether or not it is on the active
    /// chain.
    fn get(&self, hash: &Hash) -> Option<BlockIndexEntry>;

    /// Entry of the active chain at the given height.
    fn at_height(&self, height: Height) -> Option<BlockIndexEntry>;

    /// Tip of the active chain.
    fn tip(&self) -> Option<BlockIndexEntry>;

    /// Whether the block identified by `hash` is part of the active chain.
    fn contains(&self, hash: &Hash) -> bool;

    /// Successor of `entry` on the active chain, or `None` if `entry` is
    /// the tip or not on the active chain at all.
    fn next(&self, entry: &BlockIndexEntry) -> Option<BlockIndexEntry> {
        if self.contains(&entry.hash) {
            self.at_height(entry.height() + 1)
        } else {
            None
        }
    }

    /// Run structural and contextual checks on `header` and insert it into
    /// the index. Accepting an already-known header is a no-op returning
    /// the existing entry.
    fn accept_header(&self, header: &BlockHeader) -> Result<BlockIndexEntry, ChainError>;

    /// Load the full block for `entry` from disk.
    fn read_block(&self, entry: &BlockIndexEntry) -> Result<Block, ChainError>;
}
