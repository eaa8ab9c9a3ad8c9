//! Side-table of commit transactions keyed by block hash.
//!
//! Commits received over the wire are kept here rather than written into
//! the block index's own entries, so re-processing or a reorganization can
//! never corrupt the canonical tree. The serving path reads it as a cache
//! in front of disk.

use shared_types::{Hash, Transaction};
use std::collections::HashMap;
use tracing::debug;

/// Commit transactions attached to block-index entries.
#[derive(Default)]
pub struct CommitsCache {
    commits: HashMap<Hash, Vec<Transaction>>,
}

impl CommitsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach commits to a block, replacing any previous attachment.
    pub fn attach(&mut self, block: Hash, commits: Vec<Transaction>) {
        if self.commits.insert(block, commits).is_some() {
            debug!(block = ?block, "replacing previously attached commits");
        }
    }

    /// The commits attached to a block, if any.
    pub fn get(&self, block: &Hash) -> Option<&[Transaction]> {
        self.commits.get(block).map(Vec::as_slice)
    }

    /// Whether commits are attached to the given block.
    pub fn contains(&self, block: &Hash) -> bool {
        self.commits.contains_key(block)
    }

    /// Number of blocks with attached commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
