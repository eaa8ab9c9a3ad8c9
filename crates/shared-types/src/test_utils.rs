//! Test doubles shared across the workspace.
//!
//! `InMemoryChain` implements the [`ActiveChain`] port with the same
//! acceptance rules a production index applies: parent must be known,
//! heights contiguous, timestamps increasing, and the active chain extends
//! only from its tip.

use crate::chain::{ActiveChain, BlockIndexEntry};
use crate::entities::{compute_merkle_root, Block, BlockHeader, Hash, Height, Transaction};
use crate::errors::ChainError;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct ChainInner {
    entries: HashMap<Hash, BlockIndexEntry>,
    /// Active chain hashes indexed by height.
    active: Vec<Hash>,
    /// Simulated on-disk block bodies.
    bodies: HashMap<Hash, Block>,
}

/// In-memory block index with an active chain and simulated disk storage.
pub struct InMemoryChain {
    inner: RwLock<ChainInner>,
}

impl InMemoryChain {
    /// Create a chain whose active tip is the given genesis block.
    pub fn new(genesis: Block) -> Self {
        let hash = genesis.header.hash();
        let entry = BlockIndexEntry {
            header: genesis.header.clone(),
            hash,
            has_data: true,
        };
        let mut inner = ChainInner::default();
        inner.entries.insert(hash, entry);
        inner.active.push(hash);
        inner.bodies.insert(hash, genesis);
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Create a chain from a fresh test genesis; returns the genesis block
    /// alongside for building descendants.
    pub fn with_test_genesis() -> (Self, Block) {
        let genesis = Block {
            header: BlockHeader::genesis(1_000),
            transactions: Vec::new(),
        };
        (Self::new(genesis.clone()), genesis)
    }

    /// Accept a full block extending the active tip: header acceptance plus
    /// body storage.
    ///
    /// Panics if the header does not extend the chain; test fixtures build
    /// blocks strictly tip-first.
    pub fn commit_block(&self, block: Block) -> BlockIndexEntry {
        let entry = self
            .accept_header(&block.header)
            .expect("test block must extend the chain");
        let mut inner = self.inner.write();
        inner.bodies.insert(entry.hash, block);
        let stored = inner
            .entries
            .get_mut(&entry.hash)
            .expect("entry was just accepted");
        stored.has_data = true;
        stored.clone()
    }

    /// Drop the stored body for a block, simulating local data loss.
    pub fn remove_block_data(&self, hash: &Hash) {
        let mut inner = self.inner.write();
        inner.bodies.remove(hash);
        if let Some(entry) = inner.entries.get_mut(hash) {
            entry.has_data = false;
        }
    }

    /// Height of the active tip.
    pub fn height(&self) -> Height {
        let inner = self.inner.read();
        (inner.active.len() as Height).saturating_sub(1)
    }
}

impl ActiveChain for InMemoryChain {
    fn get(&self, hash: &Hash) -> Option<BlockIndexEntry> {
        self.inner.read().entries.get(hash).cloned()
    }

    fn at_height(&self, height: Height) -> Option<BlockIndexEntry> {
        let inner = self.inner.read();
        let hash = inner.active.get(height as usize)?;
        inner.entries.get(hash).cloned()
    }

    fn tip(&self) -> Option<BlockIndexEntry> {
        let inner = self.inner.read();
        let hash = inner.active.last()?;
        inner.entries.get(hash).cloned()
    }

    fn contains(&self, hash: &Hash) -> bool {
        let inner = self.inner.read();
        match inner.entries.get(hash) {
            Some(entry) => inner.active.get(entry.header.height as usize) == Some(hash),
            None => false,
        }
    }

    fn accept_header(&self, header: &BlockHeader) -> Result<BlockIndexEntry, ChainError> {
        let hash = header.hash();
        let mut inner = self.inner.write();
        if let Some(existing) = inner.entries.get(&hash) {
            return Ok(existing.clone());
        }
        let parent = inner
            .entries
            .get(&header.parent_hash)
            .ok_or(ChainError::OrphanHeader {
                block: hash,
                parent: header.parent_hash,
            })?
            .clone();
        if header.height != parent.header.height + 1 {
            return Err(ChainError::InvalidHeader {
                block: hash,
                reason: format!(
                    "height gap: expected {}, got {}",
                    parent.header.height + 1,
                    header.height
                ),
            });
        }
        if header.timestamp <= parent.header.timestamp {
            return Err(ChainError::InvalidHeader {
                block: hash,
                reason: "timestamp must increase".to_string(),
            });
        }
        let entry = BlockIndexEntry {
            header: header.clone(),
            hash,
            has_data: false,
        };
        inner.entries.insert(hash, entry.clone());
        if inner.active.last() == Some(&header.parent_hash) {
            inner.active.push(hash);
        }
        Ok(entry)
    }

    fn read_block(&self, entry: &BlockIndexEntry) -> Result<Block, ChainError> {
        let inner = self.inner.read();
        let stored = inner.entries.get(&entry.hash).ok_or(ChainError::NotFound(entry.hash))?;
        if !stored.has_data {
            return Err(ChainError::MissingBlockData(entry.hash));
        }
        inner
            .bodies
            .get(&entry.hash)
            .cloned()
            .ok_or(ChainError::CorruptBlockData(entry.hash))
    }
}

/// Build a child block of `parent` carrying the given transactions.
pub fn make_block(parent: &BlockHeader, transactions: Vec<Transaction>) -> Block {
    let header = BlockHeader {
        version: parent.version,
        height: parent.height + 1,
        parent_hash: parent.hash(),
        merkle_root: compute_merkle_root(&transactions),
        timestamp: parent.timestamp + 1,
    };
    Block {
        header,
        transactions,
    }
}
