//! Wire messages of the commits synchronization protocol.

use serde::{Deserialize, Serialize};
use shared_types::{BlockHeader, Hash, Transaction};
use std::fmt;

fn short_hash(hash: &Hash) -> String {
    hash.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Compact description of the requester's chain, used by the server to
/// find the sync point.
///
/// `start` lists known block hashes: the requester's most recent finalized
/// checkpoint first, followed by strictly higher fallback points up to its
/// tip. `stop` optionally bounds the walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitsLocator {
    /// Known block hashes, finalized checkpoint first, heights increasing.
    pub start: Vec<Hash>,
    /// Walk no further than this block; `None` leaves the walk open-ended.
    pub stop: Option<Hash>,
}

impl fmt::Display for CommitsLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start: Vec<String> = self.start.iter().map(short_hash).collect();
        let stop = self
            .stop
            .as_ref()
            .map_or_else(|| "none".to_string(), short_hash);
        write!(f, "Locator(start=[{}], stop={})", start.join(", "), stop)
    }
}

/// One block's header together with its finalization commits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderAndCommits {
    /// The block header.
    pub header: BlockHeader,
    /// Finalization-commit transactions extracted from the block.
    pub commits: Vec<Transaction>,
}

/// Why a response ended where it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The server's active tip was reached; the requester is caught up.
    TipReached,
    /// The stop hash or a finalized checkpoint ended the walk; more data
    /// is available on request.
    StopOrFinReached,
    /// The per-message entry cap truncated the walk.
    LengthExceeded,
}

/// A batch of header+commits pairs in strictly increasing, contiguous
/// height order, starting right after the resolved locator start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitsResponse {
    /// The header+commits pairs.
    pub data: Vec<HeaderAndCommits>,
    /// Why the batch ended.
    pub status: ResponseStatus,
}

/// Top-level peer messages of the commits sync protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// Request commits starting from a locator.
    GetCommits(CommitsLocator),
    /// A batch of headers and commits.
    Commits(CommitsResponse),
}

impl SyncMessage {
    /// The network command tag this message travels under.
    pub fn command(&self) -> &'static str {
        match self {
            SyncMessage::GetCommits(_) => "GETCOMMITS",
            SyncMessage::Commits(_) => "COMMITS",
        }
    }
}
