//! Per-peer misbehavior accounting.

use crate::error::SyncError;
use shared_types::PeerId;
use std::collections::HashMap;
use tracing::warn;

/// Accumulates misbehavior scores per peer and reports when a peer
/// crosses the ban threshold.
pub struct PeerScoreBook {
    scores: HashMap<PeerId, u32>,
    ban_threshold: u32,
}

impl PeerScoreBook {
    /// Create a score book with the given ban threshold.
    pub fn new(ban_threshold: u32) -> Self {
        Self {
            scores: HashMap::new(),
            ban_threshold,
        }
    }

    /// Charge `penalty` to `peer`; returns the peer's accumulated score.
    pub fn record(&mut self, peer: PeerId, penalty: u32) -> u32 {
        if penalty == 0 {
            return self.score(&peer);
        }
        let score = self.scores.entry(peer).or_insert(0);
        let was_banned = *score >= self.ban_threshold;
        *score = score.saturating_add(penalty);
        if !was_banned && *score >= self.ban_threshold {
            warn!(peer = ?peer, score = *score, "peer crossed ban threshold");
        }
        *score
    }

    /// Charge the penalty carried by a sync error.
    pub fn record_error(&mut self, peer: PeerId, error: &SyncError) -> u32 {
        self.record(peer, error.penalty())
    }

    /// The peer's accumulated score.
    pub fn score(&self, peer: &PeerId) -> u32 {
        self.scores.get(peer).copied().unwrap_or(0)
    }

    /// Whether the peer has crossed the ban threshold.
    pub fn is_banned(&self, peer: &PeerId) -> bool {
        self.score(peer) >= self.ban_threshold
    }
}
