//! Locator construction for GETCOMMITS requests.

use crate::domain::messages::CommitsLocator;
use shared_types::{ActiveChain, Height};

/// Build a locator describing the local chain for a commits request.
///
/// The first entry is the block at `finalized_height`, the requester's
/// most recent finalized checkpoint, which the server requires as the
/// anchor. Later entries rise toward the tip, dense near it and thinning
/// with exponentially growing gaps away from it, so the server can resume
/// from the highest block both sides share.
pub fn build_locator<C: ActiveChain>(chain: &C, finalized_height: Height) -> CommitsLocator {
    let mut start = Vec::new();
    let Some(tip) = chain.tip() else {
        return CommitsLocator { start, stop: None };
    };

    let mut heights = Vec::new();
    let mut height = tip.height();
    let mut step: Height = 1;
    while height > finalized_height {
        heights.push(height);
        if heights.len() >= 10 {
            step *= 2;
        }
        height = height.saturating_sub(step);
    }
    heights.push(finalized_height);
    heights.reverse();

    for h in heights {
        if let Some(entry) = chain.at_height(h) {
            start.push(entry.hash);
        }
    }
    CommitsLocator { start, stop: None }
}
