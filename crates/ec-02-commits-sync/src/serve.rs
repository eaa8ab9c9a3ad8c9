//! Serving side of the commits sync protocol.

use crate::config::SyncConfig;
use crate::domain::cache::CommitsCache;
use crate::domain::messages::{CommitsLocator, CommitsResponse, HeaderAndCommits, ResponseStatus};
use crate::error::SyncError;
use ec_01_finality::{FinalityRuleEngine, FinalizationState, StateRepository};
use shared_types::{ActiveChain, BlockIndexEntry};
use tracing::{debug, error, warn};

/// Answer a GETCOMMITS request.
///
/// Resolves the locator against the local active chain, then walks forward
/// from the resolved start emitting header+commits pairs until the tip,
/// the stop point (or a finalized checkpoint boundary), or the configured
/// entry cap.
///
/// The caller holds read access to the active chain for the duration of
/// the walk; commit lists not present in `cache` are loaded from disk,
/// which is a blocking I/O suspension point.
pub fn process_get_commits<C, E>(
    chain: &C,
    repo: &StateRepository<C>,
    engine: &E,
    cache: &CommitsCache,
    locator: &CommitsLocator,
    config: &SyncConfig,
) -> Result<CommitsResponse, SyncError>
where
    C: ActiveChain,
    E: FinalityRuleEngine,
{
    let tip_state = repo.tip_state()?;
    let start = find_most_recent_start(chain, engine, tip_state, locator)?;
    let stop = find_stop(chain, locator);

    let mut data = Vec::new();
    let mut cursor = start;
    let status = loop {
        let Some(next) = chain.next(&cursor) else {
            break ResponseStatus::TipReached;
        };
        data.push(load_header_and_commits(chain, cache, &next)?);
        let stop_reached = stop.as_ref().map_or(false, |s| s.hash == next.hash);
        if stop_reached || engine.is_finalized_checkpoint(tip_state, next.height()) {
            break ResponseStatus::StopOrFinReached;
        }
        if data.len() >= config.max_response_entries {
            break ResponseStatus::LengthExceeded;
        }
        cursor = next;
    };

    debug!(entries = data.len(), status = ?status, "serving commits batch");
    Ok(CommitsResponse { data, status })
}

/// Resolve the locator's start list to the highest usable block.
///
/// The first resolvable hash must be a finalized checkpoint on the active
/// chain; later entries are taken while they stay on the active chain in
/// strictly increasing height order, and scanning stops at the first
/// violation.
fn find_most_recent_start<C, E>(
    chain: &C,
    engine: &E,
    tip_state: &FinalizationState,
    locator: &CommitsLocator,
) -> Result<BlockIndexEntry, SyncError>
where
    C: ActiveChain,
    E: FinalityRuleEngine,
{
    let mut last: Option<BlockIndexEntry> = None;
    for hash in &locator.start {
        let Some(entry) = chain.get(hash) else {
            debug!(block = ?hash, "locator hash not found");
            break;
        };
        match last {
            None => {
                if !engine.is_finalized_checkpoint(tip_state, entry.height())
                    || !chain.contains(&entry.hash)
                {
                    warn!(
                        block = ?hash,
                        height = entry.height(),
                        "first locator hash must be a finalized checkpoint on the active chain"
                    );
                    return Err(SyncError::StartNotFound {
                        locator: locator.clone(),
                    });
                }
                last = Some(entry);
            }
            Some(ref prev) => {
                if entry.height() > prev.height() && chain.contains(&entry.hash) {
                    last = Some(entry);
                } else {
                    break;
                }
            }
        }
    }
    last.ok_or_else(|| SyncError::StartNotFound {
        locator: locator.clone(),
    })
}

/// Resolve the stop hash; an unknown or absent stop leaves the walk
/// open-ended.
fn find_stop<C: ActiveChain>(chain: &C, locator: &CommitsLocator) -> Option<BlockIndexEntry> {
    let stop_hash = locator.stop?;
    let entry = chain.get(&stop_hash);
    if entry.is_none() {
        debug!(block = ?stop_hash, "stop hash not found, walk is open-ended");
    }
    entry
}

/// Pair a block's header with its commit transactions, from the side-table
/// if attached, otherwise from the block body on disk.
fn load_header_and_commits<C: ActiveChain>(
    chain: &C,
    cache: &CommitsCache,
    entry: &BlockIndexEntry,
) -> Result<HeaderAndCommits, SyncError> {
    if let Some(commits) = cache.get(&entry.hash) {
        return Ok(HeaderAndCommits {
            header: entry.header.clone(),
            commits: commits.to_vec(),
        });
    }
    if !entry.has_data {
        error!(
            block = ?entry.hash,
            height = entry.height(),
            "active-chain block has no data on disk, halting commits serving"
        );
        return Err(SyncError::StorageInconsistency { block: entry.hash });
    }
    let block = chain.read_block(entry).map_err(|err| {
        error!(block = ?entry.hash, %err, "cannot read active-chain block from disk");
        SyncError::StorageInconsistency { block: entry.hash }
    })?;
    Ok(HeaderAndCommits {
        header: entry.header.clone(),
        commits: block.extract_commits(),
    })
}
