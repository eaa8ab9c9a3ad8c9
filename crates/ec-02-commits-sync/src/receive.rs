//! Receiving side of the commits sync protocol.

use crate::domain::cache::CommitsCache;
use crate::domain::messages::{CommitsResponse, ResponseStatus};
use crate::error::SyncError;
use shared_types::ActiveChain;
use tracing::debug;

/// What the sync driver should do after a batch was ingested.
///
/// Reconstructing finalization state and re-evaluating fork choice are
/// layered on top of the ingestion done here, not performed inline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStep {
    /// More batches exist; request the next one from the new frontier.
    RequestNextBatch,
    /// The peer's tip was reached; the reconstructed finalization state
    /// may now prefer the peer's chain.
    EvaluateForkChoice,
    /// The batch was truncated by the entry cap; the remainder of the
    /// stream is still in flight.
    AwaitMore,
}

/// Ingest a COMMITS batch: validate every attached transaction, accept
/// each header into the block index, and attach the commits to the
/// side-table.
///
/// Commit well-formedness is checked across the whole batch before any
/// header is accepted, so one malformed transaction anywhere discards the
/// message atomically. Header acceptance is sequential; on rejection the
/// error names the first offending block and earlier headers remain
/// accepted.
pub fn process_new_commits<C: ActiveChain>(
    chain: &C,
    cache: &mut CommitsCache,
    response: &CommitsResponse,
) -> Result<NextStep, SyncError> {
    for pair in &response.data {
        for tx in &pair.commits {
            if !tx.is_finality_commit() {
                return Err(SyncError::InvalidCommitTransaction {
                    block: pair.header.hash(),
                });
            }
        }
    }

    for pair in &response.data {
        let entry = chain
            .accept_header(&pair.header)
            .map_err(|source| SyncError::InvalidHeader {
                block: pair.header.hash(),
                source,
            })?;
        cache.attach(entry.hash, pair.commits.clone());
    }
    debug!(entries = response.data.len(), status = ?response.status, "ingested commits batch");

    Ok(match response.status {
        ResponseStatus::StopOrFinReached => NextStep::RequestNextBatch,
        ResponseStatus::TipReached => NextStep::EvaluateForkChoice,
        ResponseStatus::LengthExceeded => NextStep::AwaitMore,
    })
}
