//! Outbound ports consumed by the repository and processor.

use crate::domain::state::FinalizationState;
use shared_types::{Block, Height, Transaction};

/// The finalization rule engine: turns a seeded child state plus commit
/// data into a derived state, and answers checkpoint queries against a
/// derived state.
///
/// Derivations must be deterministic: deriving the same block from its
/// commit transactions and from the full block must agree (up to the
/// derivation level), or the ingestion state machine will flag a conflict.
pub trait FinalityRuleEngine: Send + Sync {
    /// Derive a `FromCommits` state from commit transactions alone.
    fn derive_from_commits(
        &self,
        seed: FinalizationState,
        commits: &[Transaction],
    ) -> FinalizationState;

    /// Derive a `Completed` state from the full block.
    fn derive_from_block(&self, seed: FinalizationState, block: &Block) -> FinalizationState;

    /// Whether `height` is a finalized checkpoint in the view of `state`.
    fn is_finalized_checkpoint(&self, state: &FinalizationState, height: Height) -> bool;
}
