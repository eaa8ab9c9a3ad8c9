//! The ingestion state machine.
//!
//! Three entry points move a block's finalization state forward:
//!
//! - [`process_new_commits`](StateProcessor::process_new_commits) derives
//!   from commit transactions alone (header-first sync), requiring only
//!   that the parent has *some* stored state.
//! - [`process_new_tip_candidate`](StateProcessor::process_new_tip_candidate)
//!   derives from the full block, requiring a `Completed` parent to
//!   allocate; the block is being validated as a candidate, so no trimming.
//! - [`process_new_tip`](StateProcessor::process_new_tip) additionally
//!   treats the block as part of the active chain and trims the repository
//!   when a new checkpoint was finalized.
//!
//! All entry points are idempotent and must be driven in strict
//! parent-before-child order; the `false` return signals an ordering
//! violation the caller resolves by processing ancestors first.

use crate::domain::state::InitStatus;
use crate::ports::outbound::FinalityRuleEngine;
use crate::repository::StateRepository;
use shared_types::{ActiveChain, Block, BlockIndexEntry, Height, Transaction};
use tracing::{debug, warn};

/// Drives [`StateRepository`] forward as block and commit data arrives.
///
/// Owns the repository; callers needing read access go through
/// [`repository`](StateProcessor::repository). Not internally locked: the
/// caller holds the chain-state lock across every call.
pub struct StateProcessor<C: ActiveChain, E: FinalityRuleEngine> {
    repo: StateRepository<C>,
    engine: E,
}

impl<C: ActiveChain, E: FinalityRuleEngine> StateProcessor<C, E> {
    /// Create a processor over an initialized repository.
    pub fn new(repo: StateRepository<C>, engine: E) -> Self {
        Self { repo, engine }
    }

    /// Read access to the owned repository.
    pub fn repository(&self) -> &StateRepository<C> {
        &self.repo
    }

    /// Mutable access to the owned repository (reset, explicit trimming).
    pub fn repository_mut(&mut self) -> &mut StateRepository<C> {
        &mut self.repo
    }

    /// The injected rule engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Derive the state for `entry` from commit transactions alone and
    /// store it as `FromCommits`.
    ///
    /// Returns `false` when the parent has no stored state at all; `true`
    /// (without changes) when the block is already at `FromCommits` or
    /// beyond.
    pub fn process_new_commits(&mut self, entry: &BlockIndexEntry, commits: &[Transaction]) -> bool {
        if let Some(state) = self.repo.find(&entry.hash) {
            if state.init_status() >= InitStatus::FromCommits {
                return true;
            }
        }
        let Some(seed) = self.repo.new_state(entry, InitStatus::FromCommits) else {
            debug!(
                block = ?entry.hash,
                height = entry.height(),
                "cannot process commits: parent state missing"
            );
            return false;
        };
        let derived = self.engine.derive_from_commits(seed, commits);
        self.repo.confirm(entry.hash, derived);
        true
    }

    /// Derive the state for `entry` from the full block and store it as
    /// `Completed`, without touching the active-chain view or trimming.
    pub fn process_new_tip_candidate(&mut self, entry: &BlockIndexEntry, block: &Block) -> bool {
        self.process_tip_worker(entry, block)
    }

    /// Same as [`process_new_tip_candidate`](Self::process_new_tip_candidate),
    /// additionally treating `entry` as the new active tip: if its state
    /// finalizes a new checkpoint, the repository is trimmed to the
    /// checkpoint's height.
    pub fn process_new_tip(&mut self, entry: &BlockIndexEntry, block: &Block) -> bool {
        if !self.process_tip_worker(entry, block) {
            return false;
        }
        // Re-running on an already-finalized boundary re-computes the same
        // trim, which removes nothing.
        if let Some(boundary) = self.finalization_happened(entry) {
            debug!(
                block = ?entry.hash,
                height = entry.height(),
                boundary,
                "finalization advanced, trimming repository"
            );
            self.repo.trim_until_height(boundary);
        }
        true
    }

    fn process_tip_worker(&mut self, entry: &BlockIndexEntry, block: &Block) -> bool {
        match self.repo.find(&entry.hash).map(|state| state.init_status()) {
            Some(InitStatus::Completed) => true,
            Some(InitStatus::FromCommits) => {
                // The state was reconstructed from commits during
                // header-first sync; the full block confirms it. The
                // parent may still be FromCommits on this path, since the
                // derivation it seeded from is already fixed.
                let Some(seed) = self.repo.new_state(entry, InitStatus::FromCommits) else {
                    debug!(
                        block = ?entry.hash,
                        "cannot confirm state: parent state missing"
                    );
                    return false;
                };
                let derived = self.engine.derive_from_block(seed, block);
                if !self.repo.confirm(entry.hash, derived) {
                    warn!(
                        block = ?entry.hash,
                        height = entry.height(),
                        "full-block derivation disagrees with commits derivation"
                    );
                }
                true
            }
            Some(InitStatus::New) | None => {
                let Some(seed) = self.repo.new_state(entry, InitStatus::Completed) else {
                    debug!(
                        block = ?entry.hash,
                        height = entry.height(),
                        "cannot process tip: parent state missing or not completed"
                    );
                    return false;
                };
                let derived = self.engine.derive_from_block(seed, block);
                self.repo.confirm(entry.hash, derived);
                true
            }
        }
    }

    /// Whether processing `entry` advanced the finalized checkpoint, and
    /// to which height.
    fn finalization_happened(&self, entry: &BlockIndexEntry) -> Option<Height> {
        let new_finalized = self.repo.find(&entry.hash)?.finalized_checkpoint()?;
        let parent_finalized = self
            .repo
            .find(&entry.parent_hash())
            .and_then(|state| state.finalized_checkpoint());
        if parent_finalized.map_or(true, |parent| new_finalized > parent) {
            Some(new_finalized)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminParams, FinalizationParams};
    use crate::domain::rules::CasperRules;
    use crate::domain::state::FinalizationState;
    use shared_types::test_utils::{make_block, InMemoryChain};
    use shared_types::BlockHeader;
    use std::sync::Arc;

    /// Mirrors the repository/processor pair a node wires up, with a
    /// 5-block epoch for quick finalization.
    struct Fixture {
        chain: Arc<InMemoryChain>,
        proc: StateProcessor<InMemoryChain, CasperRules>,
        last_header: BlockHeader,
    }

    impl Fixture {
        const EPOCH_LENGTH: u64 = 5;

        fn new() -> Self {
            let (chain, genesis) = InMemoryChain::with_test_genesis();
            let chain = Arc::new(chain);
            let params = FinalizationParams::for_testing();
            assert_eq!(params.epoch_length, Self::EPOCH_LENGTH);
            let mut repo = StateRepository::new(chain.clone());
            repo.reset(params.clone(), AdminParams::default()).unwrap();
            let proc = StateProcessor::new(repo, CasperRules::new(&params));
            Self {
                chain,
                proc,
                last_header: genesis.header,
            }
        }

        /// Extend the chain by one block without processing it.
        fn create_block(&mut self) -> (shared_types::BlockIndexEntry, Block) {
            let block = make_block(&self.last_header, vec![]);
            self.last_header = block.header.clone();
            let entry = self.chain.commit_block(block.clone());
            (entry, block)
        }

        fn add_block(&mut self) {
            let (entry, block) = self.create_block();
            assert!(self.proc.process_new_tip(&entry, &block));
        }

        fn add_blocks(&mut self, amount: usize) {
            for _ in 0..amount {
                self.add_block();
            }
        }

        fn state_at(&self, height: u64) -> Option<FinalizationState> {
            let entry = self.chain.at_height(height)?;
            self.proc.repository().find(&entry.hash).cloned()
        }
    }

    #[test]
    fn test_trimming() {
        let mut fixture = Fixture::new();

        // Complete the first epoch (heights 0..=4).
        fixture.add_blocks(4);
        for height in 0..=4 {
            assert!(fixture.state_at(height).is_some(), "height {height}");
        }

        // One more block finalizes checkpoint 4 and trims below it.
        fixture.add_blocks(1);
        assert!(fixture.state_at(0).is_some(), "genesis is kept");
        assert!(fixture.state_at(1).is_none());
        assert!(fixture.state_at(2).is_none());
        assert!(fixture.state_at(3).is_none());
        assert!(fixture.state_at(4).is_some(), "finalized checkpoint is kept");
        assert!(fixture.state_at(5).is_some());

        // Complete the second epoch: no further finalization yet.
        fixture.add_blocks(4);
        assert!(fixture.state_at(4).is_some());
        assert!(fixture.state_at(5).is_some());
        assert!(fixture.state_at(9).is_some());

        // A whole further epoch still finalizes nothing new.
        fixture.add_blocks(5);
        assert!(fixture.state_at(4).is_some());
        assert!(fixture.state_at(5).is_some());
        assert!(fixture.state_at(9).is_some());

        // The next boundary finalizes checkpoint 9.
        fixture.add_blocks(1);
        assert!(fixture.state_at(4).is_none());
        assert!(fixture.state_at(8).is_none());
        assert!(fixture.state_at(9).is_some());
        assert!(fixture.state_at(10).is_some());
    }

    #[test]
    fn test_states_workflow() {
        let mut fixture = Fixture::new();

        // Complete the first epoch (heights 0..=4).
        fixture.add_blocks(4);

        let (entry, block) = fixture.create_block(); // height 5

        // From commits only: state exists but nothing is finalized or
        // trimmed yet.
        assert!(fixture.proc.process_new_commits(&entry, &[]));
        assert_eq!(
            fixture.state_at(5).unwrap().init_status(),
            InitStatus::FromCommits
        );
        assert!(fixture.state_at(1).is_some());

        // Confirmed from the full block as a candidate: completed, still
        // no trimming.
        assert!(fixture.proc.process_new_tip_candidate(&entry, &block));
        assert_eq!(
            fixture.state_at(5).unwrap().init_status(),
            InitStatus::Completed
        );
        assert!(fixture.state_at(1).is_some());

        // As part of the active chain: finalization happens and the
        // repository is trimmed.
        assert!(fixture.proc.process_new_tip(&entry, &block));
        assert_eq!(
            fixture.state_at(5).unwrap().init_status(),
            InitStatus::Completed
        );
        assert!(fixture.state_at(1).is_none());

        // Two more blocks, unprocessed.
        let (b1_entry, _b1_block) = fixture.create_block(); // height 6
        let (b2_entry, b2_block) = fixture.create_block(); // height 7

        // b2 cannot be processed before b1 at any level.
        assert!(!fixture.proc.process_new_commits(&b2_entry, &[]));
        assert!(!fixture.proc.process_new_tip_candidate(&b2_entry, &b2_block));
        assert!(!fixture.proc.process_new_tip(&b2_entry, &b2_block));

        // With b1 only at FromCommits, a fresh completed state for b2
        // cannot be allocated.
        assert!(fixture.proc.process_new_commits(&b1_entry, &[]));
        assert!(!fixture.proc.process_new_tip_candidate(&b2_entry, &b2_block));
        assert!(!fixture.proc.process_new_tip(&b2_entry, &b2_block));

        // Snapshot sync: b2 first from commits, then confirmed by the
        // full block even though b1 is still FromCommits.
        assert!(fixture.proc.process_new_commits(&b2_entry, &[]));
        assert!(fixture.proc.process_new_tip(&b2_entry, &b2_block));
        assert_eq!(
            fixture.state_at(7).unwrap().init_status(),
            InitStatus::Completed
        );

        // Processing continues as usual afterwards.
        fixture.add_blocks(1);
    }

    #[test]
    fn test_process_new_tip_is_idempotent() {
        let mut fixture = Fixture::new();
        fixture.add_blocks(4);
        let (entry, block) = fixture.create_block(); // height 5, finalizes cp 4

        assert!(fixture.proc.process_new_tip(&entry, &block));
        let first = fixture.state_at(5).unwrap();
        let stored_after_first = fixture.proc.repository().len();

        assert!(fixture.proc.process_new_tip(&entry, &block));
        let second = fixture.state_at(5).unwrap();
        assert_eq!(first, second);
        assert_eq!(fixture.proc.repository().len(), stored_after_first);
    }

    #[test]
    fn test_status_never_regresses() {
        let mut fixture = Fixture::new();
        let (entry, block) = fixture.create_block(); // height 1

        assert!(fixture.proc.process_new_tip(&entry, &block));
        assert_eq!(
            fixture.state_at(1).unwrap().init_status(),
            InitStatus::Completed
        );

        // Feeding commits for an already-completed block changes nothing.
        assert!(fixture.proc.process_new_commits(&entry, &[]));
        assert_eq!(
            fixture.state_at(1).unwrap().init_status(),
            InitStatus::Completed
        );
    }

    #[test]
    fn test_genesis_is_always_processed() {
        let mut fixture = Fixture::new();
        let genesis_entry = fixture.chain.at_height(0).unwrap();
        let genesis_block = fixture.chain.read_block(&genesis_entry).unwrap();

        assert!(fixture.proc.process_new_commits(&genesis_entry, &[]));
        assert!(fixture
            .proc
            .process_new_tip(&genesis_entry, &genesis_block));
        assert_eq!(
            fixture.state_at(0).unwrap().init_status(),
            InitStatus::Completed
        );
    }
}
