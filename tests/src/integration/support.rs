//! Shared fixtures: a minimal node wiring chain, state machine and
//! commits cache together.

use ec_01_finality::{
    AdminParams, CasperRules, FinalizationParams, StateProcessor, StateRepository,
};
use ec_02_commits_sync::CommitsCache;
use shared_types::test_utils::{make_block, InMemoryChain};
use shared_types::{ActiveChain, Block, BlockHeader, Transaction, VotePayload};
use std::sync::Arc;

/// Install the test log subscriber once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One node: block index, finalization state machine, commits side-table.
pub struct Node {
    pub chain: Arc<InMemoryChain>,
    pub proc: StateProcessor<InMemoryChain, CasperRules>,
    pub cache: CommitsCache,
}

impl Node {
    /// Wire up a node over the given genesis block, with the short test
    /// epoch (5 blocks).
    pub fn new(genesis: Block) -> Self {
        init_tracing();
        let chain = Arc::new(InMemoryChain::new(genesis));
        let params = FinalizationParams::for_testing();
        let mut repo = StateRepository::new(chain.clone());
        repo.reset(params.clone(), AdminParams::default()).unwrap();
        let proc = StateProcessor::new(repo, CasperRules::new(&params));
        Self {
            chain,
            proc,
            cache: CommitsCache::new(),
        }
    }

    /// The shared test genesis.
    pub fn test_genesis() -> Block {
        Block {
            header: BlockHeader::genesis(1_000),
            transactions: Vec::new(),
        }
    }

    /// Produce and fully process `amount` blocks on top of the current
    /// tip, one vote commit per block so commit lists are non-empty.
    pub fn grow(&mut self, amount: u64) {
        for _ in 0..amount {
            let tip = self.chain.tip().expect("chain always has a tip");
            let vote = Transaction::vote(&VotePayload {
                validator: [tip.height() as u8; 32],
                target_epoch: tip.height() / 5,
                target_hash: tip.hash,
                source_epoch: 0,
            });
            let block = make_block(&tip.header, vec![vote]);
            let entry = self.chain.commit_block(block.clone());
            assert!(self.proc.process_new_tip(&entry, &block));
        }
    }

    /// Height of this node's most recent finalized checkpoint (genesis
    /// when none is finalized yet).
    pub fn finalized_height(&self) -> u64 {
        self.proc
            .repository()
            .tip_state()
            .expect("repository is initialized")
            .finalized_checkpoint()
            .unwrap_or(0)
    }
}
