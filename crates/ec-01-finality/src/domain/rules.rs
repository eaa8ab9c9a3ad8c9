//! Checkpoint justification and finalization schedule.

use crate::config::FinalizationParams;
use crate::domain::state::{FinalizationState, InitStatus};
use crate::ports::outbound::FinalityRuleEngine;
use shared_types::{Block, Height, Transaction, TransactionKind};
use tracing::debug;

/// The concrete finalization rule engine.
///
/// Epochs are fixed runs of `epoch_length` heights; the checkpoint of epoch
/// `k` is its last block. Entering epoch `k` justifies checkpoint `k-1`
/// when votes targeting epoch `k-1` reach two thirds of the deposited
/// stake (or unconditionally while no deposits are registered), and
/// finalizes on consecutive justifications. Epoch 0's checkpoint anchors
/// directly on genesis and is finalized at its own justification.
pub struct CasperRules {
    epoch_length: u64,
}

impl CasperRules {
    /// Create an engine bound to the given consensus parameters.
    pub fn new(params: &FinalizationParams) -> Self {
        debug_assert!(params.epoch_length >= 2);
        Self {
            epoch_length: params.epoch_length,
        }
    }

    /// Epoch containing the given height.
    pub fn epoch_of(&self, height: Height) -> u64 {
        height / self.epoch_length
    }

    /// Height of the checkpoint (last block) of the given epoch.
    pub fn checkpoint_height(&self, epoch: u64) -> Height {
        (epoch + 1) * self.epoch_length - 1
    }

    fn advance(
        &self,
        mut state: FinalizationState,
        commits: &[Transaction],
        status: InitStatus,
    ) -> FinalizationState {
        state.epoch = self.epoch_of(state.height);
        if state.height > 0 && state.height % self.epoch_length == 0 {
            self.process_epoch_boundary(&mut state);
        }
        for tx in commits {
            self.apply_commit(&mut state, tx);
        }
        state.init_status = status;
        state
    }

    /// First block of a new epoch: evaluate justification of the previous
    /// epoch's checkpoint and finalization of its predecessor.
    fn process_epoch_boundary(&self, state: &mut FinalizationState) {
        let target_epoch = state.epoch - 1;
        let total = state.tally.total_deposited();
        let voted = state.tally.voted_stake(target_epoch);
        let justified = total == 0 || voted * 3 >= total * 2;
        if !justified {
            debug!(
                epoch = target_epoch,
                voted, total, "checkpoint not justified"
            );
            return;
        }

        let prior_justified = state.justified_checkpoint;
        let checkpoint = self.checkpoint_height(target_epoch);
        state.justified_checkpoint = Some(checkpoint);

        let newly_finalized = if target_epoch == 0 {
            // The first epoch anchors on genesis, which is final by
            // definition; its checkpoint finalizes at justification.
            Some(checkpoint)
        } else if prior_justified == Some(self.checkpoint_height(target_epoch - 1)) {
            prior_justified
        } else {
            None
        };

        if let Some(finalized) = newly_finalized {
            if state.finalized_checkpoint.map_or(true, |cur| finalized > cur) {
                state.finalized_checkpoint = Some(finalized);
                state.dynasty += 1;
                debug!(
                    height = state.height,
                    checkpoint = finalized,
                    dynasty = state.dynasty,
                    "checkpoint finalized"
                );
            }
        }
    }

    fn apply_commit(&self, state: &mut FinalizationState, tx: &Transaction) {
        match tx.kind {
            TransactionKind::Deposit => {
                if let Some(deposit) = tx.decode_deposit() {
                    state.tally.register_deposit(deposit.validator, deposit.amount);
                }
            }
            TransactionKind::Vote => {
                if let Some(vote) = tx.decode_vote() {
                    state.tally.record_vote(vote.target_epoch, vote.validator);
                }
            }
            TransactionKind::Logout | TransactionKind::Withdraw | TransactionKind::Slash => {
                if let Some(exit) = tx.decode_exit() {
                    state.tally.remove_deposit(&exit.validator);
                }
            }
            // Permissioning commands do not move stake.
            TransactionKind::AdminCommand => {}
            TransactionKind::Transfer | TransactionKind::Coinbase => {}
        }
    }
}

impl FinalityRuleEngine for CasperRules {
    fn derive_from_commits(
        &self,
        seed: FinalizationState,
        commits: &[Transaction],
    ) -> FinalizationState {
        self.advance(seed, commits, InitStatus::FromCommits)
    }

    fn derive_from_block(&self, seed: FinalizationState, block: &Block) -> FinalizationState {
        let commits = block.extract_commits();
        self.advance(seed, &commits, InitStatus::Completed)
    }

    fn is_finalized_checkpoint(&self, state: &FinalizationState, height: Height) -> bool {
        if height == 0 {
            return true;
        }
        (height + 1) % self.epoch_length == 0
            && state.finalized_checkpoint().map_or(false, |f| height <= f)
    }
}
