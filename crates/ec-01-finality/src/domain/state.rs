//! Per-block finalization state.

use serde::{Deserialize, Serialize};
use shared_types::{Height, PublicKey};
use std::collections::{BTreeMap, BTreeSet};

/// How far a block's finalization state has been derived.
///
/// Progression is monotonic: `New → FromCommits → Completed`, never
/// backwards. `New` is the transient just-allocated status; it does not
/// survive a successful processor call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum InitStatus {
    /// Allocated from the parent but not yet derived.
    #[default]
    New,
    /// Derived from commit transactions only (header-first sync).
    FromCommits,
    /// Derived from the full, validated block.
    Completed,
}

/// Vote and deposit bookkeeping carried from block to block.
///
/// Consumed and produced by the finalization rule engine; the rest of the
/// subsystem treats it as opaque.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Registered validator deposits.
    deposits: BTreeMap<PublicKey, u64>,
    /// Validators that voted, per target epoch.
    votes: BTreeMap<u64, BTreeSet<PublicKey>>,
}

impl VoteTally {
    /// Total deposited stake.
    pub fn total_deposited(&self) -> u128 {
        self.deposits.values().map(|amount| u128::from(*amount)).sum()
    }

    /// Stake behind votes targeting the given epoch.
    pub fn voted_stake(&self, epoch: u64) -> u128 {
        let Some(voters) = self.votes.get(&epoch) else {
            return 0;
        };
        voters
            .iter()
            .filter_map(|validator| self.deposits.get(validator))
            .map(|amount| u128::from(*amount))
            .sum()
    }

    /// Number of registered validators.
    pub fn validator_count(&self) -> usize {
        self.deposits.len()
    }

    pub(crate) fn register_deposit(&mut self, validator: PublicKey, amount: u64) {
        let entry = self.deposits.entry(validator).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub(crate) fn remove_deposit(&mut self, validator: &PublicKey) {
        self.deposits.remove(validator);
    }

    /// Record a vote; duplicate votes by the same validator for the same
    /// target epoch are ignored.
    pub(crate) fn record_vote(&mut self, target_epoch: u64, validator: PublicKey) -> bool {
        self.votes.entry(target_epoch).or_default().insert(validator)
    }
}

/// Consensus bookkeeping snapshot for one block.
///
/// A state is a pure function of the block's commit transactions (or full
/// block) and the parent block's state. Once `Completed` it is never
/// mutated; re-derivations must agree with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizationState {
    pub(crate) height: Height,
    pub(crate) init_status: InitStatus,
    pub(crate) epoch: u64,
    pub(crate) dynasty: u64,
    pub(crate) justified_checkpoint: Option<Height>,
    pub(crate) finalized_checkpoint: Option<Height>,
    pub(crate) tally: VoteTally,
}

impl FinalizationState {
    /// The genesis state: height 0, `Completed`, no checkpoints yet.
    pub(crate) fn genesis() -> Self {
        Self {
            height: 0,
            init_status: InitStatus::Completed,
            epoch: 0,
            dynasty: 0,
            justified_checkpoint: None,
            finalized_checkpoint: None,
            tally: VoteTally::default(),
        }
    }

    /// Allocate the state for a child block, seeded from the parent's
    /// bookkeeping. Status starts at `New` until a rule engine derives it.
    pub(crate) fn child_of(parent: &FinalizationState, height: Height) -> Self {
        Self {
            height,
            init_status: InitStatus::New,
            epoch: parent.epoch,
            dynasty: parent.dynasty,
            justified_checkpoint: parent.justified_checkpoint,
            finalized_checkpoint: parent.finalized_checkpoint,
            tally: parent.tally.clone(),
        }
    }

    /// Height of the owning block.
    pub fn height(&self) -> Height {
        self.height
    }

    /// How far this state has been derived.
    pub fn init_status(&self) -> InitStatus {
        self.init_status
    }

    /// Epoch of the owning block.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Dynasty counter, advanced with each finalized checkpoint.
    pub fn dynasty(&self) -> u64 {
        self.dynasty
    }

    /// Height of the most recent justified checkpoint, if any.
    pub fn justified_checkpoint(&self) -> Option<Height> {
        self.justified_checkpoint
    }

    /// Height of the most recent finalized checkpoint, if any.
    pub fn finalized_checkpoint(&self) -> Option<Height> {
        self.finalized_checkpoint
    }

    /// Vote/deposit bookkeeping.
    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    /// Whether two derivations agree on everything but the derivation
    /// level itself.
    pub fn agrees_with(&self, other: &FinalizationState) -> bool {
        self.height == other.height
            && self.epoch == other.epoch
            && self.dynasty == other.dynasty
            && self.justified_checkpoint == other.justified_checkpoint
            && self.finalized_checkpoint == other.finalized_checkpoint
            && self.tally == other.tally
    }
}
