//! The block-hash-keyed store of finalization states.

use crate::config::{AdminParams, FinalizationParams};
use crate::domain::state::{FinalizationState, InitStatus};
use crate::error::{FinalityError, FinalityResult};
use shared_types::{ActiveChain, BlockIndexEntry, Hash, Height};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the mapping from block hash to [`FinalizationState`] and the
/// configuration installed by [`reset`](StateRepository::reset).
///
/// The repository is the sole owner of state entries: other components
/// obtain seeds via [`new_state`](StateRepository::new_state) and hand the
/// derived result back through [`confirm`](StateRepository::confirm).
/// Callers hold the chain-state lock; nothing here locks internally.
pub struct StateRepository<C: ActiveChain> {
    chain: Arc<C>,
    states: HashMap<Hash, FinalizationState>,
    params: Option<FinalizationParams>,
    admin_params: Option<AdminParams>,
}

impl<C: ActiveChain> StateRepository<C> {
    /// Create an empty, uninitialized repository over the given block
    /// index.
    pub fn new(chain: Arc<C>) -> Self {
        Self {
            chain,
            states: HashMap::new(),
            params: None,
            admin_params: None,
        }
    }

    /// (Re)initialize the repository: discard all stored states, install
    /// the configuration, and seed the genesis state as `Completed`.
    ///
    /// Must be called before any other operation.
    pub fn reset(
        &mut self,
        params: FinalizationParams,
        admin_params: AdminParams,
    ) -> FinalityResult<()> {
        let genesis = self
            .chain
            .at_height(0)
            .ok_or(FinalityError::GenesisUnavailable)?;
        self.states.clear();
        self.states.insert(genesis.hash, FinalizationState::genesis());
        self.params = Some(params);
        self.admin_params = Some(admin_params);
        debug!("state repository reset");
        Ok(())
    }

    /// The stored state for a block, or `None` if it was never processed
    /// or has been trimmed. Absence is an expected outcome.
    pub fn find(&self, hash: &Hash) -> Option<&FinalizationState> {
        self.states.get(hash)
    }

    /// Allocate a fresh state for `entry`, seeded from its parent's
    /// bookkeeping.
    ///
    /// Returns `None` when the parent has no stored state or its status is
    /// below `required_parent_status`. The seed is not stored; it becomes
    /// visible only through [`confirm`](StateRepository::confirm).
    pub fn new_state(
        &self,
        entry: &BlockIndexEntry,
        required_parent_status: InitStatus,
    ) -> Option<FinalizationState> {
        let parent = self.states.get(&entry.parent_hash())?;
        if parent.init_status() < required_parent_status {
            return None;
        }
        Some(FinalizationState::child_of(parent, entry.height()))
    }

    /// Install `state` as the authoritative entry for `block`, overwriting
    /// any previous derivation.
    ///
    /// Returns whether the new state agrees with what was stored before
    /// (vacuously true when nothing was). Disagreement indicates a
    /// non-deterministic derivation and is logged.
    pub fn confirm(&mut self, block: Hash, state: FinalizationState) -> bool {
        let matched = self
            .states
            .get(&block)
            .map_or(true, |prev| prev.agrees_with(&state));
        if !matched {
            warn!(
                block = ?block,
                "conflicting finalization state derivations, replacing stored state"
            );
        }
        self.states.insert(block, state);
        matched
    }

    /// Remove every stored state below `boundary`, keeping genesis.
    ///
    /// `boundary` is the height of the newly finalized checkpoint, so the
    /// checkpoint entry itself always survives. Trimming is pure garbage
    /// collection: the processor only invokes it once no unprocessed
    /// ancestor of the tip can still need the removed entries.
    pub fn trim_until_height(&mut self, boundary: Height) {
        let before = self.states.len();
        self.states
            .retain(|_, state| state.height() >= boundary || state.height() == 0);
        let removed = before - self.states.len();
        if removed > 0 {
            debug!(removed, boundary, "trimmed finalization states");
        }
    }

    /// The finalization state governing the current active tip.
    ///
    /// Walks back from the tip to the nearest processed ancestor, so it
    /// stays answerable while headers beyond the processed frontier are
    /// being accepted.
    pub fn tip_state(&self) -> FinalityResult<&FinalizationState> {
        let mut cursor = self.chain.tip().ok_or(FinalityError::NotInitialized)?;
        loop {
            if let Some(state) = self.states.get(&cursor.hash) {
                return Ok(state);
            }
            cursor = self
                .chain
                .get(&cursor.parent_hash())
                .ok_or(FinalityError::NotInitialized)?;
        }
    }

    /// The consensus parameters installed by `reset`.
    pub fn finalization_params(&self) -> FinalityResult<&FinalizationParams> {
        self.params.as_ref().ok_or(FinalityError::NotInitialized)
    }

    /// The permissioning parameters installed by `reset`.
    pub fn admin_params(&self) -> FinalityResult<&AdminParams> {
        self.admin_params
            .as_ref()
            .ok_or(FinalityError::NotInitialized)
    }

    /// Number of stored states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the repository holds no states at all.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
