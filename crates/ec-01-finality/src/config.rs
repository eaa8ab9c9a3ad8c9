//! Finalization configuration.
//!
//! Parameter objects are constructed once at node start and passed by
//! reference into [`crate::StateRepository::reset`]; there is no global
//! parameter lookup.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, Height, PublicKey};
use std::collections::BTreeMap;

/// Signatures required to authorize an admin command.
pub const ADMIN_MULTISIG_SIGNATURES: usize = 2;

/// Keys in the admin multisig set.
pub const ADMIN_MULTISIG_KEYS: usize = 3;

/// The admin multisig key set active from some height.
pub type AdminKeySet = [PublicKey; ADMIN_MULTISIG_KEYS];

/// Consensus parameters of the finalization rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationParams {
    /// Blocks per epoch (checkpoint interval).
    pub epoch_length: u64,
}

impl Default for FinalizationParams {
    fn default() -> Self {
        Self { epoch_length: 50 }
    }
}

impl FinalizationParams {
    /// Create a config for testing (short epochs).
    pub fn for_testing() -> Self {
        Self { epoch_length: 5 }
    }
}

/// Permissioning parameters: admin key rotations and validator whitelists,
/// both keyed by the activation height.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminParams {
    /// Admin multisig key sets by activation height.
    pub block_to_admin_keys: BTreeMap<Height, AdminKeySet>,
    /// Validator whitelists by activation height.
    pub block_to_white_list: BTreeMap<Height, Vec<Hash>>,
}

impl AdminParams {
    /// Whether permissioning is configured at all.
    pub fn is_permissioning_active(&self) -> bool {
        !self.block_to_admin_keys.is_empty()
    }
}
