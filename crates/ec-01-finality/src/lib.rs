//! # ec-01-finality
//!
//! Finalization state tracking for the proof-of-stake node.
//!
//! ## Overview
//!
//! This subsystem maintains, per block, a derived consensus snapshot
//! (vote/deposit bookkeeping, justified and finalized checkpoints,
//! epoch/dynasty counters) and provides:
//!
//! - **StateRepository**: the block-hash-keyed store of
//!   [`FinalizationState`] entries, seeded from genesis and trimmed as
//!   finalization advances.
//! - **StateProcessor**: the three-entry-point ingestion state machine that
//!   moves a block's state `New → FromCommits → Completed` in strict
//!   parent-before-child order.
//! - **CasperRules**: the checkpoint justification/finalization schedule,
//!   behind the [`FinalityRuleEngine`] port.
//!
//! ## Ordering Model
//!
//! ```text
//! ProcessNewCommits(b)       parent has any stored state   → FromCommits
//! ProcessNewTipCandidate(b)  parent Completed (to allocate) → Completed
//! ProcessNewTip(b)           as above, then finalize + trim
//! ```
//!
//! All operations assume the caller holds the node's chain-state lock;
//! nothing here locks internally.

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod processor;
pub mod repository;

pub use config::{
    AdminKeySet, AdminParams, FinalizationParams, ADMIN_MULTISIG_KEYS, ADMIN_MULTISIG_SIGNATURES,
};
pub use domain::{CasperRules, FinalizationState, InitStatus, VoteTally};
pub use error::{FinalityError, FinalityResult};
pub use ports::outbound::FinalityRuleEngine;
pub use processor::StateProcessor;
pub use repository::StateRepository;
