//! Domain model: per-block finalization state and the checkpoint rules.

pub mod rules;
pub mod state;

pub use rules::CasperRules;
pub use state::{FinalizationState, InitStatus, VoteTally};
