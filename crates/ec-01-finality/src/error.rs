//! Error types for the finality subsystem.

use thiserror::Error;

/// Finality subsystem errors.
///
/// Ordering violations (parent state missing or insufficient) are not
/// errors: the processor entry points report them as `false` returns, and
/// callers recover by re-requesting ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinalityError {
    /// The repository has not been initialized with `reset`.
    #[error("state repository is not initialized - call reset first")]
    NotInitialized,

    /// The block index has no genesis entry to seed the repository from.
    #[error("genesis block is not available from the block index")]
    GenesisUnavailable,
}

/// Result type for finality operations.
pub type FinalityResult<T> = Result<T, FinalityError>;
