//! Error types for the `cvmatch-eval` crate.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A human ranking references unknown candidates or has the wrong size.
    #[error("Ranking error: {0}")]
    Ranking(String),

    /// An error propagated from the mining crate (encoding, data, config).
    #[error(transparent)]
    Mine(#[from] cvmatch_mine::MineError),
}

/// A convenience result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
