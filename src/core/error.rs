use thiserror::Error;

use crate::spaces::SpaceKind;

/// Errors that can occur during constraint and traversal operations
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Dimension mismatch
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The space information is not backed by the expected state space
    #[error("incompatible state space: expected {expected:?}, got {got:?}")]
    IncompatibleSpace { expected: SpaceKind, got: SpaceKind },

    /// Computation failed (e.g., factorization did not produce a basis)
    #[error("computation failed: {0}")]
    ComputationFailed(String),

    /// Numerical error from ndarray-linalg
    #[error("linear algebra error: {0}")]
    LinalgError(String),
}

/// Convert ndarray-linalg errors to Error
impl From<ndarray_linalg::error::LinalgError> for Error {
    fn from(err: ndarray_linalg::error::LinalgError) -> Self {
        Error::LinalgError(format!("{:?}", err))
    }
}

/// Result type for constraint and traversal operations
pub type Result<T> = std::result::Result<T, Error>;
