//! Error types for integrity checks and storage

use dl_01_combiner::CombineError;
use thiserror::Error;

/// Errors raised by blob stores and metadata indexes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors from the integrity service.
///
/// A digest mismatch is not here: it is reported as
/// [`IntegrityOutcome::Mismatch`](crate::IntegrityOutcome::Mismatch).
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error(transparent)]
    Combine(#[from] CombineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Blocking task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for IntegrityError {
    fn from(err: tokio::task::JoinError) -> Self {
        IntegrityError::TaskJoin(err.to_string())
    }
}
