//! Error types for the preimage search

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors that stop a search before or while it runs.
///
/// Running out of time is not an error; see `SearchOutcome::TimedOut`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("Target digest is {actual} bytes but the primitive outputs {expected}")]
    TargetLength { expected: usize, actual: usize },
}
