//! Error types for the chunked combiner

use dl_compute::ComputeError;
use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur while combining
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    /// Key or context rejected before any work started.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A worker failed. The whole combine is aborted.
    #[error("Chunk task failure: {0}")]
    ChunkTaskFailure(#[source] ComputeError),

    #[error("Invalid combiner configuration: {0}")]
    InvalidConfig(String),
}

impl CombineError {
    /// Whether the caller supplied bad input (as opposed to an internal fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CombineError::Crypto(CryptoError::InvalidKeyLength { .. })
                | CombineError::Crypto(CryptoError::MissingContext(_))
        )
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CombineError::Crypto(CryptoError::InvalidKeyLength { .. }) => "invalid_key_length",
            CombineError::Crypto(CryptoError::MissingContext(_)) => "missing_context",
            CombineError::Crypto(_) => "crypto",
            CombineError::ChunkTaskFailure(_) => "chunk_task_failure",
            CombineError::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<ComputeError> for CombineError {
    fn from(err: ComputeError) -> Self {
        CombineError::ChunkTaskFailure(err)
    }
}
