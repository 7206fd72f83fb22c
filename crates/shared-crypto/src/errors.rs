//! Crypto error types.

use shared_types::Algorithm;
use thiserror::Error;

/// Primitive adapter errors.
///
/// `InvalidKeyLength` and `MissingContext` are input validation failures and
/// are raised before any hashing work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Keyed algorithm without a key, or with a key that is not 32 bytes.
    #[error("Invalid key length for {algorithm}: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Algorithm being constructed
        algorithm: Algorithm,
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes (0 when absent)
        actual: usize,
    },

    /// Derive-keyed algorithm without a context string.
    #[error("Missing context for {0}")]
    MissingContext(Algorithm),

    /// MAC implementation refused the key.
    #[error("Key rejected: {0}")]
    KeyRejected(String),

    /// KDF asked for more output than it can produce.
    #[error("Invalid output length: {0}")]
    OutputLength(String),
}
