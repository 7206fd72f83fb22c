//! # Error Types
//!
//! Parse errors for the shared identifiers.

use thiserror::Error;

/// An algorithm tag that does not name a known algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown algorithm tag: {0}")]
pub struct UnknownAlgorithm(pub String);

/// A digest string that is not valid hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    /// Odd length or non-hex character.
    #[error("Invalid hex digest: {0}")]
    InvalidHex(String),

    /// Empty input.
    #[error("Digest is empty")]
    Empty,
}
