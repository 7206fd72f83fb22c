//! Integrity verification.

use dl_01_combiner::{CombineError, CombinerApi};
use serde::{Deserialize, Serialize};
use shared_types::{Algorithm, CombinedResult, Digest, KeyParams};

/// Result of comparing a recomputed digest with a stored reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrityOutcome {
    Match,
    Mismatch { expected: Digest, actual: Digest },
}

impl IntegrityOutcome {
    /// Byte-for-byte comparison.
    pub fn compare(expected: &Digest, actual: Digest) -> Self {
        if expected.as_bytes() == actual.as_bytes() {
            IntegrityOutcome::Match
        } else {
            IntegrityOutcome::Mismatch {
                expected: expected.clone(),
                actual,
            }
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, IntegrityOutcome::Match)
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            IntegrityOutcome::Match => "match",
            IntegrityOutcome::Mismatch { .. } => "mismatch",
        }
    }
}

/// Recompute the digest of `bytes` through the combiner, with the fan-out
/// `reference` was computed under, and compare. Never touches storage.
///
/// # Errors
///
/// Only input validation and worker failures. A differing digest is
/// `Ok(IntegrityOutcome::Mismatch)`.
pub fn verify(
    combiner: &dyn CombinerApi,
    reference: &Digest,
    bytes: &[u8],
    algorithm: Algorithm,
    params: &KeyParams,
    fan_out: usize,
) -> Result<IntegrityOutcome, CombineError> {
    let actual = combiner.digest_with_fan_out(bytes, algorithm, params, fan_out)?;
    Ok(IntegrityOutcome::compare(reference, actual))
}

/// What `upload` stored and computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Name the blob was stored under (after sanitizing).
    pub file_name: String,
    /// Derivation context used, when the algorithm takes one. Needed to
    /// check the upload later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub result: CombinedResult,
}

/// Result of an integrity check against the metadata index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// No record with this digest and algorithm tag.
    NotFound,
    Verified {
        file_name: String,
        outcome: IntegrityOutcome,
    },
}
