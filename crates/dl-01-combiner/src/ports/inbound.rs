//! Inbound Ports (Driving Ports)
//!
//! The API other components use to hash payloads.

use shared_types::{Algorithm, CombinedResult, Digest, HashRequest, KeyParams};

use crate::error::CombineError;

/// Primary combiner API (Driving Port).
///
/// Implementations block the calling thread until the combine has joined.
pub trait CombinerApi: Send + Sync {
    /// Instrumented combine: digest plus timing, memory and throughput.
    fn combine(&self, request: &HashRequest) -> Result<CombinedResult, CombineError>;

    /// Digest only, without instrumentation.
    fn digest(
        &self,
        payload: &[u8],
        algorithm: Algorithm,
        params: &KeyParams,
    ) -> Result<Digest, CombineError>;

    /// Digest with an explicit fan-out, for digests recorded under a
    /// different configuration.
    fn digest_with_fan_out(
        &self,
        payload: &[u8],
        algorithm: Algorithm,
        params: &KeyParams,
        fan_out: usize,
    ) -> Result<Digest, CombineError>;

    /// Chunks per payload used by `combine` and `digest`.
    fn fan_out(&self) -> usize;
}
