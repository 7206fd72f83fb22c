//! Plan, dispatch, join, fold.

use std::sync::Arc;

use dl_compute::{CancelToken, ComputeEngine};
use shared_crypto::Primitive;
use shared_types::{Algorithm, Digest, KeyParams};
use tracing::{debug, instrument};

use crate::domain::{fold, ChunkPlan, CombinerConfig};
use crate::error::CombineError;

/// Chunked combiner over a shared compute engine.
///
/// The engine is built once per process and shared; a combiner holds no
/// per-request state and can serve concurrent callers.
#[derive(Clone)]
pub struct ChunkedCombiner {
    engine: Arc<dyn ComputeEngine>,
    config: CombinerConfig,
}

impl ChunkedCombiner {
    pub fn new(engine: Arc<dyn ComputeEngine>, config: CombinerConfig) -> Result<Self, CombineError> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn ComputeEngine> {
        &self.engine
    }

    /// Chunk plan this combiner uses for a payload of `payload_len` bytes.
    pub fn plan(&self, payload_len: usize) -> ChunkPlan {
        ChunkPlan::new(payload_len, self.config.fan_out)
    }

    /// Validate the key material, then combine.
    ///
    /// # Errors
    ///
    /// - `Crypto(InvalidKeyLength | MissingContext)` before any chunk task runs.
    /// - `ChunkTaskFailure` carrying the first worker failure.
    pub fn combine(
        &self,
        payload: &[u8],
        algorithm: Algorithm,
        params: &KeyParams,
    ) -> Result<Digest, CombineError> {
        let primitive = Primitive::new(algorithm, params)?;
        self.combine_with(&primitive, payload)
    }

    /// Combine with an already validated primitive.
    pub fn combine_with(&self, primitive: &Primitive, payload: &[u8]) -> Result<Digest, CombineError> {
        self.combine_with_fan_out(primitive, payload, self.config.fan_out)
    }

    /// Combine with an explicit fan-out instead of the configured one.
    ///
    /// Used to recompute digests recorded under another configuration.
    #[instrument(
        name = "combine",
        skip_all,
        fields(algorithm = %primitive.algorithm(), payload_len = payload.len(), fan_out = fan_out)
    )]
    pub fn combine_with_fan_out(
        &self,
        primitive: &Primitive,
        payload: &[u8],
        fan_out: usize,
    ) -> Result<Digest, CombineError> {
        CombinerConfig::with_fan_out(fan_out).validate()?;
        let plan = ChunkPlan::new(payload.len(), fan_out);
        let chunks = plan.slices(payload);

        debug!(
            chunks = plan.len(),
            workers = self.engine.parallelism(),
            "Dispatching chunk tasks"
        );

        // Join point: every chunk digest is available, in chunk order.
        let chunk_digests = self
            .engine
            .batch_digest(primitive, &chunks, &CancelToken::new())?;

        Ok(fold(primitive, &chunk_digests)?)
    }
}

impl std::fmt::Debug for ChunkedCombiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedCombiner")
            .field("engine", &self.engine.device_info())
            .field("config", &self.config)
            .finish()
    }
}
