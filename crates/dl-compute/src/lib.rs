//! # DL-Compute: Bounded Worker Pool
//!
//! A reusable, bounded pool for hashing independent chunks in parallel.
//! The pool is built once per process and shared; requests never pay for
//! thread creation or teardown.
//!
//! ## Semantics
//!
//! - **Join**: [`ComputeEngine::batch_digest`] blocks until every chunk task
//!   has finished or been skipped. Results come back in chunk order.
//! - **Cancel**: the first failing task trips the batch's [`CancelToken`];
//!   tasks that have not started yet are skipped. Callers may trip the token
//!   themselves to abandon a batch.
//! - **First error wins**: a failed batch reports the failure that happened
//!   first, never a digest list with holes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dl_compute::{create_engine, CancelToken, ComputeEngine};
//!
//! let engine = create_engine(Some(4))?;
//! let digests = engine.batch_digest(&primitive, &chunks, &CancelToken::new())?;
//! ```

pub mod backends;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use shared_crypto::Primitive;
use shared_types::Digest;
use thiserror::Error;

pub use backends::cpu::CpuEngine;

/// Compute engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("Backend initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Chunk task {index} failed: {reason}")]
    TaskFailed { index: usize, reason: String },

    #[error("Batch cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Device information
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub workers: usize,
}

/// Shared cancellation flag for one batch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop tasks that have not started yet.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Compute engine trait - implemented by all backends
pub trait ComputeEngine: Send + Sync {
    /// Get device info
    fn device_info(&self) -> &DeviceInfo;

    /// Upper bound on concurrently running tasks.
    fn parallelism(&self) -> usize {
        self.device_info().workers
    }

    /// Digest every chunk with `primitive`, in parallel, and return the
    /// digests in chunk order. Blocks until the batch is joined.
    fn batch_digest(
        &self,
        primitive: &Primitive,
        chunks: &[&[u8]],
        cancel: &CancelToken,
    ) -> Result<Vec<Digest>, ComputeError>;
}

/// Create the CPU engine with `workers` threads, or one per core.
pub fn create_engine(workers: Option<usize>) -> Result<Arc<CpuEngine>, ComputeError> {
    let engine = match workers {
        Some(n) => CpuEngine::with_workers(n)?,
        None => CpuEngine::new()?,
    };
    tracing::info!(
        workers = engine.device_info().workers,
        "Using CPU compute (Rayon)"
    );
    Ok(Arc::new(engine))
}

/// Hardware parallelism available to this process.
pub fn available_parallelism() -> usize {
    num_cpus::get().max(1)
}
