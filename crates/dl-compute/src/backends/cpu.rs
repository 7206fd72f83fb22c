//! CPU compute backend using Rayon
//!
//! Owns a dedicated Rayon thread pool sized at construction. The global
//! Rayon pool is never used, so the bound holds regardless of what else
//! in the process uses Rayon.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use shared_crypto::Primitive;
use shared_types::Digest;

use crate::{available_parallelism, CancelToken, ComputeEngine, ComputeError, DeviceInfo};

/// CPU-based compute engine using Rayon
pub struct CpuEngine {
    device_info: DeviceInfo,
    pool: ThreadPool,
}

impl CpuEngine {
    /// One worker per available core.
    pub fn new() -> Result<Self, ComputeError> {
        Self::with_workers(available_parallelism())
    }

    /// Exactly `workers` threads.
    pub fn with_workers(workers: usize) -> Result<Self, ComputeError> {
        if workers == 0 {
            return Err(ComputeError::InvalidInput(
                "worker count must be at least 1".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dl-chunk-{}", i))
            .build()
            .map_err(|e| ComputeError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            device_info: DeviceInfo {
                name: format!("CPU ({} workers)", workers),
                workers,
            },
            pool,
        })
    }

    /// Run `f(i)` for every `i` in `0..count` on the pool, returning results
    /// in index order.
    pub fn map_indexed<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        self.pool
            .install(|| (0..count).into_par_iter().map(|i| f(i)).collect())
    }
}

impl ComputeEngine for CpuEngine {
    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn batch_digest(
        &self,
        primitive: &Primitive,
        chunks: &[&[u8]],
        cancel: &CancelToken,
    ) -> Result<Vec<Digest>, ComputeError> {
        if cancel.is_cancelled() {
            return Err(ComputeError::Cancelled);
        }

        let first_failure: OnceLock<ComputeError> = OnceLock::new();

        let results: Vec<Option<Digest>> = self.pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(index, chunk)| {
                    if cancel.is_cancelled() {
                        return None;
                    }

                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| primitive.compute(chunk)));
                    let reason = match outcome {
                        Ok(Ok(digest)) => return Some(digest),
                        Ok(Err(e)) => e.to_string(),
                        Err(payload) => panic_message(payload),
                    };

                    tracing::debug!(index, %reason, "chunk task failed, cancelling batch");
                    let _ = first_failure.set(ComputeError::TaskFailed { index, reason });
                    cancel.cancel();
                    None
                })
                .collect()
        });

        if let Some(err) = first_failure.into_inner() {
            return Err(err);
        }

        // No task failed, so any gap is an external cancellation.
        results
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(ComputeError::Cancelled)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
