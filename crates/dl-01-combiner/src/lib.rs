//! # DL-01 Chunked Combiner
//!
//! Hashes a payload by splitting it into contiguous chunks, digesting the
//! chunks in parallel on a bounded worker pool, then folding the chunk
//! digests in chunk order through one fresh instance of the same primitive.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure logic, no threads
//!   - `ChunkPlan`: contiguous byte ranges covering the payload exactly once
//!   - `CombinerConfig`: fan-out (chunks per payload)
//!   - `fold`: ordered recombination of chunk digests
//!
//! - **Ports Layer** (`ports/`): `CombinerApi`, the driving port used by the
//!   integrity service and the runtime
//!
//! - **Service Layer** (`service/`):
//!   - `ChunkedCombiner`: plan, dispatch, join, fold
//!   - `CombinerService`: `ChunkedCombiner` plus instrumentation and metrics
//!
//! ## Invariants
//!
//! - The digest depends on the payload, the algorithm, the key material and
//!   the fan-out. It never depends on how many workers the pool has.
//! - Chunk digests are folded in chunk order. Reordering them changes the
//!   result.
//! - Key and context are validated before any chunk task is dispatched.
//! - A failed chunk aborts the combine. No partial digest is returned.
//!
//! ## Usage Example
//!
//! ```ignore
//! use dl_01_combiner::{ChunkedCombiner, CombinerConfig};
//!
//! let engine = dl_compute::create_engine(None)?;
//! let combiner = ChunkedCombiner::new(engine, CombinerConfig::default())?;
//! let digest = combiner.combine(b"payload", Algorithm::Regular, &KeyParams::none())?;
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{fold, ChunkPlan, CombinerConfig, DEFAULT_FAN_OUT};
pub use error::CombineError;
pub use ports::CombinerApi;
pub use service::{ChunkedCombiner, CombinerService};
