//! Domain layer: chunk planning and ordered folding.

pub mod config;
pub mod fold;
pub mod plan;

pub use config::{CombinerConfig, DEFAULT_FAN_OUT};
pub use fold::fold;
pub use plan::ChunkPlan;
