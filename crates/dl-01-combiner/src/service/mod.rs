//! Service layer.

pub mod combiner;
pub mod combiner_service;

pub use combiner::ChunkedCombiner;
pub use combiner_service::CombinerService;
