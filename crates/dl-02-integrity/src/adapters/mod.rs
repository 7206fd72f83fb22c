//! Adapters layer.

pub mod fs;
pub mod memory;

pub use fs::{FsBlobStore, JsonFileMetadataIndex};
pub use memory::{InMemoryBlobStore, InMemoryMetadataIndex};
