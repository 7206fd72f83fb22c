//! # Shared Types Crate
//!
//! Domain entities shared across the DigestLab workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: algorithm tags persisted next to digests are
//!   defined once, in [`Algorithm`]. Renaming a tag breaks existing records.
//! - **Values, not handles**: every type here is a plain value. Nothing holds
//!   a connection, a pool or a clock.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
