//! # Lab Container
//!
//! Holds every component instance for the lifetime of the process. The
//! worker pool, metrics registry, telemetry source and storage adapters are
//! built once here and injected; no component reaches for a global.

pub mod config;
pub mod lab;

pub use config::{ConfigError, LabConfig};
pub use lab::LabContainer;
