//! # DigestLab Runtime
//!
//! Wires the components together and runs the `digestlab` CLI.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and component wiring
//! - `cli` - argument definitions (`clap` derive)
//! - `commands` - one async function per subcommand, each returning JSON
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load configuration from the environment, apply CLI overrides, validate
//! 3. Install logging, create the metrics registry, sample the telemetry source
//! 4. Build the worker pool and storage adapters, wire the services
//! 5. Run the subcommand and print its JSON result

pub mod cli;
pub mod commands;
pub mod container;

pub use container::{ConfigError, LabConfig, LabContainer};
