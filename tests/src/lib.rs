//! # DigestLab Test Suite
//!
//! Unified test crate for flows that cross component boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── combine_benchmarks.rs   # Criterion: algorithm x payload x workers
//! └── src/
//!     └── integration/            # Cross-component flows
//!         └── flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p dl-tests
//!
//! # Integration flows only
//! cargo test -p dl-tests integration::
//!
//! # Benchmarks
//! cargo bench -p dl-tests
//! ```

pub mod integration;
