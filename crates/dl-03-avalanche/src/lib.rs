//! # DL-03 Avalanche Analyzer
//!
//! Measures how many output bits change when a single input bit flips.
//!
//! For an input of `n` bytes the analyzer produces `8n` samples. Sample `i`
//! flips bit `7 - i % 8` of byte `i / 8` (bits are numbered most significant
//! first, as when the input is written out as a binary string), digests the
//! modified input under the same key or context, and records the Hamming
//! distance to the original digest as a percentage of the digest's bits.
//!
//! An ideal primitive averages close to 50%.
//!
//! ## Cost
//!
//! One full digest per input bit, plus one for the original. This dominates
//! runtime for anything but small inputs; [`AvalancheAnalyzer::analyze_parallel`]
//! spreads the bits over the worker pool.

pub mod analyzer;
pub mod sample;

pub use analyzer::{AvalancheAnalyzer, AvalancheSamples};
pub use sample::{flip_bit, hamming_distance, AvalancheReport, AvalancheSample};
