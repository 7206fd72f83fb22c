//! # DL-04 Second-Preimage Search
//!
//! Brute-force search for an input that is not the target message but has
//! the target message's digest.
//!
//! ## State Machine
//!
//! ```text
//! Searching ──digest matches, bytes differ──▶ Found
//!     │
//!     ├──elapsed >= time budget────────────▶ TimedOut
//!     │
//!     └──attempt cap reached / stream ends─▶ Exhausted
//! ```
//!
//! The candidate stream is infinite, so without an attempt cap `Exhausted`
//! cannot happen and every search against a strong primitive ends in
//! `TimedOut`. `Found` against a strong primitive is a finding, not a bug.
//!
//! ## Candidates
//!
//! Bit length `L` starts at 1. For each `L`, every value `0..2^L` is emitted
//! in ascending order as `ceil(L / 8)` big-endian bytes; then `L` grows by
//! one. See [`CandidateStream`].

pub mod candidates;
pub mod error;
pub mod search;

pub use candidates::{Candidate, CandidateStream};
pub use error::SearchError;
pub use search::{SearchConfig, SearchOutcome, SecondPreimageSearch, DEFAULT_TIME_BUDGET};
