//! # Shared Crypto - Hash Primitive Adapter
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3, SHA-256, SHA3-256, HMAC, HKDF | One-shot reference functions |
//! | `primitive` | All of the above | Validated adapter, incremental hasher, `Digester` |
//!
//! ## Properties
//!
//! - **Bit-exact**: outputs come straight from `blake3`, `sha2`, `sha3`,
//!   `hmac` and `hkdf`; nothing is reimplemented.
//! - **Stateless**: a [`Primitive`] holds only its key material, so it is
//!   `Send + Sync` and can be shared across worker threads.
//! - **Zeroized keys**: key and salt copies are wiped on drop.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod primitive;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{blake3_hash, sha256, sha3_256, Hash};
pub use primitive::{Digester, FoldStrategy, Primitive, PrimitiveHasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
