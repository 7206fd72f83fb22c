//! # DL-02 Integrity
//!
//! Recomputes a digest from retrieved bytes and compares it byte-for-byte
//! with a stored reference. A mismatch is an outcome, never an error.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `verify`, `IntegrityOutcome`, file name rules
//! - **Ports Layer** (`ports/`): `BlobStore`, `MetadataIndex` (driven ports)
//! - **Adapters Layer** (`adapters/`):
//!   - `InMemoryBlobStore`, `InMemoryMetadataIndex`: tests and one-shot runs
//!   - `FsBlobStore`, `JsonFileMetadataIndex`: a data directory on disk
//! - **Service Layer** (`service/`): `IntegrityService` with upload, check
//!   and download
//!
//! ## Usage Example
//!
//! ```ignore
//! let service = IntegrityService::new(combiner, blobs, index, metrics);
//! let receipt = service.upload("report.pdf", request).await?;
//! let outcome = service.check(&receipt.result.digest, Algorithm::Regular, KeyParams::none()).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{FsBlobStore, InMemoryBlobStore, InMemoryMetadataIndex, JsonFileMetadataIndex};
pub use domain::{sanitize_file_name, verify, CheckOutcome, IntegrityOutcome, UploadReceipt};
pub use error::{IntegrityError, StoreError};
pub use ports::{BlobStore, MetadataIndex};
pub use service::IntegrityService;
