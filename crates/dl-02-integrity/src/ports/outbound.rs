//! Outbound Ports (Driven Ports)
//!
//! Storage the integrity service depends on. Both are external
//! collaborators: the service stores and reads through them and never
//! reaches past them.
//!
//! Production: `FsBlobStore`, `JsonFileMetadataIndex`
//! Testing: `InMemoryBlobStore`, `InMemoryMetadataIndex`

use async_trait::async_trait;
use shared_types::{Algorithm, Digest, FileRecord};

use crate::error::StoreError;

/// Byte storage addressed by name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous blob.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Fetch the blob stored under `name`.
    ///
    /// Returns `StoreError::NotFound` if there is none.
    async fn get(&self, name: &str) -> Result<Vec<u8>, StoreError>;
}

/// Digest-to-name records.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    /// Record that `record.file_name` hashed to `record.digest`.
    async fn put(&self, record: FileRecord) -> Result<(), StoreError>;

    /// Record of a blob with this digest under this algorithm, if any.
    async fn find_by_digest_and_tag(
        &self,
        digest: &Digest,
        algorithm: Algorithm,
    ) -> Result<Option<FileRecord>, StoreError>;

    /// Any record with this digest, regardless of algorithm.
    async fn find_by_digest(&self, digest: &Digest) -> Result<Option<FileRecord>, StoreError>;
}
