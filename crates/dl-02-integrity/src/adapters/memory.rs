//! In-memory storage adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Algorithm, Digest, FileRecord};

use crate::error::StoreError;
use crate::ports::{BlobStore, MetadataIndex};

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Overwrite a stored blob in place, bypassing the service.
    pub fn tamper(&self, name: &str, f: impl FnOnce(&mut Vec<u8>)) -> bool {
        match self.blobs.write().get_mut(name) {
            Some(bytes) => {
                f(bytes);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.write().insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

/// In-memory metadata index. Records are kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMetadataIndex {
    records: RwLock<Vec<FileRecord>>,
}

impl InMemoryMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl MetadataIndex for InMemoryMetadataIndex {
    async fn put(&self, record: FileRecord) -> Result<(), StoreError> {
        self.records.write().push(record);
        Ok(())
    }

    async fn find_by_digest_and_tag(
        &self,
        digest: &Digest,
        algorithm: Algorithm,
    ) -> Result<Option<FileRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| &r.digest == digest && r.algorithm == algorithm)
            .cloned())
    }

    async fn find_by_digest(&self, digest: &Digest) -> Result<Option<FileRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| &r.digest == digest)
            .cloned())
    }
}
