//! Filesystem storage adapters.
//!
//! Blobs are plain files under a data directory. The metadata index is a
//! JSON array of records, rewritten atomically through a temp file on every
//! insert.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared_types::{Algorithm, Digest, FileRecord};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::sanitize_file_name;
use crate::error::StoreError;
use crate::ports::{BlobStore, MetadataIndex};

/// Blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Use `root`, creating it if needed.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "Opened blob store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        match sanitize_file_name(name) {
            Some(clean) if clean == name => Ok(self.root.join(clean)),
            _ => Err(StoreError::InvalidName(name.to_string())),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Metadata index persisted as a JSON file.
///
/// Records are loaded once at open and held in memory; the mutex serializes
/// writers so the file always reflects a prefix of the insert history.
#[derive(Debug)]
pub struct JsonFileMetadataIndex {
    path: PathBuf,
    records: Mutex<Vec<FileRecord>>,
}

impl JsonFileMetadataIndex {
    /// Load `path` if it exists, otherwise start empty.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let records: Vec<FileRecord> = match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "Opened metadata index"
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self, records: &[FileRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &bytes).await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataIndex for JsonFileMetadataIndex {
    async fn put(&self, record: FileRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.push(record);
        if let Err(e) = self.save(&records).await {
            records.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn find_by_digest_and_tag(
        &self,
        digest: &Digest,
        algorithm: Algorithm,
    ) -> Result<Option<FileRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| &r.digest == digest && r.algorithm == algorithm)
            .cloned())
    }

    async fn find_by_digest(&self, digest: &Digest) -> Result<Option<FileRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| &r.digest == digest)
            .cloned())
    }
}
