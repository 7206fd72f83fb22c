//! Upload, check and download over injected storage.

use std::sync::Arc;

use dl_01_combiner::{CombineError, CombinerApi};
use dl_telemetry::{metric_inc, LabMetrics};
use shared_crypto::Primitive;
use shared_types::{Algorithm, Digest, FileRecord, HashRequest, KeyParams, KeyingMode};
use tracing::{info, instrument, warn};

use crate::domain::{sanitize_file_name, verify, CheckOutcome, IntegrityOutcome, UploadReceipt};
use crate::error::{IntegrityError, StoreError};
use crate::ports::{BlobStore, MetadataIndex};

/// Integrity service.
///
/// Hashing is CPU-bound and runs on the blocking pool; storage calls are
/// awaited on the async runtime.
#[derive(Clone)]
pub struct IntegrityService {
    combiner: Arc<dyn CombinerApi>,
    blobs: Arc<dyn BlobStore>,
    index: Arc<dyn MetadataIndex>,
    metrics: LabMetrics,
}

impl IntegrityService {
    pub fn new(
        combiner: Arc<dyn CombinerApi>,
        blobs: Arc<dyn BlobStore>,
        index: Arc<dyn MetadataIndex>,
        metrics: LabMetrics,
    ) -> Self {
        Self {
            combiner,
            blobs,
            index,
            metrics,
        }
    }

    /// Hash `request.payload` (instrumented), store it under the sanitized
    /// `name`, and record `(digest, name, tag, fan_out)`.
    ///
    /// Derive-keyed uploads without a context use `"{name} derive"`; the
    /// receipt carries the context either way. Nothing is stored if hashing
    /// fails.
    #[instrument(skip(self, request), fields(algorithm = %request.algorithm, len = request.payload.len()))]
    pub async fn upload(&self, name: &str, mut request: HashRequest) -> Result<UploadReceipt, IntegrityError> {
        let file_name =
            sanitize_file_name(name).ok_or_else(|| StoreError::InvalidName(name.to_string()))?;

        let context = match request.algorithm.mode() {
            KeyingMode::DeriveKeyed => Some(
                request
                    .params
                    .context
                    .get_or_insert_with(|| format!("{file_name} derive"))
                    .clone(),
            ),
            _ => None,
        };

        let fan_out = self.combiner.fan_out();
        let combiner = Arc::clone(&self.combiner);
        let (request, result) = tokio::task::spawn_blocking(move || {
            let result = combiner.combine(&request);
            (request, result)
        })
        .await?;
        let result = result?;

        self.blobs.put(&file_name, &request.payload).await?;
        self.index
            .put(FileRecord {
                file_name: file_name.clone(),
                digest: result.digest.clone(),
                algorithm: result.algorithm,
                fan_out,
            })
            .await?;

        info!(file = %file_name, digest = %result.digest, fan_out, "Stored upload");
        Ok(UploadReceipt {
            file_name,
            context,
            result,
        })
    }

    /// Look up a blob by digest and algorithm, fetch it, and verify it
    /// against `digest` with the fan-out recorded at upload.
    ///
    /// Key material is validated before the index or the blob store is
    /// touched.
    #[instrument(skip_all, fields(digest = %digest, %algorithm))]
    pub async fn check(
        &self,
        digest: &Digest,
        algorithm: Algorithm,
        params: KeyParams,
    ) -> Result<CheckOutcome, IntegrityError> {
        Primitive::new(algorithm, &params).map_err(CombineError::from)?;

        let Some(record) = self.index.find_by_digest_and_tag(digest, algorithm).await? else {
            metric_inc!(self.metrics.integrity_checks, &["not_found"]);
            info!(%algorithm, "No record for digest");
            return Ok(CheckOutcome::NotFound);
        };
        let file_name = record.file_name;

        let bytes = self.blobs.get(&file_name).await?;
        let outcome = self
            .verify_with_fan_out(digest.clone(), bytes, algorithm, params, record.fan_out)
            .await?;

        if let IntegrityOutcome::Mismatch { actual, .. } = &outcome {
            warn!(file = %file_name, %actual, "Integrity mismatch");
        } else {
            info!(file = %file_name, "Integrity verified");
        }
        Ok(CheckOutcome::Verified { file_name, outcome })
    }

    /// Compare `bytes` against `reference` without touching storage, using
    /// the configured fan-out.
    pub async fn verify(
        &self,
        reference: Digest,
        bytes: Vec<u8>,
        algorithm: Algorithm,
        params: KeyParams,
    ) -> Result<IntegrityOutcome, IntegrityError> {
        let fan_out = self.combiner.fan_out();
        self.verify_with_fan_out(reference, bytes, algorithm, params, fan_out)
            .await
    }

    async fn verify_with_fan_out(
        &self,
        reference: Digest,
        bytes: Vec<u8>,
        algorithm: Algorithm,
        params: KeyParams,
        fan_out: usize,
    ) -> Result<IntegrityOutcome, IntegrityError> {
        let combiner = Arc::clone(&self.combiner);
        let outcome = tokio::task::spawn_blocking(move || {
            verify(combiner.as_ref(), &reference, &bytes, algorithm, &params, fan_out)
        })
        .await??;

        metric_inc!(self.metrics.integrity_checks, &[outcome.label()]);
        Ok(outcome)
    }

    /// Fetch a stored blob by digest, under any algorithm.
    pub async fn download(&self, digest: &Digest) -> Result<Option<(String, Vec<u8>)>, IntegrityError> {
        let Some(record) = self.index.find_by_digest(digest).await? else {
            return Ok(None);
        };
        let bytes = self.blobs.get(&record.file_name).await?;
        Ok(Some((record.file_name, bytes)))
    }
}
