//! Component wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use dl_01_combiner::{ChunkedCombiner, CombinerConfig, CombinerService};
use dl_02_integrity::{
    BlobStore, FsBlobStore, InMemoryBlobStore, InMemoryMetadataIndex, IntegrityService,
    JsonFileMetadataIndex, MetadataIndex,
};
use dl_compute::{ComputeEngine, CpuEngine};
use dl_telemetry::{Instrument, LabMetrics, SystemTelemetry};
use tracing::info;

use super::LabConfig;

/// Every component, built once.
pub struct LabContainer {
    pub config: LabConfig,
    pub metrics: LabMetrics,
    pub telemetry: Arc<dyn SystemTelemetry>,
    pub engine: Arc<CpuEngine>,
    pub combiner: Arc<CombinerService>,
    pub integrity: IntegrityService,
}

impl LabContainer {
    /// Wire components over the filesystem adapters under `config.data_dir`.
    pub async fn new(
        config: LabConfig,
        metrics: LabMetrics,
        telemetry: Arc<dyn SystemTelemetry>,
    ) -> Result<Self> {
        let blobs = FsBlobStore::open(config.blob_dir())
            .await
            .with_context(|| format!("opening blob store in {}", config.blob_dir().display()))?;
        let index = JsonFileMetadataIndex::open(config.index_path())
            .await
            .with_context(|| format!("opening metadata index {}", config.index_path().display()))?;

        Self::with_storage(config, metrics, telemetry, Arc::new(blobs), Arc::new(index))
    }

    /// Wire components over in-memory storage.
    pub fn in_memory(
        config: LabConfig,
        metrics: LabMetrics,
        telemetry: Arc<dyn SystemTelemetry>,
    ) -> Result<Self> {
        Self::with_storage(
            config,
            metrics,
            telemetry,
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryMetadataIndex::new()),
        )
    }

    fn with_storage(
        config: LabConfig,
        metrics: LabMetrics,
        telemetry: Arc<dyn SystemTelemetry>,
        blobs: Arc<dyn BlobStore>,
        index: Arc<dyn MetadataIndex>,
    ) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let engine = dl_compute::create_engine(Some(config.parallelism))
            .context("building worker pool")?;

        let combiner = ChunkedCombiner::new(
            engine.clone(),
            CombinerConfig::with_fan_out(config.fan_out),
        )?;
        let combiner = Arc::new(CombinerService::new(
            combiner,
            Instrument::new(Arc::clone(&telemetry)),
            metrics.clone(),
        ));

        let integrity = IntegrityService::new(combiner.clone(), blobs, index, metrics.clone());

        info!(
            workers = engine.device_info().workers,
            fan_out = config.fan_out,
            data_dir = %config.data_dir.display(),
            "Lab container ready"
        );

        Ok(Self {
            config,
            metrics,
            telemetry,
            engine,
            combiner,
            integrity,
        })
    }
}
