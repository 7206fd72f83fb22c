//! Prometheus metrics for DigestLab.
//!
//! All metrics follow the naming convention: `dl_<component>_<metric>_<unit>`
//!
//! The registry is owned by [`LabMetrics`] and injected into each service.
//! Nothing is registered globally, so independent instances (and tests) never
//! share counters.

use std::time::Instant;

use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

/// Metric handles plus the registry they are registered in.
#[derive(Clone)]
pub struct LabMetrics {
    registry: Registry,

    /// Combine operations by algorithm tag
    pub combine_total: IntCounterVec,

    /// Combine wall-clock duration by algorithm tag
    pub combine_duration: HistogramVec,

    /// Combine operations that failed, by error kind
    pub combine_failures: IntCounterVec,

    /// Integrity checks by outcome (match, mismatch, not_found)
    pub integrity_checks: IntCounterVec,

    /// Avalanche samples produced
    pub avalanche_samples: IntCounter,

    /// Candidates digested by the preimage search
    pub preimage_attempts: IntCounter,

    /// Finished searches by outcome (found, timed_out, exhausted)
    pub preimage_outcomes: IntCounterVec,
}

impl LabMetrics {
    /// Create and register every metric in a fresh registry.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let combine_total = IntCounterVec::new(
            Opts::new("dl_combiner_operations_total", "Total chunked combine operations"),
            &["algorithm"],
        )
        .map_err(metrics_err)?;

        let combine_duration = HistogramVec::new(
            HistogramOpts::new(
                "dl_combiner_duration_seconds",
                "Wall-clock time spent in chunked combine",
            )
            .buckets(exponential_buckets(0.0001, 2.0, 18).map_err(metrics_err)?),
            &["algorithm"],
        )
        .map_err(metrics_err)?;

        let combine_failures = IntCounterVec::new(
            Opts::new("dl_combiner_failures_total", "Combine operations that failed"),
            &["kind"],
        )
        .map_err(metrics_err)?;

        let integrity_checks = IntCounterVec::new(
            Opts::new("dl_integrity_checks_total", "Integrity checks by outcome"),
            &["outcome"],
        )
        .map_err(metrics_err)?;

        let avalanche_samples = IntCounter::new(
            "dl_avalanche_samples_total",
            "Single-bit flips digested by the avalanche analyzer",
        )
        .map_err(metrics_err)?;

        let preimage_attempts = IntCounter::new(
            "dl_preimage_attempts_total",
            "Candidates digested by the second-preimage search",
        )
        .map_err(metrics_err)?;

        let preimage_outcomes = IntCounterVec::new(
            Opts::new("dl_preimage_searches_total", "Finished searches by outcome"),
            &["outcome"],
        )
        .map_err(metrics_err)?;

        registry
            .register(Box::new(combine_total.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(combine_duration.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(combine_failures.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(integrity_checks.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(avalanche_samples.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(preimage_attempts.clone()))
            .map_err(metrics_err)?;
        registry
            .register(Box::new(preimage_outcomes.clone()))
            .map_err(metrics_err)?;

        Ok(Self {
            registry,
            combine_total,
            combine_duration,
            combine_failures,
            integrity_checks,
            avalanche_samples,
            preimage_attempts,
            preimage_outcomes,
        })
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_err)?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

impl std::fmt::Debug for LabMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabMetrics").finish_non_exhaustive()
    }
}

fn metrics_err(e: prometheus::Error) -> TelemetryError {
    TelemetryError::MetricsInit(e.to_string())
}

/// Timer that records duration on drop.
pub struct HistogramTimer {
    histogram: Histogram,
    start: Instant,
}

impl HistogramTimer {
    /// Create a new timer for the given histogram.
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
