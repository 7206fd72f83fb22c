//! # DL-Telemetry
//!
//! Observability for DigestLab.
//!
//! ## Components
//!
//! - **Logging**: `tracing` subscriber, plain or JSON
//! - **Metrics**: Prometheus registry owned by [`LabMetrics`]
//! - **Source**: process memory and CPU frequency ([`SystemTelemetry`])
//! - **Instrument**: timing and memory around an operation ([`Instrument`])
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dl_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let telemetry = init_telemetry(&config)?;
//! let instrument = Instrument::new(telemetry.source.clone());
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DL_SERVICE_NAME` | `digestlab` | Service name in logs |
//! | `DL_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `DL_JSON_LOGS` | `false` | One JSON object per log line |
//! | `DL_SPAN_TIMINGS` | `false` | Log span close events with timings |
//! | `DL_FALLBACK_CPU_MHZ` | `1000` | CPU frequency when `/proc/cpuinfo` has none |
//! | `DL_CPU_MHZ` | unset | Fixed CPU frequency, skips `/proc/cpuinfo` |

mod config;
mod instrument;
mod logging;
mod metrics;
mod source;

use std::sync::Arc;

pub use config::TelemetryConfig;
pub use instrument::{cycles_per_byte, Instrument, Measurement};
pub use logging::init_logging;
pub use metrics::{HistogramTimer, LabMetrics};
pub use source::{
    parse_cpuinfo_mhz, parse_vm_rss_bytes, FixedTelemetry, ProcFsTelemetry, SystemTelemetry,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Process-wide telemetry, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Telemetry {
    pub metrics: LabMetrics,
    pub source: Arc<dyn SystemTelemetry>,
}

/// Install logging, create the metrics registry and sample the telemetry
/// source.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Telemetry, TelemetryError> {
    init_logging(config)?;
    let metrics = LabMetrics::new()?;
    let source: Arc<dyn SystemTelemetry> = Arc::new(match config.cpu_mhz_override {
        Some(mhz) => ProcFsTelemetry::with_frequency(mhz),
        None => ProcFsTelemetry::new(config.fallback_cpu_mhz),
    });

    tracing::info!(
        service = %config.service_name,
        cpu_mhz = source.cpu_frequency_mhz(),
        "Telemetry initialized"
    );
    Ok(Telemetry { metrics, source })
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
