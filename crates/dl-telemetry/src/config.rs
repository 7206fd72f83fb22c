//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and telemetry.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive string
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to include span close events with timings
    pub span_timings: bool,

    /// CPU frequency in MHz to assume when `/proc/cpuinfo` has none
    pub fallback_cpu_mhz: f64,

    /// CPU frequency in MHz to use instead of sampling `/proc/cpuinfo`
    pub cpu_mhz_override: Option<f64>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "digestlab".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            span_timings: false,
            fallback_cpu_mhz: 1000.0,
            cpu_mhz_override: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DL_SERVICE_NAME`: Service name (default: digestlab)
    /// - `DL_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `DL_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `DL_SPAN_TIMINGS`: Log span close events (default: false)
    /// - `DL_FALLBACK_CPU_MHZ`: Frequency when none is reported (default: 1000)
    /// - `DL_CPU_MHZ`: Fixed CPU frequency, skips sampling (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service_name: env::var("DL_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("DL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: env::var("DL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            span_timings: env::var("DL_SPAN_TIMINGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.span_timings),

            fallback_cpu_mhz: positive_mhz("DL_FALLBACK_CPU_MHZ").unwrap_or(defaults.fallback_cpu_mhz),

            cpu_mhz_override: positive_mhz("DL_CPU_MHZ"),
        }
    }
}

fn positive_mhz(var: &str) -> Option<f64> {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|mhz: &f64| *mhz > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "digestlab");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        assert_eq!(config.fallback_cpu_mhz, 1000.0);
        assert_eq!(config.cpu_mhz_override, None);
    }
}
