//! # Lab Configuration
//!
//! Runtime parameters with environment overrides. CLI flags are applied on
//! top by `main`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dl_01_combiner::DEFAULT_FAN_OUT;
use dl_04_preimage::DEFAULT_TIME_BUDGET;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    #[error("fan_out must be at least 1")]
    ZeroFanOut,

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Complete lab configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LabConfig {
    /// Blobs and the metadata index live here.
    pub data_dir: PathBuf,
    /// Worker threads in the chunk pool.
    pub parallelism: usize,
    /// Chunks per payload. Changing it changes every combined digest.
    pub fan_out: usize,
    /// Default second-preimage time budget.
    pub preimage_budget: Duration,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            parallelism: dl_compute::available_parallelism(),
            fan_out: DEFAULT_FAN_OUT,
            preimage_budget: DEFAULT_TIME_BUDGET,
        }
    }
}

impl LabConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DL_DATA_DIR`: Data directory (default: ./data)
    /// - `DL_PARALLELISM`: Worker threads (default: available cores)
    /// - `DL_FAN_OUT`: Chunks per payload (default: 8)
    /// - `DL_PREIMAGE_BUDGET_SECS`: Search budget (default: 1800)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            data_dir: env::var("DL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            parallelism: parse_var("DL_PARALLELISM")?.unwrap_or(defaults.parallelism),
            fan_out: parse_var("DL_FAN_OUT")?.unwrap_or(defaults.fan_out),
            preimage_budget: parse_var("DL_PREIMAGE_BUDGET_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.preimage_budget),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.fan_out == 0 {
            return Err(ConfigError::ZeroFanOut);
        }
        Ok(())
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index.json")
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fan_out, 8);
        assert_eq!(config.preimage_budget, Duration::from_secs(1800));
        assert_eq!(config.index_path(), PathBuf::from("./data/index.json"));
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = LabConfig {
            parallelism: 0,
            ..LabConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroParallelism));

        let config = LabConfig {
            fan_out: 0,
            ..LabConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroFanOut));
    }
}
