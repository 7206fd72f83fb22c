//! Combiner configuration.

use crate::error::CombineError;

/// Chunks per payload unless configured otherwise.
pub const DEFAULT_FAN_OUT: usize = 8;

/// Combiner configuration.
///
/// `fan_out` is part of the digest definition: two combiners with different
/// fan-outs produce different digests for the same payload. The worker count
/// lives in the compute engine and has no effect on the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinerConfig {
    pub fan_out: usize,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
        }
    }
}

impl CombinerConfig {
    pub fn with_fan_out(fan_out: usize) -> Self {
        Self { fan_out }
    }

    pub fn validate(&self) -> Result<(), CombineError> {
        if self.fan_out == 0 {
            return Err(CombineError::InvalidConfig(
                "fan_out must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fan_out() {
        assert_eq!(CombinerConfig::default().fan_out, 8);
        assert!(CombinerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_fan_out_rejected() {
        assert!(matches!(
            CombinerConfig::with_fan_out(0).validate(),
            Err(CombineError::InvalidConfig(_))
        ));
    }
}
