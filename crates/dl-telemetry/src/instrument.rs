//! Instrumentation wrapper.
//!
//! [`Instrument::measure`] runs an operation and reports wall-clock time,
//! resident-memory delta and an estimated cycles-per-byte figure alongside
//! its result. It has no error handling of its own: whatever the operation
//! returns is passed through untouched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::SystemTelemetry;

/// Readings taken around one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub elapsed: Duration,
    /// RSS after minus RSS before. Negative when the operation freed memory.
    pub memory_delta_bytes: i64,
    /// See [`cycles_per_byte`].
    pub throughput_cpb: f64,
}

/// Wraps operations with timing and memory readings.
#[derive(Clone)]
pub struct Instrument {
    telemetry: Arc<dyn SystemTelemetry>,
}

impl Instrument {
    pub fn new(telemetry: Arc<dyn SystemTelemetry>) -> Self {
        Self { telemetry }
    }

    pub fn telemetry(&self) -> &Arc<dyn SystemTelemetry> {
        &self.telemetry
    }

    /// Run `op` over a payload of `payload_len` bytes and measure it.
    ///
    /// On error the measurement is discarded and the error returned as is.
    pub fn measure<T, E, F>(&self, payload_len: usize, op: F) -> Result<(T, Measurement), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let memory_before = self.telemetry.current_process_memory_bytes();
        let start = Instant::now();

        let value = op()?;

        let elapsed = start.elapsed();
        let memory_after = self.telemetry.current_process_memory_bytes();

        let measurement = Measurement {
            elapsed,
            memory_delta_bytes: memory_after as i64 - memory_before as i64,
            throughput_cpb: cycles_per_byte(elapsed, self.telemetry.cpu_frequency_mhz(), payload_len),
        };
        Ok((value, measurement))
    }
}

impl std::fmt::Debug for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument")
            .field("cpu_mhz", &self.telemetry.cpu_frequency_mhz())
            .finish()
    }
}

/// Estimated CPU cycles per payload byte: `elapsed * frequency / bytes`.
///
/// This is an approximation, not a cycle-accurate count. It assumes the core
/// ran at the nominal frequency for the whole interval and ignores frequency
/// scaling, other threads and time spent off-CPU. Useful for comparing
/// algorithms on one machine, not across machines. An empty payload yields
/// `0.0`.
pub fn cycles_per_byte(elapsed: Duration, cpu_mhz: f64, payload_len: usize) -> f64 {
    if payload_len == 0 {
        return 0.0;
    }
    elapsed.as_secs_f64() * cpu_mhz * 1_000_000.0 / payload_len as f64
}
