//! Process telemetry source.
//!
//! Memory and CPU frequency readings consumed by the instrumentation wrapper.
//! The source is constructed once per process and read-only afterwards; it is
//! passed to whoever needs it rather than read from a global.

use std::fs;

/// Where resident-memory and CPU-frequency readings come from.
pub trait SystemTelemetry: Send + Sync {
    /// Resident set size of this process, in bytes.
    fn current_process_memory_bytes(&self) -> u64;

    /// Nominal CPU frequency in MHz.
    fn cpu_frequency_mhz(&self) -> f64;
}

/// Reads `/proc/self/status` on every memory query. The CPU frequency is
/// sampled from `/proc/cpuinfo` once, at construction.
#[derive(Debug, Clone)]
pub struct ProcFsTelemetry {
    cpu_mhz: f64,
}

impl ProcFsTelemetry {
    /// Sample the CPU frequency, falling back to `fallback_mhz` when
    /// `/proc/cpuinfo` is unreadable or reports no frequency.
    pub fn new(fallback_mhz: f64) -> Self {
        let cpu_mhz = fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|info| parse_cpuinfo_mhz(&info))
            .unwrap_or(fallback_mhz);

        tracing::debug!(cpu_mhz, "Sampled CPU frequency");
        Self { cpu_mhz }
    }

    /// Skip sampling and report `cpu_mhz`.
    pub fn with_frequency(cpu_mhz: f64) -> Self {
        Self { cpu_mhz }
    }
}

impl SystemTelemetry for ProcFsTelemetry {
    fn current_process_memory_bytes(&self) -> u64 {
        fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|status| parse_vm_rss_bytes(&status))
            .unwrap_or(0)
    }

    fn cpu_frequency_mhz(&self) -> f64 {
        self.cpu_mhz
    }
}

/// Constant readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTelemetry {
    pub memory_bytes: u64,
    pub cpu_mhz: f64,
}

impl FixedTelemetry {
    pub fn new(memory_bytes: u64, cpu_mhz: f64) -> Self {
        Self {
            memory_bytes,
            cpu_mhz,
        }
    }
}

impl SystemTelemetry for FixedTelemetry {
    fn current_process_memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    fn cpu_frequency_mhz(&self) -> f64 {
        self.cpu_mhz
    }
}

/// Parse `VmRSS:    1234 kB` out of `/proc/self/status`.
pub fn parse_vm_rss_bytes(status: &str) -> Option<u64> {
    status
        .lines()
        .find(|line| line.starts_with("VmRSS:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kb| kb.parse::<u64>().ok())
        .map(|kb| kb * 1024)
}

/// Mean of every `cpu MHz` line in `/proc/cpuinfo`.
pub fn parse_cpuinfo_mhz(cpuinfo: &str) -> Option<f64> {
    let readings: Vec<f64> = cpuinfo
        .lines()
        .filter(|line| line.starts_with("cpu MHz"))
        .filter_map(|line| line.split(':').nth(1))
        .filter_map(|value| value.trim().parse::<f64>().ok())
        .filter(|mhz| *mhz > 0.0)
        .collect();

    if readings.is_empty() {
        None
    } else {
        Some(readings.iter().sum::<f64>() / readings.len() as f64)
    }
}
