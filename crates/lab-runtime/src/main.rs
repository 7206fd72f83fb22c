//! # DigestLab CLI
//!
//! ```text
//! digestlab hash --file big.iso -a regular
//! digestlab upload report.pdf -a keyed --key 10c9a7fdfdd3ade1025895293e0b9412
//! digestlab check <digest> -a keyed --key 10c9a7fdfdd3ade1025895293e0b9412
//! digestlab avalanche --hex 0001 -a derive_keyed --context files --summary
//! digestlab preimage "Hello, World!" --budget-secs 60
//! digestlab bench --size 10485760 --runs 10 -a regular_sha3 --metrics
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dl_telemetry::{init_telemetry, log_event, TelemetryConfig};

use lab_runtime::cli::Cli;
use lab_runtime::{commands, LabConfig, LabContainer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry_config = TelemetryConfig::from_env();
    if cli.json_logs {
        telemetry_config.json_logs = true;
    }
    if cli.cpu_mhz.is_some() {
        telemetry_config.cpu_mhz_override = cli.cpu_mhz;
    }

    let mut config = LabConfig::from_env().context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }
    if let Some(parallelism) = cli.parallelism {
        config.parallelism = parallelism;
    }
    if let Some(fan_out) = cli.fan_out {
        config.fan_out = fan_out;
    }
    config.validate().context("Invalid configuration")?;

    let telemetry = init_telemetry(&telemetry_config).context("Failed to initialize telemetry")?;

    log_event!(
        info,
        "runtime",
        "Starting DigestLab",
        version = env!("CARGO_PKG_VERSION"),
        command = cli.command.name()
    );

    // Only the storage commands touch the data directory.
    let lab = if cli.command.needs_storage() {
        LabContainer::new(config, telemetry.metrics, telemetry.source).await?
    } else {
        LabContainer::in_memory(config, telemetry.metrics, telemetry.source)?
    };

    let lab = Arc::new(lab);
    let output = commands::run(cli.command, Arc::clone(&lab)).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    // Counters are per process.
    if cli.metrics {
        eprint!("{}", lab.metrics.encode()?);
    }
    Ok(())
}
