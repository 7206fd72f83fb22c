//! Subcommand execution. Every command returns a JSON document.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dl_01_combiner::CombinerApi;
use dl_03_avalanche::AvalancheAnalyzer;
use dl_04_preimage::{SearchConfig, SecondPreimageSearch};
use dl_telemetry::log_event;
use serde::Serialize;
use serde_json::{json, Value};
use shared_types::{Digest, HashRequest};
use tracing::info;

use crate::cli::{Command, InputArgs, KeyArgs};
use crate::container::LabContainer;

/// Mean readings over repeated runs of one instrumented combine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchSummary {
    pub algorithm: shared_types::Algorithm,
    pub payload_len: usize,
    pub runs: usize,
    pub digest: Digest,
    pub mean_elapsed_secs: f64,
    pub mean_memory_delta_bytes: f64,
    pub mean_throughput_cpb: f64,
}

/// Run one subcommand against the container.
pub async fn run(command: Command, lab: Arc<LabContainer>) -> Result<Value> {
    match command {
        Command::Hash { input, keys } => hash(&lab, &input, &keys).await,
        Command::Upload { file, name, keys } => upload(&lab, file, name, &keys).await,
        Command::Check { digest, keys } => check(&lab, &digest, &keys).await,
        Command::Download { digest, out } => download(&lab, &digest, out).await,
        Command::Avalanche {
            input,
            keys,
            parallel,
            summary,
        } => avalanche(lab, &input, &keys, parallel, summary).await,
        Command::Preimage {
            message,
            keys,
            budget_secs,
            max_attempts,
        } => preimage(lab, message, &keys, budget_secs, max_attempts).await,
        Command::Bench { input, keys, runs } => bench(lab, &input, &keys, runs).await,
    }
}

async fn hash(lab: &Arc<LabContainer>, input: &InputArgs, keys: &KeyArgs) -> Result<Value> {
    let request = HashRequest::new(input.load()?, keys.algorithm, keys.params()?);
    let combiner = Arc::clone(&lab.combiner);
    let result = tokio::task::spawn_blocking(move || combiner.combine(&request)).await??;
    Ok(serde_json::to_value(result)?)
}

async fn upload(lab: &LabContainer, file: PathBuf, name: Option<String>, keys: &KeyArgs) -> Result<Value> {
    let payload = tokio::fs::read(&file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("file has no name; pass --name")?,
    };

    let request = HashRequest::new(payload, keys.algorithm, keys.params()?);
    let receipt = lab.integrity.upload(&name, request).await?;
    Ok(serde_json::to_value(receipt)?)
}

async fn check(lab: &LabContainer, digest: &str, keys: &KeyArgs) -> Result<Value> {
    let digest = Digest::from_hex(digest).context("parsing digest")?;
    let outcome = lab
        .integrity
        .check(&digest, keys.algorithm, keys.params()?)
        .await?;
    Ok(serde_json::to_value(outcome)?)
}

async fn download(lab: &LabContainer, digest: &str, out: Option<PathBuf>) -> Result<Value> {
    let digest = Digest::from_hex(digest).context("parsing digest")?;
    let Some((file_name, bytes)) = lab.integrity.download(&digest).await? else {
        return Ok(json!({ "found": false, "digest": digest }));
    };

    let path = out.unwrap_or_else(|| PathBuf::from(&file_name));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    log_event!(info, "integrity", "Downloaded", file = %file_name, path = %path.display());
    Ok(json!({
        "found": true,
        "file_name": file_name,
        "bytes": bytes.len(),
        "written_to": path,
    }))
}

async fn avalanche(
    lab: Arc<LabContainer>,
    input: &InputArgs,
    keys: &KeyArgs,
    parallel: bool,
    summary: bool,
) -> Result<Value> {
    let payload = input.load()?;
    let analyzer =
        AvalancheAnalyzer::new(keys.algorithm, &keys.params()?)?.with_metrics(lab.metrics.clone());

    let mut report = tokio::task::spawn_blocking(move || {
        if parallel {
            analyzer.analyze_parallel(&payload, &lab.engine)
        } else {
            analyzer.analyze(&payload)
        }
    })
    .await??;

    if summary {
        report.samples.clear();
    }
    Ok(serde_json::to_value(report)?)
}

async fn preimage(
    lab: Arc<LabContainer>,
    message: String,
    keys: &KeyArgs,
    budget_secs: Option<u64>,
    max_attempts: Option<u64>,
) -> Result<Value> {
    let config = SearchConfig {
        time_budget: budget_secs
            .map(Duration::from_secs)
            .unwrap_or(lab.config.preimage_budget),
        max_attempts,
    };
    let algorithm = keys.algorithm;
    let search = SecondPreimageSearch::new(algorithm, &keys.params()?, config)?
        .with_metrics(lab.metrics.clone());

    info!(
        %algorithm,
        budget_secs = config.time_budget.as_secs(),
        "Starting second-preimage search"
    );

    let (target_digest, outcome) = tokio::task::spawn_blocking(move || {
        let target_digest = search.target_digest(message.as_bytes())?;
        let outcome = search.search(message.as_bytes(), &target_digest)?;
        Ok::<_, dl_04_preimage::SearchError>((target_digest, outcome))
    })
    .await??;

    Ok(json!({
        "algorithm": algorithm,
        "target_digest": target_digest,
        "outcome": outcome,
    }))
}

async fn bench(lab: Arc<LabContainer>, input: &InputArgs, keys: &KeyArgs, runs: usize) -> Result<Value> {
    let request = HashRequest::new(input.load()?, keys.algorithm, keys.params()?);
    let runs = runs.max(1);

    let summary = tokio::task::spawn_blocking(move || -> Result<BenchSummary> {
        let mut results = Vec::with_capacity(runs);
        for _ in 0..runs {
            results.push(lab.combiner.combine(&request)?);
        }
        summarize(&results).context("no runs")
    })
    .await??;

    Ok(serde_json::to_value(summary)?)
}

/// Average the instrumented readings of repeated runs.
pub fn summarize(results: &[shared_types::CombinedResult]) -> Option<BenchSummary> {
    let first = results.first()?;
    let n = results.len() as f64;

    Some(BenchSummary {
        algorithm: first.algorithm,
        payload_len: first.payload_len,
        runs: results.len(),
        digest: first.digest.clone(),
        mean_elapsed_secs: results.iter().map(|r| r.elapsed.as_secs_f64()).sum::<f64>() / n,
        mean_memory_delta_bytes: results.iter().map(|r| r.memory_delta_bytes as f64).sum::<f64>() / n,
        mean_throughput_cpb: results.iter().map(|r| r.throughput_cpb).sum::<f64>() / n,
    })
}
