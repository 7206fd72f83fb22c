//! Command-line interface.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use shared_types::{Algorithm, KeyParams};

/// DigestLab: benchmark and analyze hash primitives
#[derive(Parser, Debug)]
#[command(name = "digestlab", version)]
#[command(about = "Parallel chunked hashing, integrity checks, avalanche and second-preimage analysis")]
pub struct Cli {
    /// Data directory for blobs and the metadata index (overrides DL_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Worker threads in the chunk pool (overrides DL_PARALLELISM)
    #[arg(long, global = true)]
    pub parallelism: Option<usize>,

    /// Chunks per payload (overrides DL_FAN_OUT)
    #[arg(long, global = true)]
    pub fan_out: Option<usize>,

    /// Fixed CPU frequency in MHz for throughput figures (overrides DL_CPU_MHZ)
    #[arg(long, global = true)]
    pub cpu_mhz: Option<f64>,

    /// Emit JSON log lines (overrides DL_JSON_LOGS)
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// After the command, print the metrics it recorded to stderr in
    /// Prometheus text format
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chunk-and-fold hash a payload and report timing
    Hash {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Hash a file, store it and record its digest
    Upload {
        /// File to upload
        file: PathBuf,
        /// Name to store it under (default: the file's name)
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Verify a stored file against its recorded digest
    Check {
        /// Recorded digest, hex
        digest: String,
        #[command(flatten)]
        keys: KeyArgs,
    },

    /// Fetch a stored file by digest
    Download {
        /// Recorded digest, hex
        digest: String,
        /// Write the file here (default: current directory, stored name)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Flip every input bit and measure how many digest bits change
    Avalanche {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        keys: KeyArgs,
        /// Spread bit indices over the worker pool
        #[arg(long)]
        parallel: bool,
        /// Omit per-bit samples from the output
        #[arg(long)]
        summary: bool,
    },

    /// Search for a second preimage of a message within a time budget
    Preimage {
        /// Target message (UTF-8)
        message: String,
        #[command(flatten)]
        keys: KeyArgs,
        /// Time budget in seconds (overrides DL_PREIMAGE_BUDGET_SECS)
        #[arg(long)]
        budget_secs: Option<u64>,
        /// Stop after this many candidates
        #[arg(long)]
        max_attempts: Option<u64>,
    },

    /// Repeat an instrumented hash and report mean time, memory and throughput
    Bench {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        keys: KeyArgs,
        /// Number of runs
        #[arg(long, default_value = "10")]
        runs: usize,
    },
}

impl Command {
    /// Subcommand name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Hash { .. } => "hash",
            Command::Upload { .. } => "upload",
            Command::Check { .. } => "check",
            Command::Download { .. } => "download",
            Command::Avalanche { .. } => "avalanche",
            Command::Preimage { .. } => "preimage",
            Command::Bench { .. } => "bench",
        }
    }

    /// Whether the command reads or writes the data directory.
    pub fn needs_storage(&self) -> bool {
        matches!(
            self,
            Command::Upload { .. } | Command::Check { .. } | Command::Download { .. }
        )
    }
}

/// Where the payload comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Read the payload from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Use UTF-8 text as the payload
    #[arg(long)]
    pub text: Option<String>,

    /// Use hex-encoded bytes as the payload
    #[arg(long)]
    pub hex: Option<String>,

    /// Use this many generated bytes as the payload
    #[arg(long)]
    pub size: Option<usize>,
}

impl InputArgs {
    pub fn load(&self) -> Result<Vec<u8>> {
        if let Some(path) = &self.file {
            return std::fs::read(path).with_context(|| format!("reading {}", path.display()));
        }
        if let Some(text) = &self.text {
            return Ok(text.as_bytes().to_vec());
        }
        if let Some(hex) = &self.hex {
            return hex::decode(hex.trim()).context("decoding --hex");
        }
        if let Some(size) = self.size {
            return Ok(generated_payload(size));
        }
        bail!("no input given")
    }
}

/// Deterministic filler bytes.
pub fn generated_payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Algorithm and key material.
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Algorithm tag: regular, keyed, derive_keyed, regular_sha256,
    /// hmac_sha256, regular_sha3, hmac_sha3, hkdf_sha3
    #[arg(short, long, default_value = "regular")]
    pub algorithm: Algorithm,

    /// Key as UTF-8 text (32 bytes for keyed and HMAC algorithms)
    #[arg(long, conflicts_with = "key_hex")]
    pub key: Option<String>,

    /// Key as hex
    #[arg(long)]
    pub key_hex: Option<String>,

    /// Context string for derive_keyed and hkdf_sha3 (upload defaults it
    /// to "<stored name> derive")
    #[arg(long)]
    pub context: Option<String>,

    /// HKDF salt as hex
    #[arg(long)]
    pub salt_hex: Option<String>,
}

impl KeyArgs {
    pub fn params(&self) -> Result<KeyParams> {
        let key = match (&self.key, &self.key_hex) {
            (Some(text), _) => Some(text.as_bytes().to_vec()),
            (None, Some(hex)) => Some(hex::decode(hex.trim()).context("decoding --key-hex")?),
            (None, None) => None,
        };
        let salt = self
            .salt_hex
            .as_deref()
            .map(|s| hex::decode(s.trim()))
            .transpose()
            .context("decoding --salt-hex")?;

        Ok(KeyParams {
            key,
            context: self.context.clone(),
            salt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hash_with_key() {
        let cli = Cli::try_parse_from([
            "digestlab",
            "hash",
            "--text",
            "hello",
            "-a",
            "keyed",
            "--key",
            "10c9a7fdfdd3ade1025895293e0b9412",
        ])
        .unwrap();

        match cli.command {
            Command::Hash { input, keys } => {
                assert_eq!(input.load().unwrap(), b"hello");
                assert_eq!(keys.algorithm, Algorithm::Keyed);
                assert_eq!(keys.params().unwrap().key.unwrap().len(), 32);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        assert!(Cli::try_parse_from(["digestlab", "hash", "--text", "x", "-a", "md5"]).is_err());
    }

    #[test]
    fn test_metrics_is_a_flag_not_a_command() {
        let cli = Cli::try_parse_from(["digestlab", "hash", "--text", "x", "--metrics"]).unwrap();
        assert!(cli.metrics);
        assert_eq!(cli.command.name(), "hash");

        let cli = Cli::try_parse_from(["digestlab", "--metrics", "check", "00ff"]).unwrap();
        assert!(cli.metrics);
        assert!(cli.command.needs_storage());

        assert!(Cli::try_parse_from(["digestlab", "metrics"]).is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["digestlab", "hash"]).is_err());
    }

    #[test]
    fn test_key_hex_and_salt() {
        let keys = KeyArgs {
            algorithm: Algorithm::HkdfSha3,
            key: None,
            key_hex: Some("00ff".to_string()),
            context: Some("ctx".to_string()),
            salt_hex: Some("0102".to_string()),
        };
        let params = keys.params().unwrap();
        assert_eq!(params.key, Some(vec![0x00, 0xff]));
        assert_eq!(params.salt, Some(vec![0x01, 0x02]));
    }
}
