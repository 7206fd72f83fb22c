//! Search loop.

use std::time::{Duration, Instant};

use dl_telemetry::LabMetrics;
use serde::{Deserialize, Serialize};
use shared_crypto::{Digester, Primitive};
use shared_types::{duration_secs, Algorithm, Digest, KeyParams};
use tracing::{debug, info, warn};

use crate::candidates::{Candidate, CandidateStream};
use crate::error::SearchError;

/// Default wall-clock budget: 30 minutes.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(30 * 60);

/// Progress is logged every this many attempts.
const PROGRESS_INTERVAL: u64 = 1 << 20;

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Stop once this much time has passed since the search started.
    pub time_budget: Duration,
    /// Stop after this many candidates. `None` means no cap.
    pub max_attempts: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
            max_attempts: None,
        }
    }
}

impl SearchConfig {
    pub fn with_time_budget(time_budget: Duration) -> Self {
        Self {
            time_budget,
            ..Self::default()
        }
    }

    /// Builder-style method to cap the number of attempts.
    pub fn max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A distinct input with the target digest.
    Found {
        candidate: Candidate,
        attempts: u64,
        #[serde(rename = "elapsed_secs", with = "duration_secs")]
        elapsed: Duration,
    },
    /// The time budget ran out.
    TimedOut {
        attempts: u64,
        #[serde(rename = "elapsed_secs", with = "duration_secs")]
        elapsed: Duration,
    },
    /// The attempt cap was reached or the candidate source ended.
    Exhausted {
        attempts: u64,
        #[serde(rename = "elapsed_secs", with = "duration_secs")]
        elapsed: Duration,
    },
}

impl SearchOutcome {
    pub fn attempts(&self) -> u64 {
        match self {
            SearchOutcome::Found { attempts, .. }
            | SearchOutcome::TimedOut { attempts, .. }
            | SearchOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            SearchOutcome::Found { .. } => "found",
            SearchOutcome::TimedOut { .. } => "timed_out",
            SearchOutcome::Exhausted { .. } => "exhausted",
        }
    }
}

/// Second-preimage search under one keying scheme.
///
/// The target digest and every candidate digest come from the same
/// digester, so a derive-keyed search really runs in derive-key mode.
pub struct SecondPreimageSearch<D = Primitive> {
    digester: D,
    config: SearchConfig,
    metrics: Option<LabMetrics>,
}

impl SecondPreimageSearch<Primitive> {
    /// Search under `algorithm` with the given key material.
    pub fn new(algorithm: Algorithm, params: &KeyParams, config: SearchConfig) -> Result<Self, SearchError> {
        let primitive = Primitive::new(algorithm, params)?;
        Ok(Self::with_digester(primitive, config))
    }
}

impl<D: Digester> SecondPreimageSearch<D> {
    pub fn with_digester(digester: D, config: SearchConfig) -> Self {
        Self {
            digester,
            config,
            metrics: None,
        }
    }

    /// Record attempts and outcomes in `metrics`.
    pub fn with_metrics(mut self, metrics: LabMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Digest of `message` under this search's keying scheme.
    pub fn target_digest(&self, message: &[u8]) -> Result<Digest, SearchError> {
        Ok(self.digester.digest(message)?)
    }

    /// Search the full candidate stream from bit length 1.
    pub fn search(&self, target_message: &[u8], target_digest: &Digest) -> Result<SearchOutcome, SearchError> {
        self.search_from(CandidateStream::new(), target_message, target_digest)
    }

    /// Search `candidates` in order.
    ///
    /// The clock is checked once per candidate, after its digest has been
    /// compared, so a search always tries at least one candidate.
    pub fn search_from<I>(
        &self,
        candidates: I,
        target_message: &[u8],
        target_digest: &Digest,
    ) -> Result<SearchOutcome, SearchError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let expected = self.digester.output_len();
        if target_digest.len() != expected {
            return Err(SearchError::TargetLength {
                expected,
                actual: target_digest.len(),
            });
        }

        let start = Instant::now();
        let mut attempts: u64 = 0;

        let outcome = 'search: {
            for candidate in candidates {
                if self.config.max_attempts.is_some_and(|cap| attempts >= cap) {
                    break 'search SearchOutcome::Exhausted {
                        attempts,
                        elapsed: start.elapsed(),
                    };
                }

                let digest = self.digester.digest(&candidate.bytes)?;
                attempts += 1;

                if &digest == target_digest && candidate.bytes != target_message {
                    break 'search SearchOutcome::Found {
                        candidate,
                        attempts,
                        elapsed: start.elapsed(),
                    };
                }

                let elapsed = start.elapsed();
                if elapsed >= self.config.time_budget {
                    break 'search SearchOutcome::TimedOut { attempts, elapsed };
                }

                if attempts % PROGRESS_INTERVAL == 0 {
                    debug!(attempts, bit_len = candidate.bit_len, "Search progress");
                }
            }

            SearchOutcome::Exhausted {
                attempts,
                elapsed: start.elapsed(),
            }
        };

        self.record(&outcome);
        Ok(outcome)
    }

    fn record(&self, outcome: &SearchOutcome) {
        if let Some(metrics) = &self.metrics {
            metrics.preimage_attempts.inc_by(outcome.attempts());
            metrics
                .preimage_outcomes
                .with_label_values(&[outcome.label()])
                .inc();
        }

        match outcome {
            SearchOutcome::Found { candidate, attempts, .. } => warn!(
                candidate = %candidate.to_hex(),
                attempts,
                "Second preimage found"
            ),
            other => info!(
                outcome = other.label(),
                attempts = other.attempts(),
                "Second-preimage search finished"
            ),
        }
    }
}
