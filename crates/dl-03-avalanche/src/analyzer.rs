//! Sequential and pooled avalanche runs.

use dl_compute::CpuEngine;
use dl_telemetry::LabMetrics;
use shared_crypto::{CryptoError, Digester, Primitive};
use shared_types::{Algorithm, Digest, KeyParams};
use tracing::{debug, info};

use crate::sample::{flip_bit, hamming_distance, AvalancheReport, AvalancheSample};

/// Avalanche analyzer over a fixed key or context.
pub struct AvalancheAnalyzer<D = Primitive> {
    algorithm: Algorithm,
    digester: D,
    metrics: Option<LabMetrics>,
}

impl AvalancheAnalyzer<Primitive> {
    /// Analyzer for `algorithm` with the key material fixed for the whole run.
    pub fn new(algorithm: Algorithm, params: &KeyParams) -> Result<Self, CryptoError> {
        let primitive = Primitive::new(algorithm, params)?;
        Ok(Self::with_digester(algorithm, primitive))
    }
}

impl<D: Digester> AvalancheAnalyzer<D> {
    /// `algorithm` is only used to label reports.
    pub fn with_digester(algorithm: Algorithm, digester: D) -> Self {
        Self {
            algorithm,
            digester,
            metrics: None,
        }
    }

    /// Count every computed sample in `metrics`, streamed or aggregated.
    pub fn with_metrics(mut self, metrics: LabMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Lazy sample sequence for `input`.
    ///
    /// The original digest is computed here, so key problems surface before
    /// the first sample. Nothing else is computed until the caller pulls.
    /// Calling again (or cloning the iterator) restarts the run.
    pub fn samples<'a>(&'a self, input: &'a [u8]) -> Result<AvalancheSamples<'a, D>, CryptoError> {
        let original = self.digester.digest(input)?;
        Ok(AvalancheSamples {
            analyzer: self,
            input,
            original,
            next_bit: 0,
        })
    }

    /// Run every sample in order and aggregate.
    pub fn analyze(&self, input: &[u8]) -> Result<AvalancheReport, CryptoError> {
        let samples = self.samples(input)?;
        let digest_bits = samples.digest_bits();
        let collected = samples.collect::<Result<Vec<_>, _>>()?;
        Ok(self.report(digest_bits, collected))
    }

    /// Same result as [`analyze`](Self::analyze), with bit indices spread
    /// over `engine`'s pool. Samples come back in bit order.
    pub fn analyze_parallel(&self, input: &[u8], engine: &CpuEngine) -> Result<AvalancheReport, CryptoError> {
        let original = self.digester.digest(input)?;
        let digest_bits = original.bit_len();

        let samples = engine
            .map_indexed(input.len() * 8, |bit_index| {
                self.sample_at(input, &original, bit_index)
            })
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.report(digest_bits, samples))
    }

    fn sample_at(&self, input: &[u8], original: &Digest, bit_index: usize) -> Result<AvalancheSample, CryptoError> {
        let flipped = self.digester.digest(&flip_bit(input, bit_index))?;
        let distance = hamming_distance(original.as_bytes(), flipped.as_bytes());
        if let Some(metrics) = &self.metrics {
            metrics.avalanche_samples.inc();
        }
        Ok(AvalancheSample::new(bit_index, distance, original.bit_len()))
    }

    fn report(&self, digest_bits: usize, samples: Vec<AvalancheSample>) -> AvalancheReport {
        let report = AvalancheReport::new(self.algorithm, digest_bits, samples);
        info!(
            algorithm = %self.algorithm,
            input_bits = report.input_bits,
            mean_effect_percent = ?report.mean_effect_percent,
            "Avalanche analysis complete"
        );
        report
    }
}

/// Lazy, finite, restartable sequence of samples: one per input bit.
pub struct AvalancheSamples<'a, D> {
    analyzer: &'a AvalancheAnalyzer<D>,
    input: &'a [u8],
    original: Digest,
    next_bit: usize,
}

impl<'a, D: Digester> AvalancheSamples<'a, D> {
    /// Digest of the unmodified input.
    pub fn original(&self) -> &Digest {
        &self.original
    }

    pub fn digest_bits(&self) -> usize {
        self.original.bit_len()
    }
}

impl<'a, D> Clone for AvalancheSamples<'a, D> {
    fn clone(&self) -> Self {
        Self {
            analyzer: self.analyzer,
            input: self.input,
            original: self.original.clone(),
            next_bit: self.next_bit,
        }
    }
}

impl<'a, D: Digester> Iterator for AvalancheSamples<'a, D> {
    type Item = Result<AvalancheSample, CryptoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_bit >= self.input.len() * 8 {
            return None;
        }
        let bit_index = self.next_bit;
        self.next_bit += 1;

        let sample = self.analyzer.sample_at(self.input, &self.original, bit_index);
        if let Ok(s) = &sample {
            debug!(bit_index, effect_percent = s.effect_percent, "Avalanche sample");
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.input.len() * 8).saturating_sub(self.next_bit);
        (remaining, Some(remaining))
    }
}

impl<'a, D: Digester> ExactSizeIterator for AvalancheSamples<'a, D> {}
