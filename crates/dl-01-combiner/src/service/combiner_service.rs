//! Instrumented combine.

use dl_telemetry::{HistogramTimer, Instrument, LabMetrics};
use shared_crypto::Primitive;
use shared_types::{Algorithm, CombinedResult, Digest, HashRequest, KeyParams};
use tracing::{info, warn};

use crate::error::CombineError;
use crate::ports::CombinerApi;
use crate::service::ChunkedCombiner;

/// [`ChunkedCombiner`] wrapped with the instrumentation wrapper and metrics.
#[derive(Debug, Clone)]
pub struct CombinerService {
    combiner: ChunkedCombiner,
    instrument: Instrument,
    metrics: LabMetrics,
}

impl CombinerService {
    pub fn new(combiner: ChunkedCombiner, instrument: Instrument, metrics: LabMetrics) -> Self {
        Self {
            combiner,
            instrument,
            metrics,
        }
    }

    pub fn combiner(&self) -> &ChunkedCombiner {
        &self.combiner
    }

    fn record_failure(&self, err: &CombineError) {
        self.metrics
            .combine_failures
            .with_label_values(&[err.kind()])
            .inc();
        if err.is_client_error() {
            warn!(error = %err, "Combine rejected");
        } else {
            warn!(error = %err, "Combine failed");
        }
    }
}

impl CombinerApi for CombinerService {
    fn combine(&self, request: &HashRequest) -> Result<CombinedResult, CombineError> {
        let algorithm = request.algorithm;
        let payload = &request.payload;

        // Validation happens outside the measured region and before the pool.
        let primitive = Primitive::new(algorithm, &request.params).map_err(|e| {
            let err = CombineError::from(e);
            self.record_failure(&err);
            err
        })?;

        let measured = {
            let _timer = HistogramTimer::new(
                self.metrics
                    .combine_duration
                    .with_label_values(&[algorithm.tag()]),
            );
            self.instrument
                .measure(payload.len(), || self.combiner.combine_with(&primitive, payload))
        };
        let (digest, measurement) = measured.map_err(|e| {
            self.record_failure(&e);
            e
        })?;

        self.metrics
            .combine_total
            .with_label_values(&[algorithm.tag()])
            .inc();

        let result = CombinedResult {
            algorithm,
            digest,
            payload_len: payload.len(),
            chunk_count: self.combiner.plan(payload.len()).len(),
            elapsed: measurement.elapsed,
            memory_delta_bytes: measurement.memory_delta_bytes,
            throughput_cpb: measurement.throughput_cpb,
        };

        info!(
            algorithm = %algorithm,
            payload_len = result.payload_len,
            chunks = result.chunk_count,
            elapsed_ms = result.elapsed.as_secs_f64() * 1000.0,
            cpb = result.throughput_cpb,
            "Combine complete"
        );
        Ok(result)
    }

    fn digest(
        &self,
        payload: &[u8],
        algorithm: Algorithm,
        params: &KeyParams,
    ) -> Result<Digest, CombineError> {
        self.digest_with_fan_out(payload, algorithm, params, self.fan_out())
    }

    fn digest_with_fan_out(
        &self,
        payload: &[u8],
        algorithm: Algorithm,
        params: &KeyParams,
        fan_out: usize,
    ) -> Result<Digest, CombineError> {
        Primitive::new(algorithm, params)
            .map_err(CombineError::from)
            .and_then(|primitive| self.combiner.combine_with_fan_out(&primitive, payload, fan_out))
            .map_err(|e| {
                self.record_failure(&e);
                e
            })
    }

    fn fan_out(&self) -> usize {
        self.combiner.config().fan_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CombinerConfig;
    use dl_compute::CpuEngine;
    use dl_telemetry::FixedTelemetry;
    use std::sync::Arc;

    fn service() -> CombinerService {
        let engine = Arc::new(CpuEngine::with_workers(2).unwrap());
        let combiner = ChunkedCombiner::new(engine, CombinerConfig::default()).unwrap();
        let instrument = Instrument::new(Arc::new(FixedTelemetry::new(1 << 20, 2000.0)));
        CombinerService::new(combiner, instrument, LabMetrics::new().unwrap())
    }

    #[test]
    fn test_combined_result_fields() {
        let service = service();
        let request = HashRequest::new(vec![1u8; 100], Algorithm::RegularSha256, KeyParams::none());
        let result = service.combine(&request).unwrap();

        assert_eq!(result.algorithm, Algorithm::RegularSha256);
        assert_eq!(result.payload_len, 100);
        assert_eq!(result.chunk_count, 8);
        assert_eq!(result.digest.len(), 32);
        assert_eq!(result.memory_delta_bytes, 0);
        assert!(result.throughput_cpb >= 0.0);

        assert_eq!(
            result.digest,
            service
                .digest(&request.payload, request.algorithm, &request.params)
                .unwrap()
        );
    }

    #[test]
    fn test_digest_with_recorded_fan_out() {
        let service = service();
        assert_eq!(service.fan_out(), 8);

        let params = KeyParams::with_key(vec![9u8; 32]);
        let default = service.digest(b"hello world", Algorithm::Keyed, &params).unwrap();
        assert_eq!(
            service
                .digest_with_fan_out(b"hello world", Algorithm::Keyed, &params, 8)
                .unwrap(),
            default
        );
        assert_ne!(
            service
                .digest_with_fan_out(b"hello world", Algorithm::Keyed, &params, 4)
                .unwrap(),
            default
        );
    }

    #[test]
    fn test_metrics_recorded() {
        let service = service();
        let ok = HashRequest::new(b"abc".to_vec(), Algorithm::Regular, KeyParams::none());
        let bad = HashRequest::new(b"abc".to_vec(), Algorithm::HmacSha3, KeyParams::with_key(vec![1u8; 5]));

        service.combine(&ok).unwrap();
        assert!(service.combine(&bad).is_err());

        let metrics = &service.metrics;
        assert_eq!(metrics.combine_total.with_label_values(&["regular"]).get(), 1);
        assert_eq!(
            metrics
                .combine_failures
                .with_label_values(&["invalid_key_length"])
                .get(),
            1
        );
    }
}
