//! # Integration Test Flows
//!
//! Tests that the combiner, integrity service, avalanche analyzer and
//! preimage search agree with each other when wired the way the runtime
//! wires them.
//!
//! ## Flows Tested:
//!
//! 1. **Combiner → Integrity**: upload, check, tamper, re-check
//! 2. **Combiner → Filesystem adapters**: persisted index survives reopen,
//!    including a fan-out change between runs
//! 3. **Worker-count invariance**: same digest for any pool size
//! 4. **Analysis**: avalanche and preimage search over shared metrics

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use dl_01_combiner::{ChunkedCombiner, CombineError, CombinerApi, CombinerConfig, CombinerService};
    use dl_02_integrity::{
        CheckOutcome, FsBlobStore, InMemoryBlobStore, InMemoryMetadataIndex, IntegrityError,
        IntegrityOutcome, IntegrityService, JsonFileMetadataIndex,
    };
    use dl_03_avalanche::AvalancheAnalyzer;
    use dl_04_preimage::{SearchConfig, SearchOutcome, SecondPreimageSearch};
    use dl_compute::CpuEngine;
    use dl_telemetry::{FixedTelemetry, Instrument, LabMetrics};
    use shared_crypto::CryptoError;
    use shared_types::{Algorithm, HashRequest, KeyParams, KeyingMode};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const KEY: [u8; 32] = [0x42; 32];

    fn combiner_service(workers: usize, metrics: &LabMetrics) -> Arc<CombinerService> {
        combiner_service_with_fan_out(workers, CombinerConfig::default().fan_out, metrics)
    }

    fn combiner_service_with_fan_out(workers: usize, fan_out: usize, metrics: &LabMetrics) -> Arc<CombinerService> {
        let engine = Arc::new(CpuEngine::with_workers(workers).unwrap());
        let combiner = ChunkedCombiner::new(engine, CombinerConfig::with_fan_out(fan_out)).unwrap();
        let instrument = Instrument::new(Arc::new(FixedTelemetry::new(1 << 20, 2400.0)));
        Arc::new(CombinerService::new(combiner, instrument, metrics.clone()))
    }

    fn params_for(algorithm: Algorithm) -> KeyParams {
        match algorithm.mode() {
            KeyingMode::Regular => KeyParams::none(),
            KeyingMode::Keyed => KeyParams::with_key(KEY.to_vec()),
            KeyingMode::DeriveKeyed => KeyParams::with_context("digestlab 2024-01-01 integration"),
        }
    }

    struct MemoryLab {
        metrics: LabMetrics,
        blobs: Arc<InMemoryBlobStore>,
        index: Arc<InMemoryMetadataIndex>,
        integrity: IntegrityService,
    }

    fn memory_lab() -> MemoryLab {
        let metrics = LabMetrics::new().unwrap();
        let combiner = combiner_service(4, &metrics);
        let blobs = Arc::new(InMemoryBlobStore::new());
        let index = Arc::new(InMemoryMetadataIndex::new());
        let integrity = IntegrityService::new(combiner, blobs.clone(), index.clone(), metrics.clone());
        MemoryLab {
            metrics,
            blobs,
            index,
            integrity,
        }
    }

    // =============================================================================
    // COMBINER → INTEGRITY
    // =============================================================================

    #[tokio::test]
    async fn test_upload_check_tamper_for_every_algorithm() {
        let lab = memory_lab();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

        for algorithm in Algorithm::ALL {
            let name = format!("payload-{}.bin", algorithm.tag());
            let receipt = lab
                .integrity
                .upload(&name, HashRequest::new(payload.clone(), algorithm, params_for(algorithm)))
                .await
                .unwrap();
            assert_eq!(receipt.file_name, name);
            assert_eq!(receipt.result.chunk_count, 8);
            assert_eq!(receipt.result.payload_len, payload.len());

            let digest = receipt.result.digest.clone();
            let outcome = lab
                .integrity
                .check(&digest, algorithm, params_for(algorithm))
                .await
                .unwrap();
            assert_eq!(
                outcome,
                CheckOutcome::Verified {
                    file_name: name.clone(),
                    outcome: IntegrityOutcome::Match
                },
                "{} should verify",
                algorithm
            );

            assert!(lab.blobs.tamper(&name, |bytes| bytes[9_999] ^= 0x80));
            let outcome = lab
                .integrity
                .check(&digest, algorithm, params_for(algorithm))
                .await
                .unwrap();
            assert!(
                matches!(
                    outcome,
                    CheckOutcome::Verified {
                        outcome: IntegrityOutcome::Mismatch { .. },
                        ..
                    }
                ),
                "{} should detect a flipped bit",
                algorithm
            );
        }

        assert_eq!(lab.index.records().len(), Algorithm::ALL.len());
        let matched = lab.metrics.integrity_checks.with_label_values(&["match"]).get();
        let mismatched = lab.metrics.integrity_checks.with_label_values(&["mismatch"]).get();
        assert_eq!(matched, Algorithm::ALL.len() as u64);
        assert_eq!(mismatched, Algorithm::ALL.len() as u64);
    }

    #[tokio::test]
    async fn test_check_is_scoped_to_algorithm_tag() {
        let lab = memory_lab();
        let receipt = lab
            .integrity
            .upload(
                "scoped.txt",
                HashRequest::new(b"scoped".to_vec(), Algorithm::RegularSha256, KeyParams::none()),
            )
            .await
            .unwrap();

        let outcome = lab
            .integrity
            .check(&receipt.result.digest, Algorithm::RegularSha3, KeyParams::none())
            .await
            .unwrap();
        assert_eq!(outcome, CheckOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_wrong_key_length_stores_nothing() {
        let lab = memory_lab();
        let err = lab
            .integrity
            .upload(
                "short-key.bin",
                HashRequest::new(b"data".to_vec(), Algorithm::Keyed, KeyParams::with_key(vec![0u8; 31])),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            IntegrityError::Combine(CombineError::Crypto(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 31,
                ..
            }))
        ));
        assert!(lab.blobs.is_empty());
        assert!(lab.index.records().is_empty());
    }

    // =============================================================================
    // FILESYSTEM ADAPTERS
    // =============================================================================

    #[tokio::test]
    async fn test_filesystem_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let blob_dir = dir.path().join("blobs");
        let index_path = dir.path().join("index.json");
        let metrics = LabMetrics::new().unwrap();
        let combiner = combiner_service(2, &metrics);

        let digest = {
            let integrity = IntegrityService::new(
                combiner.clone(),
                Arc::new(FsBlobStore::open(&blob_dir).await.unwrap()),
                Arc::new(JsonFileMetadataIndex::open(&index_path).await.unwrap()),
                metrics.clone(),
            );
            integrity
                .upload(
                    "../outside/report v1.txt",
                    HashRequest::new(b"quarterly numbers".to_vec(), Algorithm::HmacSha256, params_for(Algorithm::HmacSha256)),
                )
                .await
                .unwrap()
                .result
                .digest
        };

        assert!(blob_dir.join("report_v1.txt").exists());
        assert!(!dir.path().join("outside").exists());

        let integrity = IntegrityService::new(
            combiner,
            Arc::new(FsBlobStore::open(&blob_dir).await.unwrap()),
            Arc::new(JsonFileMetadataIndex::open(&index_path).await.unwrap()),
            metrics,
        );

        let outcome = integrity
            .check(&digest, Algorithm::HmacSha256, params_for(Algorithm::HmacSha256))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckOutcome::Verified {
                outcome: IntegrityOutcome::Match,
                ..
            }
        ));

        // A different key is a mismatch, not a lookup failure.
        let outcome = integrity
            .check(&digest, Algorithm::HmacSha256, KeyParams::with_key(vec![0x24; 32]))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckOutcome::Verified {
                outcome: IntegrityOutcome::Mismatch { .. },
                ..
            }
        ));

        std::fs::write(blob_dir.join("report_v1.txt"), b"quarterly numbers!").unwrap();
        let outcome = integrity
            .check(&digest, Algorithm::HmacSha256, params_for(Algorithm::HmacSha256))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckOutcome::Verified {
                outcome: IntegrityOutcome::Mismatch { .. },
                ..
            }
        ));

        let (name, bytes) = integrity.download(&digest).await.unwrap().unwrap();
        assert_eq!(name, "report_v1.txt");
        assert_eq!(bytes, b"quarterly numbers!");
    }

    #[tokio::test]
    async fn test_check_after_fan_out_change_still_matches() {
        let dir = tempfile::tempdir().unwrap();
        let blob_dir = dir.path().join("blobs");
        let index_path = dir.path().join("index.json");
        let metrics = LabMetrics::new().unwrap();

        let digest = {
            let integrity = IntegrityService::new(
                combiner_service_with_fan_out(2, 8, &metrics),
                Arc::new(FsBlobStore::open(&blob_dir).await.unwrap()),
                Arc::new(JsonFileMetadataIndex::open(&index_path).await.unwrap()),
                metrics.clone(),
            );
            integrity
                .upload("hello.txt", HashRequest::new(b"hello world".to_vec(), Algorithm::Regular, KeyParams::none()))
                .await
                .unwrap()
                .result
                .digest
        };

        let reconfigured = combiner_service_with_fan_out(3, 4, &metrics);
        assert_ne!(
            reconfigured.digest(b"hello world", Algorithm::Regular, &KeyParams::none()).unwrap(),
            digest
        );

        let integrity = IntegrityService::new(
            reconfigured,
            Arc::new(FsBlobStore::open(&blob_dir).await.unwrap()),
            Arc::new(JsonFileMetadataIndex::open(&index_path).await.unwrap()),
            metrics.clone(),
        );
        let outcome = integrity
            .check(&digest, Algorithm::Regular, KeyParams::none())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CheckOutcome::Verified {
                file_name: "hello.txt".to_string(),
                outcome: IntegrityOutcome::Match
            }
        );

        std::fs::write(blob_dir.join("hello.txt"), b"hello world?").unwrap();
        let outcome = integrity
            .check(&digest, Algorithm::Regular, KeyParams::none())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckOutcome::Verified {
                outcome: IntegrityOutcome::Mismatch { .. },
                ..
            }
        ));
        assert_eq!(metrics.integrity_checks.with_label_values(&["match"]).get(), 1);
    }

    // =============================================================================
    // WORKER-COUNT INVARIANCE
    // =============================================================================

    #[test]
    fn test_digest_independent_of_pool_size() {
        let metrics = LabMetrics::new().unwrap();
        let payload: Vec<u8> = (0..4096u32).map(|i| (i * 31 % 251) as u8).collect();

        for algorithm in Algorithm::ALL {
            let params = params_for(algorithm);
            let reference = combiner_service(1, &metrics)
                .digest(&payload, algorithm, &params)
                .unwrap();
            for workers in [2, 3, 8] {
                let digest = combiner_service(workers, &metrics)
                    .digest(&payload, algorithm, &params)
                    .unwrap();
                assert_eq!(digest, reference, "{} with {} workers", algorithm, workers);
            }
        }
    }

    #[test]
    fn test_combined_digest_is_hash_of_chunk_hashes() {
        let metrics = LabMetrics::new().unwrap();
        let service = combiner_service(4, &metrics);
        let result = service
            .combine(&HashRequest::new(b"hello".to_vec(), Algorithm::Regular, KeyParams::none()))
            .unwrap();

        // Five bytes under a fan-out of eight: one chunk per byte.
        assert_eq!(result.chunk_count, 5);
        let concatenated: Vec<u8> = b"hello"
            .iter()
            .flat_map(|b| shared_crypto::blake3_hash(&[*b]))
            .collect();
        assert_eq!(result.digest.as_bytes(), &shared_crypto::blake3_hash(&concatenated));
        assert_ne!(result.digest.as_bytes(), &shared_crypto::blake3_hash(b"hello"));
        assert!(result.throughput_cpb >= 0.0);
    }

    #[test]
    fn test_hkdf_output_grows_with_chunk_count() {
        let metrics = LabMetrics::new().unwrap();
        let service = combiner_service(2, &metrics);
        let params = params_for(Algorithm::HkdfSha3);

        let three = service.digest(b"abc", Algorithm::HkdfSha3, &params).unwrap();
        let eight = service.digest(&[7u8; 64], Algorithm::HkdfSha3, &params).unwrap();
        assert_eq!(three.len(), 3 * 32);
        assert_eq!(eight.len(), 8 * 32);
    }

    // =============================================================================
    // ANALYSIS
    // =============================================================================

    #[test]
    fn test_avalanche_parallel_matches_sequential() {
        let metrics = LabMetrics::new().unwrap();
        let engine = CpuEngine::with_workers(4).unwrap();
        let analyzer = AvalancheAnalyzer::new(Algorithm::RegularSha3, &KeyParams::none())
            .unwrap()
            .with_metrics(metrics.clone());

        let input = b"The quick brown fox";
        let sequential = analyzer.analyze(input).unwrap();
        let parallel = analyzer.analyze_parallel(input, &engine).unwrap();

        assert_eq!(sequential.samples, parallel.samples);
        assert_eq!(sequential.samples.len(), input.len() * 8);
        assert_eq!(sequential.digest_bits, 256);
        let mean = sequential.mean_effect_percent.unwrap();
        assert!((35.0..=65.0).contains(&mean), "mean effect {}", mean);
        assert_eq!(metrics.avalanche_samples.get(), 2 * input.len() as u64 * 8);
    }

    #[test]
    fn test_avalanche_two_byte_input() {
        let analyzer = AvalancheAnalyzer::new(Algorithm::Regular, &KeyParams::none()).unwrap();
        let report = analyzer.analyze(b"\x00\x01").unwrap();

        assert_eq!(report.samples.len(), 16);
        for (i, sample) in report.samples.iter().enumerate() {
            assert_eq!(sample.bit_index, i);
            assert!(sample.hamming_distance > 0);
            assert!((0.0..=100.0).contains(&sample.effect_percent));
        }
    }

    #[test]
    fn test_preimage_search_times_out_on_strong_digest() {
        let metrics = LabMetrics::new().unwrap();
        let search = SecondPreimageSearch::new(
            Algorithm::DeriveKeyed,
            &params_for(Algorithm::DeriveKeyed),
            SearchConfig::with_time_budget(Duration::from_millis(200)),
        )
        .unwrap()
        .with_metrics(metrics.clone());

        let message = b"target message";
        let target = search.target_digest(message).unwrap();
        let outcome = search.search(message, &target).unwrap();

        assert!(matches!(outcome, SearchOutcome::TimedOut { .. }));
        assert!(outcome.attempts() >= 1);
        assert_eq!(metrics.preimage_attempts.get(), outcome.attempts());
        assert_eq!(
            metrics.preimage_outcomes.with_label_values(&["timed_out"]).get(),
            1
        );
    }

    #[test]
    fn test_preimage_search_respects_attempt_cap() {
        let search = SecondPreimageSearch::new(
            Algorithm::HmacSha3,
            &params_for(Algorithm::HmacSha3),
            SearchConfig::default().max_attempts(1_000),
        )
        .unwrap();

        let target = search.target_digest(b"msg").unwrap();
        let outcome = search.search(b"msg", &target).unwrap();
        assert!(matches!(outcome, SearchOutcome::Exhausted { attempts: 1_000, .. }));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "exhausted");
    }
}
