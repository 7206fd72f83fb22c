//! # DigestLab Combine Benchmarks
//!
//! Chunked-combine throughput per algorithm, payload size and pool size,
//! against the one-shot digest of the same payload.
//!
//! | Group | Varies | Fixed |
//! |-------|--------|-------|
//! | combine-algorithms | algorithm | 1 MiB, all cores |
//! | combine-workers | worker count | BLAKE3, 4 MiB |
//! | combine-payloads | payload size | SHA-256, all cores |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dl_01_combiner::{ChunkedCombiner, CombinerConfig};
use dl_compute::{available_parallelism, CpuEngine};
use rand::RngCore;
use shared_crypto::{Digester, Primitive};
use shared_types::{Algorithm, KeyParams, KeyingMode};

const MIB: usize = 1024 * 1024;

fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}

fn params_for(algorithm: Algorithm) -> KeyParams {
    match algorithm.mode() {
        KeyingMode::Regular => KeyParams::none(),
        KeyingMode::Keyed => KeyParams::with_key(vec![0x5A; 32]),
        KeyingMode::DeriveKeyed => KeyParams::with_context("digestlab bench context"),
    }
}

fn combiner(workers: usize) -> ChunkedCombiner {
    let engine = Arc::new(CpuEngine::with_workers(workers).expect("worker pool"));
    ChunkedCombiner::new(engine, CombinerConfig::default()).expect("combiner config")
}

// ============================================================================
// Algorithms: chunked combine vs one-shot
// ============================================================================

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine-algorithms");
    group.measurement_time(Duration::from_secs(5));

    let payload = random_payload(MIB);
    let combiner = combiner(available_parallelism());
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for algorithm in Algorithm::ALL {
        let primitive = Primitive::new(algorithm, &params_for(algorithm)).expect("primitive");

        group.bench_with_input(
            BenchmarkId::new("chunked", algorithm.tag()),
            &payload,
            |b, payload| b.iter(|| black_box(combiner.combine_with(&primitive, payload).expect("combine"))),
        );
        group.bench_with_input(
            BenchmarkId::new("one_shot", algorithm.tag()),
            &payload,
            |b, payload| b.iter(|| black_box(primitive.digest(payload).expect("digest"))),
        );
    }

    group.finish();
}

// ============================================================================
// Pool size scaling
// ============================================================================

fn bench_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine-workers");
    group.measurement_time(Duration::from_secs(5));

    let payload = random_payload(4 * MIB);
    let primitive = Primitive::new(Algorithm::Regular, &KeyParams::none()).expect("primitive");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for workers in [1, 2, 4, 8] {
        let combiner = combiner(workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &payload, |b, payload| {
            b.iter(|| black_box(combiner.combine_with(&primitive, payload).expect("combine")))
        });
    }

    group.finish();
}

// ============================================================================
// Payload size
// ============================================================================

fn bench_payloads(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine-payloads");

    let primitive = Primitive::new(Algorithm::RegularSha256, &KeyParams::none()).expect("primitive");
    let combiner = combiner(available_parallelism());

    for size in [64, 4 * 1024, 256 * 1024, 4 * MIB] {
        let payload = random_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| black_box(combiner.combine_with(&primitive, payload).expect("combine")))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_algorithms, bench_workers, bench_payloads);
criterion_main!(benches);
