//! Batch Throughput Benchmark
//!
//! Many single-block SHA-256 messages through the batch API, and the thread
//! scaling of batch CryptoNight.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use powcore::Block;
use rand::prelude::*;
use std::hint::black_box;

fn random_blocks(n: usize) -> Vec<Block> {
    let mut blocks = vec![[0u8; 64]; n];
    for b in &mut blocks {
        rand::rng().fill(&mut b[..]);
    }
    blocks
}

// =============================================================================
// BENCHMARK 1: BATCH SHA-256
// =============================================================================

fn bench_batch_sha256(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Batch-SHA-256");

    for n in [16usize, 1024, 64 * 1024] {
        let blocks = random_blocks(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            criterion::BenchmarkId::from_parameter(n),
            &blocks,
            |b, data| b.iter(|| powcore::digest_blocks(black_box(data))),
        );
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 2: THREAD SCALING
// =============================================================================

/// Batch CryptoNight over 1 to N threads; each worker owns a 2 MiB scratchpad.
#[cfg(feature = "multithread")]
fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Thread-Scaling");
    group.sample_size(10);

    let max_threads = num_cpus::get();
    let thread_counts: Vec<usize> = [1, 2, 4, 8, 16]
        .iter()
        .copied()
        .filter(|&t| t <= max_threads)
        .collect();

    let blobs: Vec<Vec<u8>> = (0..16u8)
        .map(|n| {
            let mut blob = vec![n; 76];
            blob[0] = 7;
            blob
        })
        .collect();
    group.throughput(Throughput::Elements(blobs.len() as u64));

    for threads in thread_counts {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        group.bench_with_input(
            criterion::BenchmarkId::from_parameter(format!("{threads}-threads")),
            &blobs,
            |b, data| b.iter(|| pool.install(|| powcore::hash_standard_many(black_box(data)))),
        );
    }
    group.finish();
}

#[cfg(feature = "multithread")]
criterion_group!(benches, bench_batch_sha256, bench_thread_scaling);
#[cfg(not(feature = "multithread"))]
criterion_group!(benches, bench_batch_sha256);
criterion_main!(benches);
