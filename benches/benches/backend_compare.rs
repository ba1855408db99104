//! Backend Comparison Benchmark
//!
//! One multiway SHA-256 compression pass per lane backend, against `sha2`
//! hashing the same number of single-block messages one at a time.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use powcore::{buffer_sizes, get_trunk, LaneBackendKind};
use rand::prelude::*;
use sha2::{Digest, Sha256};
use std::hint::black_box;

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("SHA-256 Lane Backends");

    for kind in LaneBackendKind::ALL {
        // Unsupported hardware backends are skipped, not emulated.
        let Ok(trunk) = get_trunk(kind) else {
            continue;
        };
        let (in_len, out_len) = buffer_sizes(kind);
        let mut blocks = vec![0u8; in_len];
        rand::rng().fill(&mut blocks[..]);
        let mut out = vec![0u8; out_len];

        group.throughput(Throughput::Bytes(in_len as u64));
        group.bench_function(format!("{kind} ({}-way)", kind.way()), |b| {
            b.iter(|| trunk(black_box(&mut out), black_box(&blocks), 1));
        });
    }

    // Baseline: sha2 over 16 messages of 55 bytes (one padded block each).
    let mut messages = vec![[0u8; 55]; 16];
    for m in &mut messages {
        rand::rng().fill(&mut m[..]);
    }
    group.throughput(Throughput::Bytes(64 * 16));
    group.bench_function("sha2 (16 messages)", |b| {
        b.iter(|| {
            for m in &messages {
                black_box(Sha256::digest(black_box(m)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
