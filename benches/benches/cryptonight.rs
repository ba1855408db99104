//! CryptoNight Benchmark
//!
//! Hashes per second of the portable path per variant, and of the AES-NI path.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use powcore::{hash_fast, hash_with_variant, Variant};
use std::hint::black_box;

fn bench_cryptonight(c: &mut Criterion) {
    let mut group = c.benchmark_group("CryptoNight");
    group.sample_size(10);
    group.throughput(Throughput::Elements(1));

    let mut blob = vec![0x42u8; 76];
    blob[0] = 7;
    let mut out = [0u8; 32];

    for variant in [Variant::Original, Variant::V1, Variant::V2] {
        group.bench_function(format!("Portable v{}", variant.number()), |b| {
            b.iter(|| hash_with_variant(black_box(&blob), variant, &mut out));
        });
    }

    if powcore::fast_available() {
        group.bench_function("AES-NI v1", |b| {
            b.iter(|| hash_fast(black_box(&blob), &mut out));
        });
    } else {
        println!("Skipping AES-NI: not supported.");
    }

    group.finish();
}

criterion_group!(benches, bench_cryptonight);
criterion_main!(benches);
