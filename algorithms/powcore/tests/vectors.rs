//! Known-Answer Test Vectors
//!
//! Verifies SHA-256, the four finishing hashes and CryptoNight against the
//! published values in `tests/test_vectors.json`. Inputs are hex, except for
//! SHA-256 where they are plain text.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use powcore::cryptonight::finalizers::FINALIZERS;
use powcore::{digest_blocks_with, hash_with_variant, LaneBackendKind, Variant};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;

#[derive(Deserialize)]
struct TextVector {
    name: String,
    input: String,
    hash: String,
}

#[derive(Deserialize)]
struct FinisherVector {
    name: String,
    finisher: usize,
    input: String,
    hash: String,
}

#[derive(Deserialize)]
struct CryptoNightVector {
    name: String,
    variant: u8,
    input: String,
    hash: String,
}

#[derive(Deserialize)]
struct TestVectors {
    sha256: Vec<TextVector>,
    finishers: Vec<FinisherVector>,
    cryptonight: Vec<CryptoNightVector>,
}

fn load() -> TestVectors {
    let file = File::open("tests/test_vectors.json").expect("Failed to open test_vectors.json");
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).expect("Failed to parse JSON")
}

/// Single-block SHA-256 padding; inputs must be shorter than 56 bytes.
fn pad_one_block(msg: &[u8]) -> [u8; 64] {
    assert!(msg.len() < 56);
    let mut block = [0u8; 64];
    block[..msg.len()].copy_from_slice(msg);
    block[msg.len()] = 0x80;
    block[56..].copy_from_slice(&((msg.len() as u64) * 8).to_be_bytes());
    block
}

#[test]
fn test_sha256_vectors() {
    let data = load();
    println!("\n=== SHA-256 ===");
    for vector in data.sha256 {
        let block = pad_one_block(vector.input.as_bytes());
        for kind in LaneBackendKind::ALL {
            let Ok(digests) = digest_blocks_with(kind, &[block]) else {
                continue;
            };
            assert_eq!(
                hex::encode(digests[0]),
                vector.hash,
                "Vector Mismatched: {} on {kind}",
                vector.name
            );
        }
        assert_eq!(hex::encode(powcore::sha256_block(&block)), vector.hash);
        println!("✅ {:<16} | {}", vector.name, vector.hash);
    }
}

#[test]
fn test_finisher_vectors() {
    let data = load();
    println!("\n=== Finishing hashes ===");
    for vector in data.finishers {
        let input = hex::decode(&vector.input).unwrap();
        let hash = FINALIZERS[vector.finisher](&input);
        assert_eq!(hex::encode(hash), vector.hash, "Vector Mismatched: {}", vector.name);
        println!("✅ {:<20} | {}", vector.name, vector.hash);
    }
}

#[test]
fn test_cryptonight_vectors() {
    let data = load();
    println!("\n=== CryptoNight ===");
    for vector in data.cryptonight {
        let input = hex::decode(&vector.input).unwrap();
        let variant = match vector.variant {
            0 => Variant::Original,
            1 => Variant::V1,
            _ => Variant::V2,
        };
        let mut hash = [0u8; 32];
        hash_with_variant(&input, variant, &mut hash);
        assert_eq!(hex::encode(hash), vector.hash, "Vector Mismatched: {}", vector.name);
        println!("✅ {:<24} | {}", vector.name, vector.hash);
    }
}
