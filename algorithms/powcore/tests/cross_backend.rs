//! Cross-Backend Consistency Tests
//!
//! Verifies that every lane backend produces IDENTICAL SHA-256 digests, and
//! that those digests match an independent implementation.
//!
//! Coverage:
//! - Single-block messages, one per lane
//! - Chained multi-block messages (`count > 1`)
//! - Batch API with partial trailing groups

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

use powcore::{buffer_sizes, digest_blocks, digest_blocks_with, sha256_trunk, Block, LaneBackendKind};
use sha2::{Digest as _, Sha256};

// =============================================================================
// HELPERS
// =============================================================================

/// SHA-256 padding of `msg` to whole 64-byte blocks.
fn pad(msg: &[u8]) -> Vec<u8> {
    let mut out = msg.to_vec();
    out.push(0x80);
    while out.len() % 64 != 56 {
        out.push(0);
    }
    out.extend_from_slice(&((msg.len() as u64) * 8).to_be_bytes());
    out
}

fn reference(msg: &[u8]) -> [u8; 32] {
    Sha256::digest(msg).into()
}

/// A message of `len` bytes distinct for every lane.
fn lane_message(lane: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + lane * 7 + 1) as u8).collect()
}

fn available() -> Vec<LaneBackendKind> {
    LaneBackendKind::ALL
        .into_iter()
        .filter(|&k| powcore::get_trunk(k).is_ok())
        .collect()
}

// =============================================================================
// SINGLE BLOCK
// =============================================================================

#[test]
fn test_single_block_all_backends() {
    for kind in available() {
        let way = kind.way();
        let (in_len, out_len) = buffer_sizes(kind);
        let mut blocks = Vec::with_capacity(in_len);
        let mut expected = Vec::with_capacity(out_len);
        for lane in 0..way {
            let msg = lane_message(lane, lane % 56);
            blocks.extend_from_slice(&pad(&msg));
            expected.extend_from_slice(&reference(&msg));
        }

        let mut out = vec![0u8; out_len];
        sha256_trunk(kind, &mut out, &blocks, 1).unwrap();
        assert_eq!(out, expected, "Mismatch on backend {kind}");
    }
}

// =============================================================================
// CHAINED BLOCKS
// =============================================================================

#[test]
fn test_chained_blocks_all_backends() {
    // 150 bytes pads to 3 blocks for every lane.
    const LEN: usize = 150;
    const COUNT: usize = 3;

    for kind in available() {
        let way = kind.way();
        let padded: Vec<Vec<u8>> = (0..way).map(|l| pad(&lane_message(l, LEN))).collect();
        assert!(padded.iter().all(|p| p.len() == 64 * COUNT));

        // Chunk c holds block c of every lane, lane-major.
        let mut blocks = Vec::new();
        for c in 0..COUNT {
            for p in &padded {
                blocks.extend_from_slice(&p[64 * c..64 * (c + 1)]);
            }
        }

        let mut out = vec![0u8; 32 * way];
        sha256_trunk(kind, &mut out, &blocks, COUNT).unwrap();
        for lane in 0..way {
            assert_eq!(
                out[32 * lane..32 * (lane + 1)],
                reference(&lane_message(lane, LEN)),
                "Mismatch on backend {kind}, lane {lane}"
            );
        }
    }
}

// =============================================================================
// BATCH API
// =============================================================================

#[test]
fn test_batch_partial_groups() {
    // 37 is not a multiple of any way count above 1.
    let blocks: Vec<Block> = (0..37)
        .map(|i| {
            let mut b = [0u8; 64];
            b.copy_from_slice(&pad(&lane_message(i, i)));
            b
        })
        .collect();
    let expected: Vec<[u8; 32]> = (0..37).map(|i| reference(&lane_message(i, i))).collect();

    assert_eq!(digest_blocks(&blocks), expected, "best backend");
    for kind in available() {
        assert_eq!(digest_blocks_with(kind, &blocks).unwrap(), expected, "{kind}");
    }
}

#[test]
fn test_batch_empty() {
    assert!(digest_blocks(&[]).is_empty());
}

#[test]
fn test_unsupported_backend_is_an_error() {
    for kind in LaneBackendKind::ALL {
        let supported = kind.is_supported(&powcore::detect_features());
        assert_eq!(powcore::get_trunk(kind).is_ok(), supported, "{kind}");
        if !supported {
            let err = digest_blocks_with(kind, &[[0u8; 64]]).unwrap_err();
            assert_eq!(Some(err.missing()), kind.required_feature().map(|f| f.name()));
        }
    }
}
