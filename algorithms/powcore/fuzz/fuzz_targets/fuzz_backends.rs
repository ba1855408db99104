#![no_main]

use libfuzzer_sys::fuzz_target;
use powcore::{digest_blocks_with, Block, LaneBackendKind};

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // PREPARATION
    // =============================================================================

    // Whole 64-byte blocks only; the tail is dropped.
    let blocks: Vec<Block> = data
        .chunks_exact(64)
        .map(|c| {
            let mut b = [0u8; 64];
            b.copy_from_slice(c);
            b
        })
        .collect();

    // =============================================================================
    // CROSS-BACKEND EQUIVALENCE
    // =============================================================================

    let Ok(reference) = digest_blocks_with(LaneBackendKind::Scalar, &blocks) else {
        return;
    };
    assert_eq!(reference.len(), blocks.len());

    for kind in LaneBackendKind::ALL {
        if let Ok(digests) = digest_blocks_with(kind, &blocks) {
            assert_eq!(digests, reference, "backend {kind} disagrees with scalar");
        }
    }
});
