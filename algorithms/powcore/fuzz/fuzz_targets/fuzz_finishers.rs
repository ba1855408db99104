#![no_main]

use libfuzzer_sys::fuzz_target;
use powcore::cryptonight::finalizers::FINALIZERS;
use powcore::cryptonight::keccak::keccak1600;
use powcore::{check_difficulty, check_fast_blob, check_standard_blob, BlobError};

fuzz_target!(|data: &[u8]| {
    // =============================================================================
    // FINISHING HASHES
    // =============================================================================

    let state = keccak1600(data);
    assert_eq!(state, keccak1600(data), "absorb not deterministic");

    for (i, finish) in FINALIZERS.iter().enumerate() {
        assert_eq!(finish(data), finish(data), "finisher {i} not deterministic");
    }

    // =============================================================================
    // DIFFICULTY
    // =============================================================================

    if data.len() >= 40 {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&data[..32]);
        let mut d = [0u8; 8];
        d.copy_from_slice(&data[32..40]);
        let difficulty = u64::from_le_bytes(d);

        // Monotone: passing a difficulty implies passing every smaller one.
        if check_difficulty(&hash, difficulty) {
            assert!(check_difficulty(&hash, difficulty / 2));
        }
        assert!(check_difficulty(&hash, 1));
    }

    // =============================================================================
    // FAST PATH ADMISSION
    // =============================================================================

    match check_fast_blob(data) {
        Ok(()) => assert!((76..=80).contains(&data.len()) && data[0] == 7),
        Err(BlobError::Length { len }) => assert_eq!(len, data.len()),
        Err(BlobError::MajorVersion { found }) => assert_ne!(found, 7),
        Err(other) => panic!("fast path returned {other:?}"),
    }

    // A blob the fast path admits is always admitted by the standard path.
    match check_standard_blob(data) {
        Ok(()) => assert!(data[0] <= 127 && (data[0] != 7 || data.len() >= 43)),
        Err(BlobError::Empty) => assert!(data.is_empty()),
        Err(BlobError::VersionTooHigh { found }) => assert!(found > 127),
        Err(BlobError::TooShort { len, min }) => assert!(len < min && data[0] == 7),
        Err(other) => panic!("standard path returned {other:?}"),
    }
    if check_fast_blob(data).is_ok() {
        assert_eq!(check_standard_blob(data), Ok(()));
    }
});
