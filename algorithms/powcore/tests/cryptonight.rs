//! CryptoNight Integration Tests
//!
//! - Determinism and variant separation on the portable path
//! - Bit-identical results from the AES-NI path for variant 1 headers
//! - Batch hashing and constant-time verification

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

use powcore::{
    check_fast_blob, check_standard_blob, cryptonight, fast_available, hash_fast, hash_standard, hash_standard_many,
    hash_with_variant, verify_standard, BlobError, Variant,
};

/// A mainnet Monero v7 block header blob and its CryptoNight digest.
const MONERO_HEADER: &str = "0707c3d4a9db055ced477105ab5607d19fa12cf3f538f0e4e724f3bde40ddc05d16a9a068001885b038000b9ba16ee6a563456fc9ec93af68675a295f592992645a54175b375e66e32429e01";
const MONERO_HEADER_HASH: &str = "b1bce924940f6118736b208af75221012cd7fb4602912cc6771938740ebc0400";

/// A 76-byte block header blob with major version 7.
fn header(major: u8, nonce: u32) -> Vec<u8> {
    let mut blob: Vec<u8> = (0..76u8).map(|i| i.wrapping_mul(13).wrapping_add(5)).collect();
    blob[0] = major;
    blob[39..43].copy_from_slice(&nonce.to_le_bytes());
    blob
}

// =============================================================================
// PORTABLE PATH
// =============================================================================

#[test]
fn test_deterministic() {
    let blob = header(7, 1);
    assert_eq!(cryptonight(&blob), cryptonight(&blob));
}

#[test]
fn test_variants_are_separated() {
    let blob = header(7, 1);
    let mut v0 = [0u8; 32];
    let mut v1 = [0u8; 32];
    let mut v2 = [0u8; 32];
    hash_with_variant(&blob, Variant::Original, &mut v0);
    hash_with_variant(&blob, Variant::V1, &mut v1);
    hash_with_variant(&blob, Variant::V2, &mut v2);
    assert_ne!(v0, v1);
    assert_ne!(v1, v2);
    assert_ne!(v0, v2);

    // The standard path picks variant 1 from major version 7.
    let mut standard = [0u8; 32];
    hash_standard(&blob, &mut standard);
    assert_eq!(standard, v1);
}

#[test]
fn test_major_version_selects_variant() {
    let mut blob = header(3, 9);
    let mut standard = [0u8; 32];
    let mut explicit = [0u8; 32];
    hash_standard(&blob, &mut standard);
    hash_with_variant(&blob, Variant::Original, &mut explicit);
    assert_eq!(standard, explicit, "major 3");

    blob[0] = 9;
    hash_standard(&blob, &mut standard);
    hash_with_variant(&blob, Variant::V2, &mut explicit);
    assert_eq!(standard, explicit, "major 9");
}

#[test]
fn test_nonce_changes_hash() {
    assert_ne!(cryptonight(&header(7, 1)), cryptonight(&header(7, 2)));
}

#[test]
#[should_panic(expected = "above 127")]
fn test_major_version_above_127_is_rejected() {
    let _ = cryptonight(&header(128, 0));
}

// =============================================================================
// FAST PATH
// =============================================================================

#[test]
fn test_fast_matches_standard() {
    if !fast_available() {
        println!("Skipping: AES-NI not supported.");
        return;
    }

    for len in [76usize, 78, 80] {
        let mut blob = header(7, len as u32);
        blob.resize(len, 0xa5);

        let mut standard = [0u8; 32];
        let mut fast = [0u8; 32];
        hash_standard(&blob, &mut standard);
        hash_fast(&blob, &mut fast);
        assert_eq!(standard, fast, "Mismatch at blob length {len}");
    }
}

#[test]
fn test_monero_header() {
    let blob = hex::decode(MONERO_HEADER).unwrap();
    assert_eq!(blob.len(), 76);

    let mut standard = [0u8; 32];
    hash_standard(&blob, &mut standard);
    assert_eq!(hex::encode(standard), MONERO_HEADER_HASH);

    if !fast_available() {
        println!("Skipping fast path: AES-NI not supported.");
        return;
    }
    let mut fast = [0u8; 32];
    hash_fast(&blob, &mut fast);
    assert_eq!(fast, standard);
}

#[test]
fn test_standard_blob_validation() {
    assert_eq!(check_standard_blob(&header(7, 0)), Ok(()));
    assert_eq!(check_standard_blob(&[]), Err(BlobError::Empty));
    assert_eq!(
        check_standard_blob(&header(200, 0)),
        Err(BlobError::VersionTooHigh { found: 200 })
    );
    assert_eq!(
        check_standard_blob(&[7u8; 42]),
        Err(BlobError::TooShort { len: 42, min: 43 })
    );
    // Other variants carry no length floor.
    assert_eq!(check_standard_blob(&[8u8; 1]), Ok(()));
}

#[test]
fn test_fast_blob_validation() {
    assert_eq!(check_fast_blob(&header(7, 0)), Ok(()));
    assert_eq!(
        check_fast_blob(&header(8, 0)),
        Err(BlobError::MajorVersion { found: 8 })
    );
    assert_eq!(check_fast_blob(&[7u8; 43]), Err(BlobError::Length { len: 43 }));
    assert_eq!(check_fast_blob(&[]), Err(BlobError::Length { len: 0 }));
}

// =============================================================================
// BATCH & VERIFICATION
// =============================================================================

#[test]
fn test_batch_matches_serial() {
    let blobs: Vec<Vec<u8>> = (0..3).map(|n| header(7, n)).collect();
    let batch = hash_standard_many(&blobs);
    assert_eq!(batch.len(), blobs.len());
    for (blob, digest) in blobs.iter().zip(&batch) {
        assert_eq!(cryptonight(blob), *digest);
    }
}

#[test]
fn test_verify_standard() {
    let blob = header(7, 42);
    let digest = cryptonight(&blob);
    assert!(verify_standard(&blob, &digest));

    let mut wrong = digest;
    wrong[31] ^= 1;
    assert!(!verify_standard(&blob, &wrong));
}
