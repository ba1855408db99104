//! CryptoNight
//!
//! The memory-hard proof-of-work hash used by Monero-family chains. One call
//! runs five phases over call-local buffers:
//!
//! 1. Absorb the header blob with Keccak-1600 into a 200-byte state.
//! 2. Explode: fill a 2 MiB scratchpad by AES-encrypting eight state lines.
//! 3. Mix: 2^19 serially dependent read/AES/multiply/write steps.
//! 4. Implode: fold the scratchpad back into the state with AES.
//! 5. Finish: Keccak-f\[1600\], then one of four SHA-3 candidates.
//!
//! Two paths are provided:
//! - [`hash_standard`]: portable, handles every variant selected by the
//!   header's major version.
//! - [`hash_fast`]: AES-NI, variant 1 headers only (major version 7,
//!   76..=80 bytes). Bit-identical to the standard path for those headers.

#[cfg(target_arch = "x86_64")]
pub mod aesni;
pub mod finalizers;
pub mod keccak;
mod reference;
pub mod soft_aes;

#[cfg(target_arch = "x86_64")]
pub use aesni::AesNiCryptoNight;

use crate::types::{BlobError, CpuFeatureError, Digest};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Scratchpad size in bytes.
pub const MEMORY: usize = 1 << 21;

/// Mixing steps (each one AES step plus one multiply step).
pub const ITERATIONS: usize = 1 << 19;

/// Scratchpad address mask: 16-byte aligned, within [`MEMORY`].
pub(crate) const ADDRESS_MASK: u64 = (MEMORY as u64 - 1) & !0xF;

/// Scratchpad lines of 16 bytes.
pub(crate) const LINES: usize = MEMORY / 16;

/// Shortest header blob the fast path accepts.
pub const FAST_BLOB_MIN: usize = 76;

/// Longest header blob the fast path accepts.
pub const FAST_BLOB_MAX: usize = 80;

/// The only major version the fast path accepts.
pub const FAST_MAJOR_VERSION: u8 = 7;

/// Offset of the 8 blob bytes mixed into the variant-1 tweak (nonce area).
pub(crate) const NONCE_OFFSET: usize = 35;

/// Shortest blob variant 1 can hash.
pub const VARIANT1_MIN_BLOB: usize = NONCE_OFFSET + 8;

/// Highest major version the standard path accepts.
pub const MAX_MAJOR_VERSION: u8 = 127;

// =============================================================================
// VARIANTS
// =============================================================================

/// CryptoNight rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variant {
    /// The original algorithm.
    Original,
    /// Monero v7: nonce-dependent tweaks on scratchpad writes.
    V1,
    /// Monero v8: shuffle-add of neighbouring lines and the division and
    /// square-root step.
    V2,
}

impl Variant {
    /// Variant selected by a header's major version: `max(0, major - 6)`,
    /// with everything from 8 upward following the variant 2 rules.
    pub const fn from_major_version(major: u8) -> Self {
        match major {
            0..=6 => Self::Original,
            7 => Self::V1,
            _ => Self::V2,
        }
    }

    /// Numeric variant as used by Monero (`0`, `1`, `2`).
    pub const fn number(self) -> u8 {
        match self {
            Self::Original => 0,
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Portable CryptoNight with the variant taken from the first blob byte.
///
/// # Panics
/// If `blob` fails [`check_standard_blob`]: it is empty, its major version
/// exceeds 127, or it selects variant 1 and is shorter than 43 bytes.
pub fn hash_standard(blob: &[u8], result: &mut Digest) {
    if let Err(err) = check_standard_blob(blob) {
        panic!("standard path contract violated: {err}");
    }
    hash_with_variant(blob, Variant::from_major_version(blob[0]), result);
}

/// Portable CryptoNight under an explicit rule set.
///
/// # Panics
/// If `variant` is [`Variant::V1`] and `blob` is shorter than 43 bytes.
pub fn hash_with_variant(blob: &[u8], variant: Variant, result: &mut Digest) {
    if variant == Variant::V1 {
        assert!(
            blob.len() >= VARIANT1_MIN_BLOB,
            "variant 1 needs at least {VARIANT1_MIN_BLOB} bytes, got {}",
            blob.len()
        );
    }
    *result = reference::hash(blob, variant);
}

/// Validate a blob against the standard path's preconditions.
///
/// [`hash_standard`] accepts exactly the blobs this returns `Ok` for.
pub fn check_standard_blob(blob: &[u8]) -> Result<(), BlobError> {
    let Some(&major) = blob.first() else {
        return Err(BlobError::Empty);
    };
    if major > MAX_MAJOR_VERSION {
        return Err(BlobError::VersionTooHigh { found: major });
    }
    if Variant::from_major_version(major) == Variant::V1 && blob.len() < VARIANT1_MIN_BLOB {
        return Err(BlobError::TooShort {
            len: blob.len(),
            min: VARIANT1_MIN_BLOB,
        });
    }
    Ok(())
}

/// Validate a blob against the fast path's preconditions.
pub fn check_fast_blob(blob: &[u8]) -> Result<(), BlobError> {
    if !(FAST_BLOB_MIN..=FAST_BLOB_MAX).contains(&blob.len()) {
        return Err(BlobError::Length { len: blob.len() });
    }
    if blob[0] != FAST_MAJOR_VERSION {
        return Err(BlobError::MajorVersion { found: blob[0] });
    }
    Ok(())
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        fn fast_support() -> Result<AesNiCryptoNight, CpuFeatureError> {
            AesNiCryptoNight::from_features(&crate::engine::dispatcher::features())
        }

        fn run_fast(blob: &[u8], result: &mut Digest) -> Result<(), CpuFeatureError> {
            fast_support().map(|token| token.hash(blob, result))
        }
    } else {
        fn fast_support() -> Result<(), CpuFeatureError> {
            Err(CpuFeatureError::new("aes"))
        }

        fn run_fast(_blob: &[u8], _result: &mut Digest) -> Result<(), CpuFeatureError> {
            fast_support()
        }
    }
}

/// True if this processor can run [`hash_fast`].
pub fn fast_available() -> bool {
    let support = fast_support();

    #[cfg(feature = "tracing")]
    match &support {
        Ok(_) => tracing::debug!("aes-ni cryptonight path available"),
        Err(err) => tracing::debug!(%err, "aes-ni cryptonight path refused"),
    }

    support.is_ok()
}

/// AES-NI CryptoNight for variant 1 header blobs.
///
/// Callers select this path only after checking [`fast_available`]; there is
/// no software fallback here.
///
/// # Panics
/// If the blob fails [`check_fast_blob`] or the processor lacks AES-NI.
pub fn hash_fast(blob: &[u8], result: &mut Digest) {
    if let Err(err) = check_fast_blob(blob) {
        panic!("fast path contract violated: {err}");
    }
    if let Err(err) = run_fast(blob, result) {
        panic!("fast path unavailable: {err}");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_follows_major_version() {
        assert_eq!(Variant::from_major_version(0), Variant::Original);
        assert_eq!(Variant::from_major_version(6), Variant::Original);
        assert_eq!(Variant::from_major_version(7), Variant::V1);
        assert_eq!(Variant::from_major_version(8), Variant::V2);
        assert_eq!(Variant::from_major_version(127), Variant::V2);
    }

    #[test]
    fn fast_blob_bounds() {
        let mut blob = [0u8; 80];
        blob[0] = 7;
        assert_eq!(check_fast_blob(&blob[..76]), Ok(()));
        assert_eq!(check_fast_blob(&blob), Ok(()));
        assert_eq!(check_fast_blob(&blob[..75]), Err(BlobError::Length { len: 75 }));
        assert_eq!(check_fast_blob(&[7u8; 81]), Err(BlobError::Length { len: 81 }));
        blob[0] = 8;
        assert_eq!(check_fast_blob(&blob), Err(BlobError::MajorVersion { found: 8 }));
    }

    #[test]
    fn standard_blob_bounds() {
        assert_eq!(check_standard_blob(&[]), Err(BlobError::Empty));
        assert_eq!(check_standard_blob(&[0]), Ok(()));
        assert_eq!(check_standard_blob(&[127]), Ok(()));
        assert_eq!(
            check_standard_blob(&[128, 0, 0]),
            Err(BlobError::VersionTooHigh { found: 128 })
        );
        assert_eq!(
            check_standard_blob(&[7u8; 42]),
            Err(BlobError::TooShort { len: 42, min: 43 })
        );
        assert_eq!(check_standard_blob(&[7u8; 43]), Ok(()));
        assert_eq!(check_standard_blob(&[8u8; 1]), Ok(()));
    }

    #[test]
    fn address_mask_covers_scratchpad() {
        assert_eq!(ADDRESS_MASK, 0x1F_FFF0);
        assert_eq!(LINES, 131_072);
    }

    #[test]
    #[should_panic(expected = "header blob is empty")]
    fn empty_blob_is_rejected() {
        hash_standard(&[], &mut [0u8; 32]);
    }

    #[test]
    #[should_panic(expected = "needs at least 43")]
    fn short_variant1_blob_is_rejected() {
        hash_standard(&[7u8; 42], &mut [0u8; 32]);
    }

    #[test]
    #[should_panic(expected = "fast path contract violated")]
    fn fast_path_rejects_other_versions() {
        let mut blob = [0u8; 76];
        blob[0] = 8;
        hash_fast(&blob, &mut [0u8; 32]);
    }
}
