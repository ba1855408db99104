//! Public API Layer
//!
use crate::cryptonight::hash_standard;
use crate::engine::parallel::Block;
use crate::kernels::{self, Scalar};
use crate::types::{Digest, DIGEST_SIZE};
use subtle::ConstantTimeEq;

// =============================================================================
// HASHING
// =============================================================================

/// CryptoNight of a header blob, variant chosen by its major version.
///
/// # Panics
/// Under the same conditions as [`hash_standard`].
///
/// # Example
/// ```rust
/// let digest = powcore::cryptonight(b"This is a test");
/// assert_eq!(digest.len(), 32);
/// ```
#[must_use]
pub fn cryptonight(blob: &[u8]) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    hash_standard(blob, &mut out);
    out
}

/// SHA-256 of one pre-padded message block on the 1-way backend.
#[must_use]
#[inline]
pub fn sha256_block(block: &Block) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    kernels::process_trunk(Scalar, &mut out, block, 1);
    out
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Recompute the CryptoNight digest of `blob` and compare in constant time.
///
/// # Panics
/// Under the same conditions as [`hash_standard`].
#[must_use]
pub fn verify_standard(blob: &[u8], expected: &Digest) -> bool {
    let computed = cryptonight(blob);
    computed.ct_eq(expected).into()
}

/// Proof-of-work target check.
///
/// Reads `hash` as a 256-bit little-endian integer and accepts when
/// `hash * difficulty` fits in 256 bits. A difficulty of 0 or 1 accepts
/// every hash.
///
/// # Example
/// ```rust
/// assert!(powcore::check_difficulty(&[0xff; 32], 1));
/// assert!(!powcore::check_difficulty(&[0xff; 32], 2));
/// ```
#[must_use]
pub fn check_difficulty(hash: &Digest, difficulty: u64) -> bool {
    let mut carry: u128 = 0;
    for limb in hash.chunks_exact(8) {
        let mut w = [0u8; 8];
        w.copy_from_slice(limb);
        let product = u128::from(u64::from_le_bytes(w)) * u128::from(difficulty) + carry;
        carry = product >> 64;
    }
    carry == 0
}
