//! Finishing Hashes
//!
//! The last CryptoNight step hashes the permuted 200-byte state with one of
//! four SHA-3 candidates, chosen by the low two bits of its first byte.

mod blake256;

pub use blake256::blake256;

use crate::types::{Digest, DIGEST_SIZE};
use digest::consts::U32;
use groestl::Groestl256;
use jh::Jh256;
use skein::Skein512;

fn digest_with<H: digest::Digest>(data: &[u8]) -> Digest {
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&H::digest(data));
    out
}

/// Grøstl-256.
pub fn groestl256(data: &[u8]) -> Digest {
    digest_with::<Groestl256>(data)
}

/// JH-256.
pub fn jh256(data: &[u8]) -> Digest {
    digest_with::<Jh256>(data)
}

/// Skein-512 truncated to a 256-bit output.
pub fn skein512_256(data: &[u8]) -> Digest {
    digest_with::<Skein512<U32>>(data)
}

/// A finishing hash over arbitrary bytes.
pub type Finalizer = fn(&[u8]) -> Digest;

/// Indexed by `state[0] & 3`.
pub const FINALIZERS: [Finalizer; 4] = [blake256, groestl256, jh256, skein512_256];

/// Apply the finisher the state selects.
#[inline]
pub fn finish(state: &[u8; crate::cryptonight::keccak::STATE_SIZE]) -> Digest {
    FINALIZERS[usize::from(state[0] & 3)](state)
}
