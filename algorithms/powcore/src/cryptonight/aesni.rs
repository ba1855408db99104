//! AES-NI CryptoNight (variant 1)
//!
//! Explode, mix and implode on `__m128i` registers with hardware AES rounds
//! and a native 64x64->128 multiply. Only header blobs accepted by
//! [`check_fast_blob`](super::check_fast_blob) reach this code.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use super::finalizers::finish;
use super::keccak::{self, keccak1600, read_u64, STATE_SIZE};
use super::{check_fast_blob, ADDRESS_MASK, ITERATIONS, LINES, NONCE_OFFSET};
use crate::cpu::{CpuFeatures, Feature};
use crate::types::{CpuFeatureError, Digest};

use alloc::vec;
use alloc::vec::Vec;

use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_aeskeygenassist_si128, _mm_cvtsi128_si64, _mm_loadu_si128,
    _mm_set_epi64x, _mm_setzero_si128, _mm_shuffle_epi32, _mm_slli_si128, _mm_storeu_si128,
    _mm_unpackhi_epi64, _mm_xor_si128,
};

type RoundKeys = [__m128i; 10];

// =============================================================================
// TOKEN
// =============================================================================

/// Capability token for the AES-NI CryptoNight path.
#[derive(Debug, Clone, Copy)]
pub struct AesNiCryptoNight {
    _private: (),
}

impl AesNiCryptoNight {
    /// Obtain the token if the executing processor reports AES-NI and SSE2.
    pub fn detect() -> Result<Self, CpuFeatureError> {
        Self::from_features(&crate::cpu::detect_features())
    }

    /// Obtain the token from an existing feature snapshot.
    pub const fn from_features(features: &CpuFeatures) -> Result<Self, CpuFeatureError> {
        if !features.has(Feature::Sse2) {
            return Err(CpuFeatureError::new("sse2"));
        }
        if !features.has(Feature::Aes) {
            return Err(CpuFeatureError::new("aes"));
        }
        Ok(Self { _private: () })
    }

    /// Obtain the token without checking.
    ///
    /// # Safety
    /// The caller must guarantee the processor supports AES-NI and SSE2.
    #[allow(unsafe_code)]
    pub const unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }

    /// Hash a variant 1 header blob.
    ///
    /// # Panics
    /// If the blob fails [`check_fast_blob`](super::check_fast_blob).
    #[allow(unsafe_code)]
    pub fn hash(self, blob: &[u8], result: &mut Digest) {
        if let Err(err) = check_fast_blob(blob) {
            panic!("fast path contract violated: {err}");
        }
        // SAFETY: the token proves AES-NI and SSE2; the blob was validated above.
        *result = unsafe { hash_aesni(blob) };
    }
}

// =============================================================================
// REGISTER HELPERS
// =============================================================================

#[inline(always)]
#[allow(unsafe_code)]
fn load(bytes: &[u8]) -> __m128i {
    let mut b = [0u8; 16];
    b.copy_from_slice(&bytes[..16]);
    // SAFETY: `b` is 16 readable bytes; the load is unaligned.
    unsafe { _mm_loadu_si128(b.as_ptr().cast()) }
}

#[inline(always)]
#[allow(unsafe_code)]
fn store(x: __m128i, bytes: &mut [u8]) {
    let mut b = [0u8; 16];
    // SAFETY: `b` is 16 writable bytes; the store is unaligned.
    unsafe { _mm_storeu_si128(b.as_mut_ptr().cast(), x) };
    bytes[..16].copy_from_slice(&b);
}

#[target_feature(enable = "sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn lo(x: __m128i) -> u64 {
    _mm_cvtsi128_si64(x) as u64
}

#[target_feature(enable = "sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn hi(x: __m128i) -> u64 {
    _mm_cvtsi128_si64(_mm_unpackhi_epi64(x, x)) as u64
}

#[target_feature(enable = "sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn pair(lo: u64, hi: u64) -> __m128i {
    _mm_set_epi64x(hi as i64, lo as i64)
}

#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
const fn line_index(addr: u64) -> usize {
    ((addr & ADDRESS_MASK) >> 4) as usize
}

// =============================================================================
// KEY SCHEDULE
// =============================================================================

/// `a1 (a2^a1) (a3^a2^a1) (a4^a3^a2^a1)` over the four 32-bit words.
#[target_feature(enable = "sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn sl_xor(mut x: __m128i) -> __m128i {
    let mut t = _mm_slli_si128::<4>(x);
    x = _mm_xor_si128(x, t);
    t = _mm_slli_si128::<4>(t);
    x = _mm_xor_si128(x, t);
    t = _mm_slli_si128::<4>(t);
    _mm_xor_si128(x, t)
}

#[target_feature(enable = "aes,sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn genkey_sub<const RCON: i32>(xout0: &mut __m128i, xout2: &mut __m128i) {
    let t = _mm_shuffle_epi32::<0xFF>(_mm_aeskeygenassist_si128::<RCON>(*xout2));
    *xout0 = _mm_xor_si128(sl_xor(*xout0), t);
    let t = _mm_shuffle_epi32::<0xAA>(_mm_aeskeygenassist_si128::<0x00>(*xout0));
    *xout2 = _mm_xor_si128(sl_xor(*xout2), t);
}

/// First ten AES-256 round keys of the 32-byte `key`.
#[target_feature(enable = "aes,sse2")]
#[allow(unsafe_code)]
pub(crate) unsafe fn expand_key(key: &[u8]) -> RoundKeys {
    let mut x0 = load(&key[..16]);
    let mut x2 = load(&key[16..32]);
    let mut k = [_mm_setzero_si128(); 10];
    k[0] = x0;
    k[1] = x2;
    genkey_sub::<0x01>(&mut x0, &mut x2);
    k[2] = x0;
    k[3] = x2;
    genkey_sub::<0x02>(&mut x0, &mut x2);
    k[4] = x0;
    k[5] = x2;
    genkey_sub::<0x04>(&mut x0, &mut x2);
    k[6] = x0;
    k[7] = x2;
    genkey_sub::<0x08>(&mut x0, &mut x2);
    k[8] = x0;
    k[9] = x2;
    k
}

#[target_feature(enable = "aes,sse2")]
#[inline]
#[allow(unsafe_code)]
unsafe fn pseudo_round(text: &mut [__m128i; 8], keys: &RoundKeys) {
    for &k in keys {
        for x in text.iter_mut() {
            *x = _mm_aesenc_si128(*x, k);
        }
    }
}

// =============================================================================
// PHASES
// =============================================================================

fn text_of(state: &[u8; STATE_SIZE]) -> [__m128i; 8] {
    core::array::from_fn(|i| load(&state[64 + 16 * i..]))
}

#[target_feature(enable = "aes,sse2")]
#[allow(unsafe_code)]
unsafe fn explode(state: &[u8; STATE_SIZE], pad: &mut [__m128i]) {
    let keys = expand_key(&state[..32]);
    let mut text = text_of(state);
    for chunk in pad.chunks_exact_mut(8) {
        pseudo_round(&mut text, &keys);
        chunk.copy_from_slice(&text);
    }
}

#[target_feature(enable = "aes,sse2")]
#[allow(unsafe_code)]
unsafe fn implode(state: &mut [u8; STATE_SIZE], pad: &[__m128i]) {
    let keys = expand_key(&state[32..64]);
    let mut text = text_of(state);
    for chunk in pad.chunks_exact(8) {
        for (x, &line) in text.iter_mut().zip(chunk) {
            *x = _mm_xor_si128(*x, line);
        }
        pseudo_round(&mut text, &keys);
    }
    for (i, &x) in text.iter().enumerate() {
        store(x, &mut state[64 + 16 * i..]);
    }
}

#[target_feature(enable = "aes,sse2")]
#[allow(unsafe_code, clippy::cast_possible_truncation)]
unsafe fn hash_aesni(blob: &[u8]) -> Digest {
    let mut state = keccak1600(blob);
    let w = |i: usize| read_u64(&state[8 * i..]);
    let tweak = w(24) ^ read_u64(&blob[NONCE_OFFSET..]);

    let mut pad: Vec<__m128i> = vec![_mm_setzero_si128(); LINES];
    explode(&state, &mut pad);

    let mut al = w(0) ^ w(4);
    let mut ah = w(1) ^ w(5);
    let mut bx = pair(w(2) ^ w(6), w(3) ^ w(7));
    let mut idx = al;

    for _ in 0..ITERATIONS {
        let m = line_index(idx);
        let cx = _mm_aesenc_si128(pad[m], pair(al, ah));

        let tmp = _mm_xor_si128(bx, cx);
        let mut vh = hi(tmp);
        let x = (vh >> 24) as u8;
        let index = (((x >> 3) & 6) | (x & 1)) << 1;
        vh ^= ((0x7531_u64 >> index) & 0x3) << 28;
        pad[m] = pair(lo(tmp), vh);

        idx = lo(cx);
        let m = line_index(idx);
        bx = cx;

        let (cl, ch) = (lo(pad[m]), hi(pad[m]));
        let product = u128::from(idx) * u128::from(cl);
        al = al.wrapping_add((product >> 64) as u64);
        ah = ah.wrapping_add(product as u64);
        pad[m] = pair(al, ah ^ tweak);

        al ^= cl;
        ah ^= ch;
        idx = al;
    }

    implode(&mut state, &pad);
    keccak::permute(&mut state);
    finish(&state)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use crate::cryptonight::soft_aes::{self, Line};

    fn token() -> Option<AesNiCryptoNight> {
        AesNiCryptoNight::detect().ok()
    }

    fn to_line(x: __m128i) -> Line {
        let mut l = Line::zero();
        store(x, &mut l.b);
        l
    }

    #[test]
    fn key_schedule_matches_software() {
        if token().is_none() {
            eprintln!("Skipping test: AES-NI not supported");
            return;
        }
        let key: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37) ^ 0x5c).collect();
        let soft = soft_aes::expand_key(&key);
        let hard = unsafe { expand_key(&key) };
        for (i, (s, h)) in soft.iter().zip(hard).enumerate() {
            assert_eq!(*s, to_line(h), "round key {i}");
        }
    }

    #[test]
    fn round_matches_software() {
        if token().is_none() {
            eprintln!("Skipping test: AES-NI not supported");
            return;
        }
        let state = Line::from_slice(&(0u8..16).collect::<Vec<_>>());
        let key = Line::from_slice(&(100u8..116).collect::<Vec<_>>());
        let hard = unsafe { _mm_aesenc_si128(load(&state.b), load(&key.b)) };
        assert_eq!(soft_aes::aesenc(state, &key), to_line(hard));
    }

    #[test]
    fn token_requires_aes() {
        assert!(AesNiCryptoNight::from_features(&CpuFeatures::none()).is_err());
    }
}
