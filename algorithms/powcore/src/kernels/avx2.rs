//! AVX2 Lane Backend
//!
//! Eight 32-bit lanes in one `__m256i`.

#![allow(clippy::cast_possible_wrap)]

use crate::cpu::{CpuFeatures, Feature};
use crate::kernels::lanes::{check_shift, check_span, read_word, write_word, ByteOrder, LaneBackend};
use crate::types::CpuFeatureError;

use core::arch::x86_64::{
    __m256i, _mm256_add_epi32, _mm256_and_si256, _mm256_andnot_si256, _mm256_loadu_si256,
    _mm256_or_si256, _mm256_set1_epi32, _mm256_sll_epi32, _mm256_srl_epi32, _mm256_storeu_si256,
    _mm256_xor_si256, _mm_cvtsi32_si128,
};

// =============================================================================
// TOKEN
// =============================================================================

/// Capability token for the 8-way AVX2 backend.
#[derive(Debug, Clone, Copy)]
pub struct Avx2 {
    _private: (),
}

impl Avx2 {
    /// Obtain the token if the executing processor (and OS) support AVX2.
    pub fn detect() -> Result<Self, CpuFeatureError> {
        Self::from_features(&crate::cpu::detect_features())
    }

    /// Obtain the token from an existing feature snapshot.
    pub const fn from_features(features: &CpuFeatures) -> Result<Self, CpuFeatureError> {
        if features.has(Feature::Avx2) {
            Ok(Self { _private: () })
        } else {
            Err(CpuFeatureError::new("avx2"))
        }
    }

    /// Obtain the token without checking.
    ///
    /// # Safety
    /// The caller must guarantee the processor and OS support AVX2.
    #[allow(unsafe_code)]
    pub const unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }

    /// Multiway SHA-256 compiled with AVX2 enabled for the whole round loop.
    ///
    /// Same contract as [`crate::kernels::sha256::process_trunk`].
    #[allow(unsafe_code)]
    pub fn process_trunk(self, out: &mut [u8], blocks: &[u8], count: usize) {
        // SAFETY: the token proves AVX2 is available.
        unsafe { trunk_avx2(self, out, blocks, count) }
    }
}

// SAFETY: Requires AVX2. Only reachable through a checked token.
#[target_feature(enable = "avx2")]
#[allow(unsafe_code)]
unsafe fn trunk_avx2(backend: Avx2, out: &mut [u8], blocks: &[u8], count: usize) {
    crate::kernels::sha256::process_trunk(backend, out, blocks, count);
}

// =============================================================================
// OPERATIONS
// =============================================================================

// SAFETY (whole impl): an `Avx2` value only exists once AVX2 support has been
// established, and every memory access goes through bounds-checked arrays.
#[allow(unsafe_code)]
impl LaneBackend for Avx2 {
    type Group = __m256i;
    const WAY: usize = 8;
    const NAME: &'static str = "AVX2 (8-way)";

    #[inline(always)]
    fn broadcast(self, value: u32) -> __m256i {
        unsafe { _mm256_set1_epi32(value as i32) }
    }

    #[inline(always)]
    fn add(self, x: __m256i, y: __m256i) -> __m256i {
        unsafe { _mm256_add_epi32(x, y) }
    }

    #[inline(always)]
    fn xor(self, x: __m256i, y: __m256i) -> __m256i {
        unsafe { _mm256_xor_si256(x, y) }
    }

    #[inline(always)]
    fn or(self, x: __m256i, y: __m256i) -> __m256i {
        unsafe { _mm256_or_si256(x, y) }
    }

    #[inline(always)]
    fn and(self, x: __m256i, y: __m256i) -> __m256i {
        unsafe { _mm256_and_si256(x, y) }
    }

    #[inline(always)]
    fn andnot(self, x: __m256i, y: __m256i) -> __m256i {
        unsafe { _mm256_andnot_si256(x, y) }
    }

    #[inline(always)]
    #[allow(unused_unsafe)]
    fn shr<const N: u32>(self, x: __m256i) -> __m256i {
        check_shift::<N>();
        unsafe { _mm256_srl_epi32(x, _mm_cvtsi32_si128(N as i32)) }
    }

    #[inline(always)]
    #[allow(unused_unsafe)]
    fn shl<const N: u32>(self, x: __m256i) -> __m256i {
        check_shift::<N>();
        unsafe { _mm256_sll_epi32(x, _mm_cvtsi32_si128(N as i32)) }
    }

    #[inline(always)]
    #[allow(unused_unsafe)]
    fn rol<const N: u32>(self, x: __m256i) -> __m256i {
        check_shift::<N>();
        unsafe {
            _mm256_or_si256(
                _mm256_sll_epi32(x, _mm_cvtsi32_si128(N as i32)),
                _mm256_srl_epi32(x, _mm_cvtsi32_si128((32 - N) as i32)),
            )
        }
    }

    #[inline(always)]
    fn load<E: ByteOrder>(self, buf: &[u8], stride: usize, offset: usize) -> __m256i {
        check_span(buf.len(), Self::WAY, stride, offset);
        let lanes: [u32; 8] = core::array::from_fn(|i| read_word::<E>(buf, offset + i * stride));
        // SAFETY: `lanes` is 32 readable bytes; the load is unaligned.
        unsafe { _mm256_loadu_si256(lanes.as_ptr().cast()) }
    }

    #[inline(always)]
    fn save<E: ByteOrder>(self, x: __m256i, buf: &mut [u8], stride: usize, offset: usize) {
        check_span(buf.len(), Self::WAY, stride, offset);
        let mut lanes = [0u32; 8];
        // SAFETY: `lanes` is 32 writable bytes; the store is unaligned.
        unsafe { _mm256_storeu_si256(lanes.as_mut_ptr().cast(), x) };
        for (i, v) in lanes.into_iter().enumerate() {
            write_word::<E>(buf, offset + i * stride, v);
        }
    }
}
