//! SSE2 Lane Backend
//!
//! Four 32-bit lanes in one `__m128i`. Shift counts are passed in a register
//! (`psrld`/`pslld` with an XMM count), so a count of 32 yields zero and
//! `rol::<0>` needs no special case.

#![allow(clippy::cast_possible_wrap)]

use crate::cpu::{CpuFeatures, Feature};
use crate::kernels::lanes::{check_shift, check_span, read_word, write_word, ByteOrder, LaneBackend};
use crate::types::CpuFeatureError;

use core::arch::x86_64::{
    __m128i, _mm_add_epi32, _mm_and_si128, _mm_andnot_si128, _mm_cvtsi32_si128, _mm_loadu_si128,
    _mm_or_si128, _mm_set1_epi32, _mm_sll_epi32, _mm_srl_epi32, _mm_storeu_si128, _mm_xor_si128,
};

// =============================================================================
// TOKEN
// =============================================================================

/// Capability token for the 4-way SSE2 backend.
#[derive(Debug, Clone, Copy)]
pub struct Sse2 {
    _private: (),
}

impl Sse2 {
    /// Obtain the token if the executing processor reports SSE2.
    pub fn detect() -> Result<Self, CpuFeatureError> {
        Self::from_features(&crate::cpu::detect_features())
    }

    /// Obtain the token from an existing feature snapshot.
    pub const fn from_features(features: &CpuFeatures) -> Result<Self, CpuFeatureError> {
        if features.has(Feature::Sse2) {
            Ok(Self { _private: () })
        } else {
            Err(CpuFeatureError::new("sse2"))
        }
    }

    /// Obtain the token without checking.
    ///
    /// # Safety
    /// The caller must guarantee the processor supports SSE2.
    #[allow(unsafe_code)]
    pub const unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

// SAFETY (whole impl): an `Sse2` value only exists once SSE2 support has been
// established, and every memory access goes through bounds-checked arrays.
#[allow(unsafe_code)]
#[allow(unused_unsafe)]
impl LaneBackend for Sse2 {
    type Group = __m128i;
    const WAY: usize = 4;
    const NAME: &'static str = "SSE2 (4-way)";

    #[inline(always)]
    fn broadcast(self, value: u32) -> __m128i {
        unsafe { _mm_set1_epi32(value as i32) }
    }

    #[inline(always)]
    fn add(self, x: __m128i, y: __m128i) -> __m128i {
        unsafe { _mm_add_epi32(x, y) }
    }

    #[inline(always)]
    fn xor(self, x: __m128i, y: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(x, y) }
    }

    #[inline(always)]
    fn or(self, x: __m128i, y: __m128i) -> __m128i {
        unsafe { _mm_or_si128(x, y) }
    }

    #[inline(always)]
    fn and(self, x: __m128i, y: __m128i) -> __m128i {
        unsafe { _mm_and_si128(x, y) }
    }

    #[inline(always)]
    fn andnot(self, x: __m128i, y: __m128i) -> __m128i {
        unsafe { _mm_andnot_si128(x, y) }
    }

    #[inline(always)]
    fn shr<const N: u32>(self, x: __m128i) -> __m128i {
        check_shift::<N>();
        unsafe { _mm_srl_epi32(x, _mm_cvtsi32_si128(N as i32)) }
    }

    #[inline(always)]
    fn shl<const N: u32>(self, x: __m128i) -> __m128i {
        check_shift::<N>();
        unsafe { _mm_sll_epi32(x, _mm_cvtsi32_si128(N as i32)) }
    }

    #[inline(always)]
    fn rol<const N: u32>(self, x: __m128i) -> __m128i {
        check_shift::<N>();
        unsafe {
            _mm_or_si128(
                _mm_sll_epi32(x, _mm_cvtsi32_si128(N as i32)),
                _mm_srl_epi32(x, _mm_cvtsi32_si128((32 - N) as i32)),
            )
        }
    }

    #[inline(always)]
    fn load<E: ByteOrder>(self, buf: &[u8], stride: usize, offset: usize) -> __m128i {
        check_span(buf.len(), Self::WAY, stride, offset);
        let lanes: [u32; 4] = core::array::from_fn(|i| read_word::<E>(buf, offset + i * stride));
        // SAFETY: `lanes` is 16 readable bytes; the load is unaligned.
        unsafe { _mm_loadu_si128(lanes.as_ptr().cast()) }
    }

    #[inline(always)]
    fn save<E: ByteOrder>(self, x: __m128i, buf: &mut [u8], stride: usize, offset: usize) {
        check_span(buf.len(), Self::WAY, stride, offset);
        let mut lanes = [0u32; 4];
        // SAFETY: `lanes` is 16 writable bytes; the store is unaligned.
        unsafe { _mm_storeu_si128(lanes.as_mut_ptr().cast(), x) };
        for (i, v) in lanes.into_iter().enumerate() {
            write_word::<E>(buf, offset + i * stride, v);
        }
    }
}
