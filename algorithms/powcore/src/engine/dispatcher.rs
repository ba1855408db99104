//! Hardware Dispatcher
//!
//! Picks a lane backend for the multiway SHA-256 engine from the detected CPU
//! features and hands it out as a plain function pointer.

use crate::cpu::{self, CpuFeatures, Feature};
use crate::kernels::constants::{BLOCK_SIZE, DIGEST_SIZE};
use crate::kernels::{self, Scalar, Soft, Swar2};
use crate::types::{CpuFeatureError, TrunkFn};

use core::fmt;

/// Way count of the software backend standing in for a 512-bit unit.
pub const SOFT_WAY: usize = 16;

// =============================================================================
// BACKEND KINDS
// =============================================================================

/// Every lane backend the dispatcher can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneBackendKind {
    /// One lane in a `u32`.
    Scalar,
    /// Two lanes packed in a `u64`.
    Swar2,
    /// Sixteen lanes in a plain array.
    Soft16,
    /// Four lanes in an SSE2 register.
    Sse2,
    /// Eight lanes in an AVX2 register.
    Avx2,
}

impl LaneBackendKind {
    /// All kinds, widest hardware first.
    pub const ALL: [Self; 5] = [Self::Avx2, Self::Sse2, Self::Swar2, Self::Soft16, Self::Scalar];

    /// Lanes per call.
    pub const fn way(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Swar2 => 2,
            Self::Soft16 => SOFT_WAY,
            Self::Sse2 => 4,
            Self::Avx2 => 8,
        }
    }

    /// Short lowercase name, as accepted by [`from_name`](Self::from_name).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Swar2 => "swar2",
            Self::Soft16 => "soft16",
            Self::Sse2 => "sse2",
            Self::Avx2 => "avx2",
        }
    }

    /// Parse a short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// The feature flag the backend needs, if any.
    pub const fn required_feature(self) -> Option<Feature> {
        match self {
            Self::Scalar | Self::Swar2 | Self::Soft16 => None,
            Self::Sse2 => Some(Feature::Sse2),
            Self::Avx2 => Some(Feature::Avx2),
        }
    }

    /// True if `features` allows this backend on the current target.
    pub const fn is_supported(self, features: &CpuFeatures) -> bool {
        match self.required_feature() {
            None => true,
            Some(f) => cfg!(target_arch = "x86_64") && features.has(f),
        }
    }
}

impl fmt::Display for LaneBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Detected CPU features, queried once per process.
#[cfg(feature = "std")]
pub fn features() -> CpuFeatures {
    static FEATURES: std::sync::OnceLock<CpuFeatures> = std::sync::OnceLock::new();
    *FEATURES.get_or_init(cpu::detect_features)
}

/// Detected CPU features.
#[cfg(not(feature = "std"))]
pub fn features() -> CpuFeatures {
    cpu::detect_features()
}

/// Widest supported hardware backend: AVX2, then SSE2, then SWAR.
pub fn best_backend(features: &CpuFeatures) -> LaneBackendKind {
    let kind = [LaneBackendKind::Avx2, LaneBackendKind::Sse2]
        .into_iter()
        .find(|k| k.is_supported(features))
        .unwrap_or(LaneBackendKind::Swar2);

    #[cfg(feature = "tracing")]
    tracing::debug!(backend = kind.name(), way = kind.way(), "selected lane backend");

    kind
}

/// Multiway entry for `kind`, or the missing feature.
pub fn get_trunk(kind: LaneBackendKind) -> Result<TrunkFn, CpuFeatureError> {
    let features = features();
    if let Some(required) = kind.required_feature() {
        if !kind.is_supported(&features) {
            return Err(CpuFeatureError::new(required.name()));
        }
    }

    Ok(match kind {
        LaneBackendKind::Scalar => scalar_trunk,
        LaneBackendKind::Swar2 => swar2_trunk,
        LaneBackendKind::Soft16 => soft16_trunk,
        LaneBackendKind::Sse2 => safe_sse2_wrapper,
        LaneBackendKind::Avx2 => safe_avx2_wrapper,
    })
}

/// Hash `count` chained blocks per lane with the chosen backend.
///
/// Buffer contract as in [`kernels::sha256::process_trunk`]: `blocks` holds at
/// least `64 * way * count` bytes and `out` at least `32 * way`.
pub fn sha256_trunk(
    kind: LaneBackendKind,
    out: &mut [u8],
    blocks: &[u8],
    count: usize,
) -> Result<(), CpuFeatureError> {
    get_trunk(kind).map(|trunk| trunk(out, blocks, count))
}

/// Name of the backend [`best_backend`] picks on this machine.
#[must_use]
pub fn get_active_backend_name() -> &'static str {
    best_backend(&features()).name()
}

/// Bytes of input and output one call of `kind` consumes per chained block.
pub const fn buffer_sizes(kind: LaneBackendKind) -> (usize, usize) {
    (BLOCK_SIZE * kind.way(), DIGEST_SIZE * kind.way())
}

// =============================================================================
// WRAPPERS
// =============================================================================

fn scalar_trunk(out: &mut [u8], blocks: &[u8], count: usize) {
    kernels::process_trunk(Scalar, out, blocks, count);
}

fn swar2_trunk(out: &mut [u8], blocks: &[u8], count: usize) {
    kernels::process_trunk(Swar2, out, blocks, count);
}

fn soft16_trunk(out: &mut [u8], blocks: &[u8], count: usize) {
    kernels::process_trunk(Soft::<SOFT_WAY>, out, blocks, count);
}

/// SSE2 wrapper.
#[inline]
#[allow(unsafe_code)]
#[allow(unused_variables)]
fn safe_sse2_wrapper(out: &mut [u8], blocks: &[u8], count: usize) {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Only reachable through `get_trunk` after CPUID validation (SSE2).
        let backend = unsafe { kernels::Sse2::new_unchecked() };
        kernels::process_trunk(backend, out, blocks, count);
    }
    #[cfg(not(target_arch = "x86_64"))]
    unreachable!("CPUID escape");
}

/// AVX2 wrapper: the whole round loop is compiled with AVX2 enabled.
#[inline]
#[allow(unsafe_code)]
#[allow(unused_variables)]
fn safe_avx2_wrapper(out: &mut [u8], blocks: &[u8], count: usize) {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Only reachable through `get_trunk` after CPUID validation (AVX2 + OS state).
        let backend = unsafe { kernels::Avx2::new_unchecked() };
        backend.process_trunk(out, blocks, count);
    }
    #[cfg(not(target_arch = "x86_64"))]
    unreachable!("CPUID escape");
}

// =============================================================================
// TESTS
// =============================================================================
