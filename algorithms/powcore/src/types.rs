//! Shared types used across the powcore library.

use core::fmt;
#[cfg(feature = "std")]
use std::error;

// =============================================================================
// DIGESTS
// =============================================================================

/// Size of every digest produced by this crate (SHA-256, CryptoNight, finishers).
pub const DIGEST_SIZE: usize = 32;

/// A 256-bit digest.
pub type Digest = [u8; DIGEST_SIZE];

/// Unified multiway entry signature: `(out, blocks, count)`.
///
/// Every lane backend is instantiated behind this signature so the dispatcher
/// can hand out a plain function pointer after runtime detection.
pub type TrunkFn = fn(&mut [u8], &[u8], usize);

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error for unsupported CPU features.
///
/// Returned by the capability tokens of the hardware backends when the
/// feature detector reports the required instruction set as unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuFeatureError {
    missing: &'static str,
}

impl CpuFeatureError {
    /// Create a new `CpuFeatureError` describing the missing CPU feature.
    pub const fn new(missing: &'static str) -> Self {
        Self { missing }
    }

    /// Name of the feature flag that was not reported.
    pub const fn missing(&self) -> &'static str {
        self.missing
    }
}

impl fmt::Display for CpuFeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU feature '{}' is not available on this processor (or not enabled by the OS)",
            self.missing
        )
    }
}

#[cfg(feature = "std")]
impl error::Error for CpuFeatureError {}

/// Reasons a block header blob is refused by a CryptoNight path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobError {
    /// The blob length is outside the fast path's header range.
    Length {
        /// Actual length in bytes.
        len: usize,
    },
    /// The major version byte does not select the variant the fast path implements.
    MajorVersion {
        /// Actual major version.
        found: u8,
    },
    /// The blob has no major version byte.
    Empty,
    /// The major version is above the highest one the standard path accepts.
    VersionTooHigh {
        /// Actual major version.
        found: u8,
    },
    /// The blob is too short for the variant its major version selects.
    TooShort {
        /// Actual length in bytes.
        len: usize,
        /// Minimum length for the selected variant.
        min: usize,
    },
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { len } => write!(
                f,
                "header blob is {len} bytes, the fast path accepts {}..={}",
                crate::cryptonight::FAST_BLOB_MIN,
                crate::cryptonight::FAST_BLOB_MAX
            ),
            Self::MajorVersion { found } => write!(
                f,
                "major version {found} is not handled by the fast path (expects {})",
                crate::cryptonight::FAST_MAJOR_VERSION
            ),
            Self::Empty => f.write_str("header blob is empty"),
            Self::VersionTooHigh { found } => write!(
                f,
                "major version {found} is above {}",
                crate::cryptonight::MAX_MAJOR_VERSION
            ),
            Self::TooShort { len, min } => {
                write!(f, "header blob is {len} bytes, its variant needs at least {min}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for BlobError {}
