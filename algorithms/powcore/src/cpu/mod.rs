//! CPU Feature Detector
//!
//! Decodes the `cpuid` leaves into a fixed set of named capability flags.
//! Vector extensions are only reported when `XCR0` shows that the operating
//! system saves the matching register file on context switch.

mod cpuid;

#[cfg(target_arch = "x86_64")]
pub use cpuid::NativeCpuid;
pub use cpuid::{CpuidSource, Registers};

use core::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

/// `XCR0` bits 1-2: XMM and YMM state.
const XCR0_AVX_MASK: u64 = 0x6;
/// `XCR0` bits 5-7: opmask, `ZMM_Hi256` and `Hi16_ZMM` state.
const XCR0_AVX512_MASK: u64 = 0xE0;

const LEAF_EXT_MAX: u32 = 0x8000_0000;
const LEAF_EXT_FEATURES: u32 = 0x8000_0001;

// =============================================================================
// FEATURE TABLE
// =============================================================================

macro_rules! feature_table {
    ($($variant:ident => $name:literal,)*) => {
        /// A capability flag reported by the feature detector.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum Feature {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl Feature {
            /// Every flag, in reporting order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Conventional lowercase name (`"sse4.1"`, `"avx512bw"`, ...).
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Look a flag up by its conventional name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

feature_table! {
    Cmov => "cmov",
    Mmx => "mmx",
    Sse => "sse",
    Sse2 => "sse2",
    Sse3 => "sse3",
    Ssse3 => "ssse3",
    Sse41 => "sse4.1",
    Sse42 => "sse4.2",
    Pclmul => "pclmul",
    Cx16 => "cx16",
    Movbe => "movbe",
    Popcnt => "popcnt",
    Aes => "aes",
    Rdrnd => "rdrnd",
    Avx => "avx",
    Fma => "fma",
    F16c => "f16c",
    Xsave => "xsave",
    Lzcnt => "lzcnt",
    Sse4a => "sse4a",
    Prfchw => "prfchw",
    Xop => "xop",
    Fma4 => "fma4",
    Tbm => "tbm",
    Mwaitx => "mwaitx",
    Avx2 => "avx2",
    Fsgsbase => "fsgsbase",
    Sgx => "sgx",
    Bmi => "bmi",
    Hle => "hle",
    Bmi2 => "bmi2",
    Invpcid => "invpcid",
    Rtm => "rtm",
    Rdseed => "rdseed",
    Adx => "adx",
    Smap => "smap",
    Pcommit => "pcommit",
    Clflushopt => "clflushopt",
    Clwb => "clwb",
    Sha => "sha",
    Avx512f => "avx512f",
    Avx512dq => "avx512dq",
    Avx512ifma => "avx512ifma",
    Avx512pf => "avx512pf",
    Avx512er => "avx512er",
    Avx512cd => "avx512cd",
    Avx512bw => "avx512bw",
    Avx512vl => "avx512vl",
    Prefetchwt1 => "prefetchwt1",
    Avx512vbmi => "avx512vbmi",
    Pku => "pku",
    Xsaveopt => "xsaveopt",
    Xsavec => "xsavec",
    Xsaves => "xsaves",
}

static_assertions::const_assert!(Feature::ALL.len() <= 64);

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable snapshot of the detected flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CpuFeatures {
    bits: u64,
}

impl CpuFeatures {
    /// A snapshot with every flag cleared.
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Whether `feature` was reported.
    pub const fn has(&self, feature: Feature) -> bool {
        self.bits & (1_u64 << feature as u32) != 0
    }

    /// Whether the flag called `name` was reported. Unknown names read `false`.
    pub fn has_named(&self, name: &str) -> bool {
        Feature::from_name(name).is_some_and(|f| self.has(f))
    }

    /// Every flag with its value, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        Feature::ALL.iter().map(move |&f| (f.name(), self.has(f)))
    }

    /// Names of the flags that are set.
    pub fn enabled(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter().filter_map(|(name, on)| on.then_some(name))
    }

    /// Owned `name -> bool` mapping for collaborators that want plain strings.
    #[cfg(feature = "std")]
    pub fn into_map(self) -> std::collections::HashMap<String, bool> {
        self.iter().map(|(n, on)| (n.to_owned(), on)).collect()
    }

    const fn with(mut self, feature: Feature, on: bool) -> Self {
        if on {
            self.bits |= 1_u64 << feature as u32;
        }
        self
    }
}

impl fmt::Debug for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.enabled()).finish()
    }
}

// =============================================================================
// DETECTION
// =============================================================================

const fn bit(reg: u32, n: u32) -> bool {
    (reg >> n) & 1 != 0
}

/// Query the executing processor.
///
/// Never fails: on targets without `cpuid`, or when leaf 1 is not exposed,
/// every flag reads `false`.
pub fn detect_features() -> CpuFeatures {
    #[cfg(target_arch = "x86_64")]
    {
        detect_features_with(&NativeCpuid)
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        CpuFeatures::none()
    }
}

/// Decode the flags from an arbitrary [`CpuidSource`].
#[allow(clippy::too_many_lines)]
pub fn detect_features_with<S: CpuidSource + ?Sized>(src: &S) -> CpuFeatures {
    use Feature as F;

    let max_level = src.cpuid(0, 0).eax;
    if max_level < 1 {
        return CpuFeatures::none();
    }

    // Leaf 1
    let l1 = src.cpuid(1, 0);
    let (cx, dx) = (l1.ecx, l1.edx);
    let mut out = CpuFeatures::none()
        .with(F::Cmov, bit(dx, 15))
        .with(F::Mmx, bit(dx, 23))
        .with(F::Sse, bit(dx, 25))
        .with(F::Sse2, bit(dx, 26))
        .with(F::Sse3, bit(cx, 0))
        .with(F::Ssse3, bit(cx, 9))
        .with(F::Sse41, bit(cx, 19))
        .with(F::Sse42, bit(cx, 20))
        .with(F::Pclmul, bit(cx, 1))
        .with(F::Cx16, bit(cx, 13))
        .with(F::Movbe, bit(cx, 22))
        .with(F::Popcnt, bit(cx, 23))
        .with(F::Aes, bit(cx, 25))
        .with(F::Rdrnd, bit(cx, 30));

    // CPUID says what the silicon has; XCR0 says what the OS saves.
    let osxsave = bit(cx, 27);
    let xcr0 = if osxsave { src.xgetbv() } else { 0 };
    let avx_save = osxsave && bit(cx, 28) && (xcr0 & XCR0_AVX_MASK) == XCR0_AVX_MASK;
    let avx512_save = avx_save && (xcr0 & XCR0_AVX512_MASK) == XCR0_AVX512_MASK;

    out = out
        .with(F::Avx, avx_save)
        .with(F::Fma, avx_save && bit(cx, 12))
        .with(F::F16c, avx_save && bit(cx, 29))
        .with(F::Xsave, avx_save && bit(cx, 26));

    // Extended leaf 0x8000_0001
    if src.cpuid(LEAF_EXT_MAX, 0).eax >= LEAF_EXT_FEATURES {
        let cx = src.cpuid(LEAF_EXT_FEATURES, 0).ecx;
        out = out
            .with(F::Lzcnt, bit(cx, 5))
            .with(F::Sse4a, bit(cx, 6))
            .with(F::Prfchw, bit(cx, 8))
            .with(F::Xop, bit(cx, 11) && avx_save)
            .with(F::Fma4, bit(cx, 16) && avx_save)
            .with(F::Tbm, bit(cx, 21))
            .with(F::Mwaitx, bit(cx, 29));
    }

    // Leaf 7, subleaf 0
    if max_level >= 7 {
        let l7 = src.cpuid(7, 0);
        let (bx, cx) = (l7.ebx, l7.ecx);
        out = out
            .with(F::Avx2, avx_save && bit(bx, 5))
            .with(F::Fsgsbase, bit(bx, 0))
            .with(F::Sgx, bit(bx, 2))
            .with(F::Bmi, bit(bx, 3))
            .with(F::Hle, bit(bx, 4))
            .with(F::Bmi2, bit(bx, 8))
            .with(F::Invpcid, bit(bx, 10))
            .with(F::Rtm, bit(bx, 11))
            .with(F::Rdseed, bit(bx, 18))
            .with(F::Adx, bit(bx, 19))
            .with(F::Smap, bit(bx, 20))
            .with(F::Pcommit, bit(bx, 22))
            .with(F::Clflushopt, bit(bx, 23))
            .with(F::Clwb, bit(bx, 24))
            .with(F::Sha, bit(bx, 29))
            .with(F::Avx512f, avx512_save && bit(bx, 16))
            .with(F::Avx512dq, avx512_save && bit(bx, 17))
            .with(F::Avx512ifma, avx512_save && bit(bx, 21))
            .with(F::Avx512pf, avx512_save && bit(bx, 26))
            .with(F::Avx512er, avx512_save && bit(bx, 27))
            .with(F::Avx512cd, avx512_save && bit(bx, 28))
            .with(F::Avx512bw, avx512_save && bit(bx, 30))
            .with(F::Avx512vl, avx512_save && bit(bx, 31))
            .with(F::Prefetchwt1, bit(cx, 0))
            .with(F::Avx512vbmi, avx512_save && bit(cx, 1))
            .with(F::Pku, bit(cx, 4));
    }

    // Leaf 0xD, subleaf 1
    if max_level >= 0xD {
        let ax = src.cpuid(0xD, 1).eax;
        out = out
            .with(F::Xsaveopt, avx_save && bit(ax, 0))
            .with(F::Xsavec, avx_save && bit(ax, 1))
            .with(F::Xsaves, avx_save && bit(ax, 3));
    }

    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        leaf0: u32,
        leaf1: Registers,
        xcr0: u64,
    }

    impl CpuidSource for Fixed {
        fn cpuid(&self, leaf: u32, _subleaf: u32) -> Registers {
            match leaf {
                0 => Registers {
                    eax: self.leaf0,
                    ..Registers::default()
                },
                1 => self.leaf1,
                _ => Registers::default(),
            }
        }

        fn xgetbv(&self) -> u64 {
            self.xcr0
        }
    }

    #[test]
    fn names_round_trip() {
        for &f in Feature::ALL {
            assert_eq!(Feature::from_name(f.name()), Some(f));
        }
        assert_eq!(Feature::from_name("avx1024"), None);
    }

    #[test]
    fn missing_leaf_one_reports_nothing() {
        let src = Fixed {
            leaf0: 0,
            leaf1: Registers {
                eax: 0,
                ebx: 0,
                ecx: u32::MAX,
                edx: u32::MAX,
            },
            xcr0: u64::MAX,
        };
        assert_eq!(detect_features_with(&src).enabled().count(), 0);
    }

    #[test]
    fn avx_requires_os_state() {
        let leaf1 = Registers {
            ecx: (1 << 27) | (1 << 28) | (1 << 25),
            edx: 1 << 26,
            ..Registers::default()
        };
        let no_os = detect_features_with(&Fixed {
            leaf0: 1,
            leaf1,
            xcr0: 0x1,
        });
        assert!(!no_os.has(Feature::Avx));
        assert!(no_os.has(Feature::Aes));
        assert!(no_os.has(Feature::Sse2));

        let with_os = detect_features_with(&Fixed {
            leaf0: 1,
            leaf1,
            xcr0: 0x7,
        });
        assert!(with_os.has(Feature::Avx));
    }

    #[test]
    fn native_detection_is_stable() {
        assert_eq!(detect_features(), detect_features());
    }
}
