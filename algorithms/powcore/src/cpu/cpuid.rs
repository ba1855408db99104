//! Capability-query sources.
//!
//! The detector reads the processor through [`CpuidSource`] so that the bit
//! decoding can be exercised against fixed register images.

/// Register image returned by one capability query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    /// `EAX` output.
    pub eax: u32,
    /// `EBX` output.
    pub ebx: u32,
    /// `ECX` output.
    pub ecx: u32,
    /// `EDX` output.
    pub edx: u32,
}

/// Something that can answer `cpuid` and `xgetbv` queries.
pub trait CpuidSource {
    /// Query `leaf` / `subleaf`. Leaves beyond the reported maximum must not be
    /// relied upon; the detector checks the maximum before asking.
    fn cpuid(&self, leaf: u32, subleaf: u32) -> Registers;

    /// Read `XCR0`. Only called when the `OSXSAVE` bit is set.
    fn xgetbv(&self) -> u64;
}

impl<S: CpuidSource + ?Sized> CpuidSource for &S {
    fn cpuid(&self, leaf: u32, subleaf: u32) -> Registers {
        (**self).cpuid(leaf, subleaf)
    }

    fn xgetbv(&self) -> u64 {
        (**self).xgetbv()
    }
}

/// The executing processor.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCpuid;

#[cfg(target_arch = "x86_64")]
impl CpuidSource for NativeCpuid {
    #[allow(unsafe_code)]
    #[allow(unused_unsafe)]
    fn cpuid(&self, leaf: u32, subleaf: u32) -> Registers {
        // SAFETY: CPUID is available on every x86_64 processor and only reads state.
        let r = unsafe { core::arch::x86_64::__cpuid_count(leaf, subleaf) };
        Registers {
            eax: r.eax,
            ebx: r.ebx,
            ecx: r.ecx,
            edx: r.edx,
        }
    }

    #[allow(unsafe_code)]
    fn xgetbv(&self) -> u64 {
        // SAFETY: the detector only asks after observing OSXSAVE, which
        // guarantees XGETBV is enabled by the OS.
        unsafe { core::arch::x86_64::_xgetbv(0) }
    }
}
