//! Kernel Collection
//!
//! Lane backends (portable and x86_64 SIMD) and the multiway SHA-256 engine
//! written once against them.

#[cfg(target_arch = "x86_64")]
pub mod avx2;
pub mod constants;
pub mod lanes;
pub mod portable;
pub mod sha256;
#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2;
pub use lanes::{BigEndian, ByteOrder, LaneBackend, LittleEndian};
pub use portable::{Scalar, Soft, Swar2};
pub use sha256::{process_block, process_trunk};
#[cfg(target_arch = "x86_64")]
pub use sse2::Sse2;
