#![cfg_attr(not(feature = "std"), no_std)]

//! # powcore
//!
//! Proof-of-work hash primitives for mining software.
//!
//! - A multiway SHA-256 engine written once against a lane-backend
//!   abstraction and instantiated for scalar, SWAR, software-wide, SSE2 and
//!   AVX2 backends.
//! - CryptoNight (variants 0, 1 and 2) with a portable path and an AES-NI
//!   fast path for variant 1 block headers.
//! - A CPU feature detector the dispatcher uses to pick backends at runtime.

//! # Usage
//! ```rust
//! // 1. CryptoNight of a block header blob
//! let digest = powcore::cryptonight(b"This is a test");
//! assert!(powcore::verify_standard(b"This is a test", &digest));
//!
//! // 2. Many single-block SHA-256 messages on the widest backend
//! let mut block = [0u8; 64];
//! block[0] = 0x80;
//! let digests = powcore::digest_blocks(&[block; 10]);
//! assert_eq!(digests.len(), 10);
//!
//! // 3. Capability queries
//! let features = powcore::detect_features();
//! println!("{} via {}", features.has_named("aes"), powcore::active_backend());
//! ```

// =============================================================================
// MODULES
// =============================================================================

extern crate alloc;

pub mod cpu;
pub mod cryptonight;
mod engine;
#[cfg(feature = "std")]
pub mod ffi;
// Lane backends and the SHA-256 kernel, public for benches and tests.
#[doc(hidden)]
pub mod kernels;
mod oneshot;
mod types;

// =============================================================================
// EXPORTS
// =============================================================================

pub use cpu::{detect_features, detect_features_with, CpuFeatures, Feature};
pub use cryptonight::{
    check_fast_blob, check_standard_blob, fast_available, hash_fast, hash_standard,
    hash_with_variant, Variant,
};
pub use engine::dispatcher::{
    best_backend, buffer_sizes, get_trunk, sha256_trunk, LaneBackendKind,
};
pub use engine::parallel::{digest_blocks, digest_blocks_with, hash_standard_many, Block};
pub use oneshot::{check_difficulty, cryptonight, sha256_block, verify_standard};
pub use types::{BlobError, CpuFeatureError, Digest, TrunkFn, DIGEST_SIZE};

/// Returns the name of the lane backend the dispatcher selects on this machine.
#[must_use]
pub fn active_backend() -> &'static str {
    engine::get_active_backend_name()
}
