//! C-API Bindings
//!
//! Exposes powcore to C/C++ via FFI with pointer safety and panic boundaries.

#![allow(unsafe_code)]

use crate::cpu::Feature;
use crate::cryptonight;
use crate::engine::dispatcher;
use crate::engine::parallel;
use crate::types::DIGEST_SIZE;

use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Success.
pub const POWCORE_OK: i32 = 0;
/// A required pointer was null.
pub const POWCORE_ERR_NULL: i32 = -1;
/// A missing CPU feature or an internal panic stopped the call.
pub const POWCORE_ERR_PANIC: i32 = -2;
/// The input was refused (blob rejected by a CryptoNight path, unknown flag name).
pub const POWCORE_ERR_INVALID: i32 = -3;

fn guarded<F: FnOnce()>(f: F) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => POWCORE_OK,
        Err(_) => POWCORE_ERR_PANIC,
    }
}

// =============================================================================
// CRYPTONIGHT
// =============================================================================

/// Portable CryptoNight of a header blob.
///
/// # Safety
/// - `blob_ptr` must be valid for `blob_len` bytes
/// - `output_ptr` must be valid for 32 writable bytes
///
/// # Returns
/// - `0`: Success
/// - `-1`: Null pointer
/// - `-2`: Panic
/// - `-3`: Blob refused (empty, major version above 127, short variant 1 blob)
#[no_mangle]
pub unsafe extern "C" fn powcore_cryptonight_standard(
    blob_ptr: *const u8,
    blob_len: usize,
    output_ptr: *mut u8,
) -> i32 {
    if blob_ptr.is_null() || output_ptr.is_null() {
        return POWCORE_ERR_NULL;
    }

    let blob = slice::from_raw_parts(blob_ptr, blob_len);
    if cryptonight::check_standard_blob(blob).is_err() {
        return POWCORE_ERR_INVALID;
    }

    guarded(|| {
        let mut hash = [0u8; DIGEST_SIZE];
        cryptonight::hash_standard(blob, &mut hash);
        ptr::copy_nonoverlapping(hash.as_ptr(), output_ptr, DIGEST_SIZE);
    })
}

/// AES-NI CryptoNight of a variant 1 header blob (76..=80 bytes, major 7).
///
/// # Safety
/// - `blob_ptr` must be valid for `blob_len` bytes
/// - `output_ptr` must be valid for 32 writable bytes
///
/// # Returns
/// - `0`: Success
/// - `-1`: Null pointer
/// - `-2`: AES-NI unavailable
/// - `-3`: Blob refused by the fast path
#[no_mangle]
pub unsafe extern "C" fn powcore_cryptonight_fast(
    blob_ptr: *const u8,
    blob_len: usize,
    output_ptr: *mut u8,
) -> i32 {
    if blob_ptr.is_null() || output_ptr.is_null() {
        return POWCORE_ERR_NULL;
    }

    let blob = slice::from_raw_parts(blob_ptr, blob_len);
    if cryptonight::check_fast_blob(blob).is_err() {
        return POWCORE_ERR_INVALID;
    }
    if !cryptonight::fast_available() {
        return POWCORE_ERR_PANIC;
    }

    guarded(|| {
        let mut hash = [0u8; DIGEST_SIZE];
        cryptonight::hash_fast(blob, &mut hash);
        ptr::copy_nonoverlapping(hash.as_ptr(), output_ptr, DIGEST_SIZE);
    })
}

// =============================================================================
// MULTIWAY SHA-256
// =============================================================================

/// SHA-256 of `count` independent pre-padded 64-byte blocks.
///
/// Digests are written back to back, 32 bytes each, in input order.
///
/// # Safety
/// - `blocks_ptr` must be valid for `64 * count` bytes
/// - `output_ptr` must be valid for `32 * count` writable bytes
///
/// # Returns
/// - `0`: Success
/// - `-1`: Null pointer
/// - `-2`: Panic
#[no_mangle]
pub unsafe extern "C" fn powcore_sha256_blocks(
    blocks_ptr: *const u8,
    count: usize,
    output_ptr: *mut u8,
) -> i32 {
    if blocks_ptr.is_null() || output_ptr.is_null() {
        return POWCORE_ERR_NULL;
    }

    guarded(|| {
        let blocks = slice::from_raw_parts(blocks_ptr.cast::<parallel::Block>(), count);
        let digests = parallel::digest_blocks(blocks);
        let out = slice::from_raw_parts_mut(output_ptr, DIGEST_SIZE * count);
        for (dst, d) in out.chunks_exact_mut(DIGEST_SIZE).zip(&digests) {
            dst.copy_from_slice(d);
        }
    })
}

// =============================================================================
// CPU FEATURES
// =============================================================================

/// Query one feature flag by its conventional name (`"aes"`, `"sse4.1"`, ...).
///
/// # Safety
/// - `name` must point to a NUL-terminated string
///
/// # Returns
/// - `1`: Present
/// - `0`: Absent
/// - `-1`: Null pointer
/// - `-3`: Unknown flag name
#[no_mangle]
pub unsafe extern "C" fn powcore_has_feature(name: *const c_char) -> i32 {
    if name.is_null() {
        return POWCORE_ERR_NULL;
    }

    let Some(feature) = CStr::from_ptr(name).to_str().ok().and_then(Feature::from_name) else {
        return POWCORE_ERR_INVALID;
    };
    i32::from(dispatcher::features().has(feature))
}

/// Name of the lane backend the dispatcher selects, NUL-terminated.
///
/// The returned pointer is static and must not be freed.
#[no_mangle]
pub extern "C" fn powcore_active_backend() -> *const c_char {
    let name: &'static CStr = match dispatcher::best_backend(&dispatcher::features()) {
        dispatcher::LaneBackendKind::Scalar => c"scalar",
        dispatcher::LaneBackendKind::Swar2 => c"swar2",
        dispatcher::LaneBackendKind::Soft16 => c"soft16",
        dispatcher::LaneBackendKind::Sse2 => c"sse2",
        dispatcher::LaneBackendKind::Avx2 => c"avx2",
    };
    name.as_ptr()
}
