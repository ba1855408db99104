//! Batch Execution
//!
//! Spreads independent work over threads when the `multithread` feature is
//! enabled, serially otherwise:
//! 1. Single-block SHA-256 messages, grouped `way` at a time per backend call.
//! 2. CryptoNight header blobs, one scratchpad per worker.

use crate::cryptonight;
use crate::engine::dispatcher::{self, LaneBackendKind};
use crate::kernels::constants::{BLOCK_SIZE, DIGEST_SIZE};
use crate::kernels::{self, Scalar};
use crate::types::{CpuFeatureError, Digest};

use alloc::vec;
use alloc::vec::Vec;

/// One pre-padded SHA-256 message block.
pub type Block = [u8; BLOCK_SIZE];

// =============================================================================
// MULTIWAY SHA-256
// =============================================================================

/// SHA-256 of every pre-padded single-block message, on the best backend.
pub fn digest_blocks(blocks: &[Block]) -> Vec<Digest> {
    let kind = dispatcher::best_backend(&dispatcher::features());
    digest_blocks_with(kind, blocks).unwrap_or_else(|_| digest_group_scalar(blocks))
}

/// [`digest_blocks`] with an explicit backend.
///
/// Full groups of `way` messages go through `kind`; a trailing partial group
/// is finished on [`Scalar`].
pub fn digest_blocks_with(
    kind: LaneBackendKind,
    blocks: &[Block],
) -> Result<Vec<Digest>, CpuFeatureError> {
    let trunk = dispatcher::get_trunk(kind)?;
    let way = kind.way();

    let groups: Vec<Vec<Digest>> = blocks.process_groups(way, |group| {
        if group.len() < way {
            return digest_group_scalar(group);
        }
        let input: Vec<u8> = group.iter().flatten().copied().collect();
        let mut out = vec![0u8; DIGEST_SIZE * way];
        trunk(&mut out, &input, 1);
        out.chunks_exact(DIGEST_SIZE).map(to_digest).collect()
    });

    Ok(groups.into_iter().flatten().collect())
}

fn digest_group_scalar(group: &[Block]) -> Vec<Digest> {
    group
        .iter()
        .map(|block| {
            let mut out = [0u8; DIGEST_SIZE];
            kernels::process_trunk(Scalar, &mut out, block, 1);
            out
        })
        .collect()
}

fn to_digest(bytes: &[u8]) -> Digest {
    let mut d = [0u8; DIGEST_SIZE];
    d.copy_from_slice(bytes);
    d
}

// =============================================================================
// CRYPTONIGHT
// =============================================================================

/// [`cryptonight::hash_standard`] over many header blobs.
///
/// Each concurrent call owns a 2 MiB scratchpad.
///
/// # Panics
/// Under the same conditions as [`cryptonight::hash_standard`].
pub fn hash_standard_many<B>(blobs: &[B]) -> Vec<Digest>
where
    B: AsRef<[u8]> + Sync,
{
    blobs.process_groups(1, |one| {
        let mut out = [0u8; DIGEST_SIZE];
        cryptonight::hash_standard(one[0].as_ref(), &mut out);
        out
    })
}

// =============================================================================
// INTERNAL HELPERS
// =============================================================================

/// Helper for feature-agnostic group processing
trait GroupProcessor<T> {
    fn process_groups<F, R>(self, group_size: usize, f: F) -> Vec<R>
    where
        F: Fn(&[T]) -> R + Sync + Send,
        R: Send;
}

impl<T: Sync> GroupProcessor<T> for &[T] {
    fn process_groups<F, R>(self, group_size: usize, f: F) -> Vec<R>
    where
        F: Fn(&[T]) -> R + Sync + Send,
        R: Send,
    {
        #[cfg(feature = "multithread")]
        {
            use rayon::prelude::*;
            self.par_chunks(group_size).map(f).collect()
        }
        #[cfg(not(feature = "multithread"))]
        {
            self.chunks(group_size).map(f).collect()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
