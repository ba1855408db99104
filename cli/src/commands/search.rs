//! Search Command
//!
//! Parallel nonce scan with a difficulty check, one scratchpad per worker.

use super::cryptonight::check_standard;
use super::parse_blob;
use anyhow::{Context, Result};
use powcore::Digest;
use rayon::prelude::*;

/// Nonce position in a block header blob.
const NONCE_OFFSET: usize = 39;

/// One search request.
pub struct Job<'a> {
    pub blob: &'a str,
    pub difficulty: u64,
    pub start: u32,
    pub count: u32,
    pub threads: usize,
    pub fast: bool,
}

/// Scan `job.count` nonces from `job.start` and print the lowest-numbered hit.
pub fn run(job: &Job<'_>) -> Result<()> {
    let blob = parse_blob(job.blob)?;
    if blob.len() < NONCE_OFFSET + 4 {
        anyhow::bail!("Blob too short to carry a nonce ({} bytes)", blob.len());
    }
    check_standard(&blob)?;

    let fast = job.fast && powcore::check_fast_blob(&blob).is_ok() && powcore::fast_available();
    if job.fast && !fast {
        tracing::warn!("fast path refused, falling back to the portable path");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(job.threads)
        .build()
        .context("Failed to start worker threads")?;

    if job.count == 0 {
        anyhow::bail!("Nonce count must be at least 1");
    }
    let last = last_nonce(job.start, job.count);
    tracing::debug!(start = job.start, last, difficulty = job.difficulty, fast, "searching");

    let hit: Option<(u32, Digest)> = pool.install(|| {
        (job.start..=last).into_par_iter().find_map_first(|nonce| {
            let mut candidate = blob.clone();
            candidate[NONCE_OFFSET..NONCE_OFFSET + 4].copy_from_slice(&nonce.to_le_bytes());
            let mut digest = [0u8; powcore::DIGEST_SIZE];
            if fast {
                powcore::hash_fast(&candidate, &mut digest);
            } else {
                powcore::hash_standard(&candidate, &mut digest);
            }
            powcore::check_difficulty(&digest, job.difficulty).then_some((nonce, digest))
        })
    });

    match hit {
        Some((nonce, digest)) => {
            println!("nonce:  {nonce}");
            println!("hash:   {}", hex::encode(digest));
            Ok(())
        }
        None => anyhow::bail!("No nonce in {}..={last} meets difficulty {}", job.start, job.difficulty),
    }
}

/// Last nonce of a scan of `count` nonces from `start`, capped at `u32::MAX`.
fn last_nonce(start: u32, count: u32) -> u32 {
    start.saturating_add(count - 1)
}
