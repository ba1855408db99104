//! SHA-256 Command
//!
//! Pads each message into one block and hashes the batch on a lane backend.

use super::Backend;
use anyhow::{Context, Result};
use powcore::Block;

/// Longest message that fits a single padded block.
const MAX_MESSAGE: usize = 55;

fn pad(msg: &[u8]) -> Block {
    let mut block = [0u8; 64];
    block[..msg.len()].copy_from_slice(msg);
    block[msg.len()] = 0x80;
    block[56..].copy_from_slice(&((msg.len() as u64) * 8).to_be_bytes());
    block
}

/// Hash every message and print `digest  message` lines in input order.
pub fn run(messages: &[String], as_hex: bool, backend: Backend) -> Result<()> {
    let kind = backend.resolve();
    tracing::debug!(backend = %kind, way = kind.way(), messages = messages.len(), "sha256 batch");

    let mut blocks = Vec::with_capacity(messages.len());
    for msg in messages {
        let bytes = if as_hex {
            hex::decode(msg).with_context(|| format!("Not valid hex: {msg}"))?
        } else {
            msg.as_bytes().to_vec()
        };
        if bytes.len() > MAX_MESSAGE {
            anyhow::bail!("Message longer than {MAX_MESSAGE} bytes: {msg}");
        }
        blocks.push(pad(&bytes));
    }

    let digests = powcore::digest_blocks_with(kind, &blocks)
        .with_context(|| format!("Backend {kind} is not available"))?;

    for (msg, digest) in messages.iter().zip(digests) {
        println!("{}  {msg}", hex::encode(digest));
    }
    Ok(())
}
