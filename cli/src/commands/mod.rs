//! CLI Commands
//!
//! All powcore CLI commands organized as separate modules.

pub mod cryptonight;
pub mod features;
pub mod search;
pub mod sha256;

use anyhow::{Context, Result};
use clap::ValueEnum;
use powcore::{LaneBackendKind, Variant};

/// Lane backend choice on the command line.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Backend {
    /// Widest backend the processor supports
    Auto,
    /// One lane, portable
    Scalar,
    /// Two lanes in a u64, portable
    Swar2,
    /// Sixteen lanes in software
    Soft16,
    /// Four lanes, SSE2
    Sse2,
    /// Eight lanes, AVX2
    Avx2,
}

impl Backend {
    /// Resolve `Auto` against the detected features.
    pub fn resolve(self) -> LaneBackendKind {
        match self {
            Self::Auto => powcore::best_backend(&powcore::detect_features()),
            Self::Scalar => LaneBackendKind::Scalar,
            Self::Swar2 => LaneBackendKind::Swar2,
            Self::Soft16 => LaneBackendKind::Soft16,
            Self::Sse2 => LaneBackendKind::Sse2,
            Self::Avx2 => LaneBackendKind::Avx2,
        }
    }
}

/// CryptoNight rule set on the command line.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CnVariant {
    /// Variant 0
    #[value(name = "0")]
    Original,
    /// Variant 1 (Monero v7)
    #[value(name = "1")]
    V1,
    /// Variant 2 (Monero v8)
    #[value(name = "2")]
    V2,
}

impl From<CnVariant> for Variant {
    fn from(v: CnVariant) -> Self {
        match v {
            CnVariant::Original => Self::Original,
            CnVariant::V1 => Self::V1,
            CnVariant::V2 => Self::V2,
        }
    }
}

/// Decode a hex header blob given on the command line.
pub fn parse_blob(hex_blob: &str) -> Result<Vec<u8>> {
    let blob = hex::decode(hex_blob.trim()).context("Blob is not valid hex")?;
    if blob.is_empty() {
        anyhow::bail!("Blob is empty");
    }
    Ok(blob)
}
