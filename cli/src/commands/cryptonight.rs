//! CryptoNight Command

use super::{parse_blob, CnVariant};
use anyhow::Result;

/// Hash one blob and print the hex digest.
pub fn run(hex_blob: &str, variant: Option<CnVariant>, fast: bool) -> Result<()> {
    let blob = parse_blob(hex_blob)?;
    let mut digest = [0u8; powcore::DIGEST_SIZE];

    if fast {
        powcore::check_fast_blob(&blob)?;
        if !powcore::fast_available() {
            anyhow::bail!("AES-NI is not available on this processor");
        }
        powcore::hash_fast(&blob, &mut digest);
    } else if let Some(v) = variant {
        let v = powcore::Variant::from(v);
        if v == powcore::Variant::V1 && blob.len() < powcore::cryptonight::VARIANT1_MIN_BLOB {
            anyhow::bail!(
                "Variant 1 needs at least {} bytes",
                powcore::cryptonight::VARIANT1_MIN_BLOB
            );
        }
        powcore::hash_with_variant(&blob, v, &mut digest);
    } else {
        check_standard(&blob)?;
        powcore::hash_standard(&blob, &mut digest);
    }

    println!("{}", hex::encode(digest));
    Ok(())
}

/// Reject blobs the standard path would panic on.
pub fn check_standard(blob: &[u8]) -> Result<()> {
    powcore::check_standard_blob(blob)?;
    Ok(())
}
