//! BLAKE-256 (the SHA-3 finalist, 14 rounds).

use crate::types::Digest;

const BLOCK: usize = 64;

const IV: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f, 0x9b05_688c, 0x1f83_d9ab,
    0x5be0_cd19,
];

/// Digits of pi.
const U: [u32; 16] = [
    0x243f_6a88, 0x85a3_08d3, 0x1319_8a2e, 0x0370_7344, 0xa409_3822, 0x299f_31d0, 0x082e_fa98,
    0xec4e_6c89, 0x4528_21e6, 0x38d0_1377, 0xbe54_66cf, 0x34e9_0c6c, 0xc0ac_29b7, 0xc97c_50dd,
    0x3f84_d5b5, 0xb547_0917,
];

#[rustfmt::skip]
const SIGMA: [[usize; 16]; 10] = [
    [ 0,  1,  2,  3,  4,  5,  6,  7,  8,  9, 10, 11, 12, 13, 14, 15],
    [14, 10,  4,  8,  9, 15, 13,  6,  1, 12,  0,  2, 11,  7,  5,  3],
    [11,  8, 12,  0,  5,  2, 15, 13, 10, 14,  3,  6,  7,  1,  9,  4],
    [ 7,  9,  3,  1, 13, 12, 11, 14,  2,  6,  5, 10,  4,  0, 15,  8],
    [ 9,  0,  5,  7,  2,  4, 10, 15, 14,  1, 11, 12,  6,  8,  3, 13],
    [ 2, 12,  6, 10,  0, 11,  8,  3,  4, 13,  7,  5, 15, 14,  1,  9],
    [12,  5,  1, 15, 14, 13,  4, 10,  0,  7,  6,  3,  9,  2,  8, 11],
    [13, 11,  7, 14, 12,  1,  3,  9,  5,  0, 15,  4,  8,  6,  2, 10],
    [ 6, 15, 14,  9, 11,  3,  0,  8, 12,  2, 13,  7,  1,  4, 10,  5],
    [10,  2,  8,  4,  7,  6,  1,  5, 15, 11,  9, 14,  3, 12, 13,  0],
];

/// Column then diagonal quadruples, paired with the message slot they consume.
const STEPS: [(usize, usize, usize, usize, usize); 8] = [
    (0, 4, 8, 12, 0),
    (1, 5, 9, 13, 2),
    (2, 6, 10, 14, 4),
    (3, 7, 11, 15, 6),
    (0, 5, 10, 15, 8),
    (1, 6, 11, 12, 10),
    (2, 7, 8, 13, 12),
    (3, 4, 9, 14, 14),
];

/// `counter` is the number of message bits covered up to and including this
/// block, or zero for a block holding only padding.
fn compress(h: &mut [u32; 8], block: &[u8], counter: u64) {
    let m: [u32; 16] =
        core::array::from_fn(|i| u32::from_be_bytes([block[4 * i], block[4 * i + 1], block[4 * i + 2], block[4 * i + 3]]));

    #[allow(clippy::cast_possible_truncation)]
    let (t0, t1) = (counter as u32, (counter >> 32) as u32);

    let mut v = [0u32; 16];
    v[..8].copy_from_slice(h);
    v[8..12].copy_from_slice(&U[..4]);
    v[12] = U[4] ^ t0;
    v[13] = U[5] ^ t0;
    v[14] = U[6] ^ t1;
    v[15] = U[7] ^ t1;

    for round in 0..14 {
        let s = &SIGMA[round % 10];
        for &(a, b, c, d, e) in &STEPS {
            v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[e]] ^ U[s[e + 1]]);
            v[d] = (v[d] ^ v[a]).rotate_right(16);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(12);
            v[a] = v[a].wrapping_add(v[b]).wrapping_add(m[s[e + 1]] ^ U[s[e]]);
            v[d] = (v[d] ^ v[a]).rotate_right(8);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(7);
        }
    }

    for (i, hi) in h.iter_mut().enumerate() {
        *hi ^= v[i] ^ v[i + 8];
    }
}

/// BLAKE-256 of `data`.
pub fn blake256(data: &[u8]) -> Digest {
    let mut h = IV;
    let bits = (data.len() as u64).wrapping_mul(8);

    let mut blocks = data.chunks_exact(BLOCK);
    let mut counter = 0u64;
    for block in &mut blocks {
        counter = counter.wrapping_add(512);
        compress(&mut h, block, counter);
    }

    let rem = blocks.remainder();
    let mut buf = [0u8; BLOCK];
    buf[..rem.len()].copy_from_slice(rem);
    buf[rem.len()] = 0x80;

    if rem.len() <= 55 {
        buf[55] |= 0x01;
        buf[56..].copy_from_slice(&bits.to_be_bytes());
        compress(&mut h, &buf, if rem.is_empty() { 0 } else { bits });
    } else {
        compress(&mut h, &buf, bits);
        let mut tail = [0u8; BLOCK];
        tail[55] = 0x01;
        tail[56..].copy_from_slice(&bits.to_be_bytes());
        compress(&mut h, &tail, 0);
    }

    let mut out = [0u8; 32];
    for (chunk, word) in out.chunks_exact_mut(4).zip(h) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_vectors() {
        assert_eq!(
            hex::encode(blake256(b"")),
            "716f6e863f744b9ac22c97ec7b76ea5f5908bc5b2f67c61510bfc4751384ea7a"
        );
        assert_eq!(
            hex::encode(blake256(&[0u8])),
            "0ce8d4ef4dd7cd8d62dfded9d4edb0a774ae6a41929a74da23109e8f11139c87"
        );
        assert_eq!(
            hex::encode(blake256(&[0u8; 72])),
            "d419bad32d504fb7d44d460c42c5593fe544fa4c135dec31e21bd9abdcc22d41"
        );
    }
}
