//! Portable software implementation of the AES primitives CryptoNight needs.
//!
//! Only the forward round (`aesenc` semantics) and the truncated key schedule
//! are provided; CryptoNight never decrypts.

// AES S-Box
#[rustfmt::skip]
pub(crate) const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16
];

/// AES reduction polynomial `x^8 + x^4 + x^3 + x + 1` (low byte).
const GF_POLY: u8 = 0x1b;

/// Number of round keys CryptoNight draws from the schedule.
pub const ROUND_KEYS: usize = 10;

/// Round constants for the four schedule steps that produce keys 2..10.
const RCON: [u8; 4] = [0x01, 0x02, 0x04, 0x08];

// =============================================================================
// 128-BIT LINE
// =============================================================================

/// One 16-byte scratchpad line, viewed either as bytes or as two
/// little-endian 64-bit halves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C, align(16))]
pub struct Line {
    /// Raw bytes.
    pub b: [u8; 16],
}

impl Line {
    /// All-zero line.
    pub const fn zero() -> Self {
        Self { b: [0; 16] }
    }

    /// Copy 16 bytes from the start of `src`.
    ///
    /// # Panics
    /// If `src` is shorter than 16 bytes.
    #[inline]
    pub fn from_slice(src: &[u8]) -> Self {
        let mut b = [0u8; 16];
        b.copy_from_slice(&src[..16]);
        Self { b }
    }

    /// Build from low and high halves.
    #[inline]
    pub fn from_u64s(lo: u64, hi: u64) -> Self {
        let mut b = [0u8; 16];
        b[0..8].copy_from_slice(&lo.to_le_bytes());
        b[8..16].copy_from_slice(&hi.to_le_bytes());
        Self { b }
    }

    /// Low 64 bits.
    #[inline]
    pub fn lo(&self) -> u64 {
        let mut w = [0u8; 8];
        w.copy_from_slice(&self.b[0..8]);
        u64::from_le_bytes(w)
    }

    /// High 64 bits.
    #[inline]
    pub fn hi(&self) -> u64 {
        let mut w = [0u8; 8];
        w.copy_from_slice(&self.b[8..16]);
        u64::from_le_bytes(w)
    }

    /// Byte-wise XOR.
    #[inline]
    pub fn xor(&self, other: &Self) -> Self {
        let mut res = Self::zero();
        for (i, res_i) in res.b.iter_mut().enumerate() {
            *res_i = self.b[i] ^ other.b[i];
        }
        res
    }

    /// Two independent wrapping 64-bit additions (`paddq`).
    #[inline]
    pub fn add_epi64(&self, other: &Self) -> Self {
        Self::from_u64s(
            self.lo().wrapping_add(other.lo()),
            self.hi().wrapping_add(other.hi()),
        )
    }
}

// =============================================================================
// ROUND FUNCTION
// =============================================================================

/// GF(2^8) multiplication by 2 (used in `MixColumns`).
/// Branchless: `b >> 7` is 0 or 1, selecting the reduction without a branch.
const fn gf_double(b: u8) -> u8 {
    (b << 1) ^ ((b >> 7) * GF_POLY)
}

/// AES `MixColumns` on a single 4-byte column.
fn mix_column(c: &mut [u8]) {
    let t = [c[0], c[1], c[2], c[3]];
    c[0] = gf_double(t[0] ^ t[1]) ^ t[1] ^ t[2] ^ t[3];
    c[1] = gf_double(t[1] ^ t[2]) ^ t[2] ^ t[3] ^ t[0];
    c[2] = gf_double(t[2] ^ t[3]) ^ t[3] ^ t[0] ^ t[1];
    c[3] = gf_double(t[3] ^ t[0]) ^ t[0] ^ t[1] ^ t[2];
}

/// One full AES encryption round, bit-compatible with `aesenc`.
pub fn aesenc(state: Line, key: &Line) -> Line {
    let mut s = state.b;

    for b in &mut s {
        *b = SBOX[*b as usize];
    }

    // ShiftRows: row r rotates left by r; byte (row, col) lives at 4 * col + row.
    let t = s;
    for col in 0..4 {
        for row in 1..4 {
            s[4 * col + row] = t[4 * ((col + row) % 4) + row];
        }
    }

    for column in s.chunks_exact_mut(4) {
        mix_column(column);
    }

    Line { b: s }.xor(key)
}

/// Ten `aesenc` rounds, one per key, with no initial whitening.
#[inline]
pub fn pseudo_round(block: Line, keys: &[Line; ROUND_KEYS]) -> Line {
    keys.iter().fold(block, |acc, k| aesenc(acc, k))
}

// =============================================================================
// KEY SCHEDULE
// =============================================================================

fn sub_word(w: [u8; 4]) -> [u8; 4] {
    w.map(|b| SBOX[b as usize])
}

/// First ten round keys of the AES-256 expansion of `key` (32 bytes).
///
/// # Panics
/// If `key` is shorter than 32 bytes.
pub fn expand_key(key: &[u8]) -> [Line; ROUND_KEYS] {
    const WORDS: usize = ROUND_KEYS * 4;
    let mut w = [[0u8; 4]; WORDS];
    for (i, word) in w.iter_mut().take(8).enumerate() {
        word.copy_from_slice(&key[4 * i..4 * i + 4]);
    }

    for i in 8..WORDS {
        let mut temp = w[i - 1];
        if i % 8 == 0 {
            temp.rotate_left(1);
            temp = sub_word(temp);
            temp[0] ^= RCON[i / 8 - 1];
        } else if i % 8 == 4 {
            temp = sub_word(temp);
        }
        for (t, p) in temp.iter_mut().zip(w[i - 8]) {
            *t ^= p;
        }
        w[i] = temp;
    }

    core::array::from_fn(|k| {
        let mut b = [0u8; 16];
        for (j, word) in w[4 * k..4 * k + 4].iter().enumerate() {
            b[4 * j..4 * j + 4].copy_from_slice(word);
        }
        Line { b }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(hex_str: &str) -> Line {
        Line::from_slice(&hex::decode(hex_str).unwrap())
    }

    /// FIPS-197 Appendix C.3: AES-256 with key 00..1f encrypting 00112233..ff.
    /// Round 1 output equals `aesenc(input ^ k0, k1)`.
    #[test]
    fn round_matches_fips197_trace() {
        let key = hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
            .unwrap();
        let keys = expand_key(&key);
        let input = line("00112233445566778899aabbccddeeff");
        let after_whitening = input.xor(&keys[0]);
        assert_eq!(after_whitening, line("00102030405060708090a0b0c0d0e0f0"));
        let round1 = aesenc(after_whitening, &keys[1]);
        assert_eq!(round1, line("4f63760643e0aa85efa7213201a4e705"));
    }

    /// FIPS-197 Appendix A.3 key expansion for the same key.
    #[test]
    fn schedule_matches_fips197() {
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let keys = expand_key(&key);
        assert_eq!(keys[0], line("603deb1015ca71be2b73aef0857d7781"));
        assert_eq!(keys[1], line("1f352c073b6108d72d9810a30914dff4"));
        assert_eq!(keys[2], line("9ba354118e6925afa51a8b5f2067fcde"));
        assert_eq!(keys[3], line("a8b09c1a93d194cdbe49846eb75d5b9a"));
        assert_eq!(keys[5], line("b5a9328a2678a647983122292f6c79b3"));
    }

    #[test]
    fn halves_are_little_endian() {
        let l = Line::from_u64s(0x0706_0504_0302_0100, 0x0f0e_0d0c_0b0a_0908);
        assert_eq!(l.b, core::array::from_fn(|i| i as u8));
        assert_eq!(l.add_epi64(&Line::from_u64s(u64::MAX, 1)).lo(), 0x0706_0504_0302_00ff);
    }
}
