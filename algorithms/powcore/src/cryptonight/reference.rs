//! Portable CryptoNight, parameterized by [`Variant`].
//!
//! Software AES throughout; each loop pass covers one AES step and one
//! multiply step, matching the fast path's iteration count.

use super::finalizers::finish;
use super::keccak::{self, keccak1600, read_u64, STATE_SIZE};
use super::soft_aes::{aesenc, expand_key, pseudo_round, Line};
use super::{Variant, ADDRESS_MASK, ITERATIONS, LINES, NONCE_OFFSET};
use crate::types::Digest;

use alloc::vec;
use alloc::vec::Vec;

/// Byte range of the eight state lines seeding explode and receiving implode.
const TEXT: core::ops::Range<usize> = 64..192;

type Text = [Line; 8];

// =============================================================================
// SCRATCHPAD
// =============================================================================

struct Scratchpad {
    lines: Vec<Line>,
}

impl Scratchpad {
    fn new() -> Self {
        Self {
            lines: vec![Line::zero(); LINES],
        }
    }

    /// Line index for a byte address taken from the low bits of `addr`.
    #[inline(always)]
    #[allow(clippy::cast_possible_truncation)]
    const fn index(addr: u64) -> usize {
        ((addr & ADDRESS_MASK) >> 4) as usize
    }

    /// Shuffle-add of the three lines sharing `j`'s 64-byte group (variant 2).
    #[inline(always)]
    fn shuffle_add(&mut self, j: usize, a: &Line, b0: &Line, b1: &Line) {
        let (i1, i2, i3) = (j ^ 1, j ^ 2, j ^ 3);
        let chunk1 = self.lines[i1];
        let chunk2 = self.lines[i2];
        let chunk3 = self.lines[i3];
        self.lines[i1] = chunk3.add_epi64(b1);
        self.lines[i3] = chunk2.add_epi64(a);
        self.lines[i2] = chunk1.add_epi64(b0);
    }
}

fn text_of(state: &[u8; STATE_SIZE]) -> Text {
    core::array::from_fn(|i| Line::from_slice(&state[TEXT.start + 16 * i..]))
}

fn explode(state: &[u8; STATE_SIZE], pad: &mut Scratchpad) {
    let keys = expand_key(&state[..32]);
    let mut text = text_of(state);
    for chunk in pad.lines.chunks_exact_mut(8) {
        for (t, slot) in text.iter_mut().zip(chunk) {
            *t = pseudo_round(*t, &keys);
            *slot = *t;
        }
    }
}

fn implode(state: &mut [u8; STATE_SIZE], pad: &Scratchpad) {
    let keys = expand_key(&state[32..64]);
    let mut text = text_of(state);
    for chunk in pad.lines.chunks_exact(8) {
        for (t, line) in text.iter_mut().zip(chunk) {
            *t = pseudo_round(t.xor(line), &keys);
        }
    }
    for (dst, t) in state[TEXT].chunks_exact_mut(16).zip(&text) {
        dst.copy_from_slice(&t.b);
    }
}

// =============================================================================
// VARIANT TWEAKS
// =============================================================================

/// Variant 1: flip two bits of byte 11 chosen by that byte's own bits.
#[inline(always)]
fn variant1_byte_tweak(line: &mut Line) {
    const TABLE: u32 = 0x75310;
    let tmp = line.b[11];
    let index = (((tmp >> 3) & 6) | (tmp & 1)) << 1;
    #[allow(clippy::cast_possible_truncation)]
    let flip = ((TABLE >> index) & 0x30) as u8;
    line.b[11] = tmp ^ flip;
}

/// Variant 2 division and square-root step state.
struct IntegerMath {
    division_result: u64,
    sqrt_result: u64,
}

impl IntegerMath {
    /// Mix the previous results into `c2` and derive new ones from `c1`.
    #[inline(always)]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn step(&mut self, c2: &mut Line, c1: &Line) {
        *c2 = Line::from_u64s(
            c2.lo() ^ self.division_result ^ (self.sqrt_result << 32),
            c2.hi(),
        );

        let dividend = c1.hi();
        let divisor = u64::from(
            (c1.lo().wrapping_add(u64::from((self.sqrt_result << 1) as u32)) as u32) | 0x8000_0001,
        );
        self.division_result =
            u64::from((dividend / divisor) as u32).wrapping_add((dividend % divisor) << 32);
        let sqrt_input = c1.lo().wrapping_add(self.division_result);

        let approx = (sqrt_input as f64 + 18_446_744_073_709_551_616.0).sqrt() * 2.0
            - 8_589_934_592.0;
        let mut r = approx as u64;

        // Correct the floating point estimate to the exact integer root.
        let s = r >> 1;
        let b = r & 1;
        let r2 = s.wrapping_mul(s.wrapping_add(b)).wrapping_add(r << 32);
        if r2.wrapping_add(b) > sqrt_input {
            r = r.wrapping_sub(1);
        }
        if r2.wrapping_add(1 << 32) < sqrt_input.wrapping_sub(s) {
            r = r.wrapping_add(1);
        }
        self.sqrt_result = r;
    }
}

// =============================================================================
// HASH
// =============================================================================

/// Full CryptoNight over `blob`. Length preconditions are checked by the caller.
pub(super) fn hash(blob: &[u8], variant: Variant) -> Digest {
    let mut state = keccak1600(blob);
    let mut pad = Scratchpad::new();
    explode(&state, &mut pad);

    let w = |i: usize| read_u64(&state[8 * i..]);

    let tweak = if variant == Variant::V1 {
        w(24) ^ read_u64(&blob[NONCE_OFFSET..])
    } else {
        0
    };

    let mut a = Line::from_u64s(w(0) ^ w(4), w(1) ^ w(5));
    let mut b0 = Line::from_u64s(w(2) ^ w(6), w(3) ^ w(7));
    let mut b1 = Line::from_u64s(w(8) ^ w(10), w(9) ^ w(11));
    let mut math = IntegerMath {
        division_result: w(12),
        sqrt_result: w(13),
    };
    let v2 = variant >= Variant::V2;

    for _ in 0..ITERATIONS {
        // AES step.
        let j = Scratchpad::index(a.lo());
        let c1 = aesenc(pad.lines[j], &a);
        if v2 {
            pad.shuffle_add(j, &a, &b0, &b1);
        }
        let mut written = c1.xor(&b0);
        if variant == Variant::V1 {
            variant1_byte_tweak(&mut written);
        }
        pad.lines[j] = written;

        // Multiply step.
        let j = Scratchpad::index(c1.lo());
        let mut c2 = pad.lines[j];
        if v2 {
            math.step(&mut c2, &c1);
        }

        let product = u128::from(c1.lo()) * u128::from(c2.lo());
        #[allow(clippy::cast_possible_truncation)]
        let mut d = Line::from_u64s((product >> 64) as u64, product as u64);

        if v2 {
            pad.lines[j ^ 1] = pad.lines[j ^ 1].xor(&d);
            d = d.xor(&pad.lines[j ^ 2]);
            pad.shuffle_add(j, &a, &b0, &b1);
        }

        let mut stored = a.add_epi64(&d);
        a = c2.xor(&stored);
        if variant == Variant::V1 {
            stored = Line::from_u64s(stored.lo(), stored.hi() ^ tweak);
        }
        pad.lines[j] = stored;

        if v2 {
            b1 = b0;
        }
        b0 = c1;
    }

    implode(&mut state, &pad);
    keccak::permute(&mut state);
    finish(&state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_tweak_flips_only_bits_4_and_5() {
        for value in 0..=255u8 {
            let mut line = Line::zero();
            line.b[11] = value;
            variant1_byte_tweak(&mut line);
            assert_eq!((line.b[11] ^ value) & !0x30, 0, "byte {value:#04x}");
            assert!(line.b.iter().enumerate().all(|(i, &b)| i == 11 || b == 0));
        }
    }

    #[test]
    fn byte_tweak_table_lookup() {
        // index 0 -> (0x75310 >> 0) & 0x30 = 0x10
        let mut line = Line::zero();
        variant1_byte_tweak(&mut line);
        assert_eq!(line.b[11], 0x10);

        // 0x01 -> index 2 -> (0x75310 >> 2) & 0x30 = 0x00
        let mut line = Line::zero();
        line.b[11] = 0x01;
        variant1_byte_tweak(&mut line);
        assert_eq!(line.b[11], 0x01);
    }

    #[test]
    fn integer_math_on_zero_input() {
        // sqrt(2^64 + 0) * 2 - 2^33 == 0
        let mut math = IntegerMath {
            division_result: 0,
            sqrt_result: 0,
        };
        let mut c2 = Line::zero();
        let c1 = Line::from_u64s(0, 0);
        math.step(&mut c2, &c1);
        assert_eq!(math.division_result, 0);
        assert_eq!(math.sqrt_result, 0);
    }

    #[test]
    fn shuffle_add_touches_only_the_group() {
        let mut pad = Scratchpad::new();
        for (i, line) in pad.lines.iter_mut().take(8).enumerate() {
            *line = Line::from_u64s(i as u64, 100 + i as u64);
        }
        let a = Line::from_u64s(1, 1);
        let b0 = Line::from_u64s(10, 10);
        let b1 = Line::from_u64s(20, 20);
        pad.shuffle_add(5, &a, &b0, &b1);
        // Group 4..8, j = 5: chunk1 = 4, chunk2 = 7, chunk3 = 6.
        assert_eq!(pad.lines[5], Line::from_u64s(5, 105));
        assert_eq!(pad.lines[4], Line::from_u64s(6 + 20, 106 + 20));
        assert_eq!(pad.lines[6], Line::from_u64s(7 + 1, 107 + 1));
        assert_eq!(pad.lines[7], Line::from_u64s(4 + 10, 104 + 10));
        assert_eq!(pad.lines[3], Line::from_u64s(3, 103));
    }
}
