//! Portable lane backends.
//!
//! Pure Rust, available on every target:
//! - [`Scalar`]: one lane in a `u32`.
//! - [`Swar2`]: two lanes packed in a `u64` (SIMD within a register).
//! - [`Soft`]: `W` lanes in an array, used to emulate wide units in software.

use crate::kernels::lanes::{check_shift, check_span, ByteOrder, LaneBackend};

// =============================================================================
// SCALAR (1-WAY)
// =============================================================================

/// One lane per group.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl LaneBackend for Scalar {
    type Group = u32;
    const WAY: usize = 1;
    const NAME: &'static str = "Scalar (1-way)";

    #[inline(always)]
    fn broadcast(self, value: u32) -> u32 {
        value
    }

    #[inline(always)]
    fn add(self, x: u32, y: u32) -> u32 {
        x.wrapping_add(y)
    }

    #[inline(always)]
    fn xor(self, x: u32, y: u32) -> u32 {
        x ^ y
    }

    #[inline(always)]
    fn or(self, x: u32, y: u32) -> u32 {
        x | y
    }

    #[inline(always)]
    fn and(self, x: u32, y: u32) -> u32 {
        x & y
    }

    #[inline(always)]
    fn andnot(self, x: u32, y: u32) -> u32 {
        !x & y
    }

    #[inline(always)]
    fn shr<const N: u32>(self, x: u32) -> u32 {
        check_shift::<N>();
        x >> N
    }

    #[inline(always)]
    fn shl<const N: u32>(self, x: u32) -> u32 {
        check_shift::<N>();
        x << N
    }

    #[inline(always)]
    fn rol<const N: u32>(self, x: u32) -> u32 {
        check_shift::<N>();
        x.rotate_left(N)
    }

    #[inline(always)]
    fn load<E: ByteOrder>(self, buf: &[u8], _stride: usize, offset: usize) -> u32 {
        crate::kernels::lanes::read_word::<E>(buf, offset)
    }

    #[inline(always)]
    fn save<E: ByteOrder>(self, x: u32, buf: &mut [u8], _stride: usize, offset: usize) {
        crate::kernels::lanes::write_word::<E>(buf, offset, x);
    }
}

// =============================================================================
// SWAR (2-WAY PACKED)
// =============================================================================

/// Two lanes packed into one `u64`: lane 0 in the low half, lane 1 in the high half.
#[derive(Debug, Clone, Copy, Default)]
pub struct Swar2;

/// Top bit of each 32-bit lane.
const SWAR_HIGH: u64 = 0x8000_0000_8000_0000;

#[inline(always)]
const fn pack(lo: u32, hi: u32) -> u64 {
    (lo as u64) | ((hi as u64) << 32)
}

#[inline(always)]
#[allow(clippy::cast_possible_truncation)]
const fn unpack(x: u64) -> (u32, u32) {
    (x as u32, (x >> 32) as u32)
}

/// `u32::MAX >> n` replicated into both halves.
#[inline(always)]
const fn lane_mask_shr(n: u32) -> u64 {
    let m = (u32::MAX >> n) as u64;
    m | (m << 32)
}

/// `u32::MAX << n` replicated into both halves.
#[inline(always)]
const fn lane_mask_shl(n: u32) -> u64 {
    let m = (u32::MAX << n) as u64;
    m | (m << 32)
}

impl LaneBackend for Swar2 {
    type Group = u64;
    const WAY: usize = 2;
    const NAME: &'static str = "SWAR (2-way)";

    #[inline(always)]
    fn broadcast(self, value: u32) -> u64 {
        pack(value, value)
    }

    /// Add the low 31 bits of each lane, then fold the top bits back in with
    /// XOR so no carry crosses the lane boundary.
    #[inline(always)]
    fn add(self, x: u64, y: u64) -> u64 {
        ((x & !SWAR_HIGH).wrapping_add(y & !SWAR_HIGH)) ^ ((x ^ y) & SWAR_HIGH)
    }

    #[inline(always)]
    fn xor(self, x: u64, y: u64) -> u64 {
        x ^ y
    }

    #[inline(always)]
    fn or(self, x: u64, y: u64) -> u64 {
        x | y
    }

    #[inline(always)]
    fn and(self, x: u64, y: u64) -> u64 {
        x & y
    }

    #[inline(always)]
    fn andnot(self, x: u64, y: u64) -> u64 {
        !x & y
    }

    #[inline(always)]
    fn shr<const N: u32>(self, x: u64) -> u64 {
        check_shift::<N>();
        (x >> N) & lane_mask_shr(N)
    }

    #[inline(always)]
    fn shl<const N: u32>(self, x: u64) -> u64 {
        check_shift::<N>();
        (x << N) & lane_mask_shl(N)
    }

    #[inline(always)]
    fn rol<const N: u32>(self, x: u64) -> u64 {
        check_shift::<N>();
        let (lo, hi) = unpack(x);
        pack(lo.rotate_left(N), hi.rotate_left(N))
    }

    #[inline(always)]
    fn load<E: ByteOrder>(self, buf: &[u8], stride: usize, offset: usize) -> u64 {
        check_span(buf.len(), Self::WAY, stride, offset);
        pack(
            crate::kernels::lanes::read_word::<E>(buf, offset),
            crate::kernels::lanes::read_word::<E>(buf, offset + stride),
        )
    }

    #[inline(always)]
    fn save<E: ByteOrder>(self, x: u64, buf: &mut [u8], stride: usize, offset: usize) {
        check_span(buf.len(), Self::WAY, stride, offset);
        let (lo, hi) = unpack(x);
        crate::kernels::lanes::write_word::<E>(buf, offset, lo);
        crate::kernels::lanes::write_word::<E>(buf, offset + stride, hi);
    }
}

// =============================================================================
// SOFTWARE N-WAY
// =============================================================================

/// `W` lanes held in an array; every operation is a plain per-lane loop.
///
/// `Soft<16>` stands in for a 512-bit unit on machines without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Soft<const W: usize>;

impl<const W: usize> Soft<W> {
    #[inline(always)]
    fn zip(x: [u32; W], y: [u32; W], f: impl Fn(u32, u32) -> u32) -> [u32; W] {
        core::array::from_fn(|i| f(x[i], y[i]))
    }
}

impl<const W: usize> LaneBackend for Soft<W> {
    type Group = [u32; W];
    const WAY: usize = {
        assert!(W >= 1, "a lane backend needs at least one lane");
        W
    };
    const NAME: &'static str = "Software (N-way)";

    #[inline(always)]
    fn broadcast(self, value: u32) -> [u32; W] {
        [value; W]
    }

    #[inline(always)]
    fn add(self, x: [u32; W], y: [u32; W]) -> [u32; W] {
        Self::zip(x, y, u32::wrapping_add)
    }

    #[inline(always)]
    fn xor(self, x: [u32; W], y: [u32; W]) -> [u32; W] {
        Self::zip(x, y, |a, b| a ^ b)
    }

    #[inline(always)]
    fn or(self, x: [u32; W], y: [u32; W]) -> [u32; W] {
        Self::zip(x, y, |a, b| a | b)
    }

    #[inline(always)]
    fn and(self, x: [u32; W], y: [u32; W]) -> [u32; W] {
        Self::zip(x, y, |a, b| a & b)
    }

    #[inline(always)]
    fn andnot(self, x: [u32; W], y: [u32; W]) -> [u32; W] {
        Self::zip(x, y, |a, b| !a & b)
    }

    #[inline(always)]
    fn shr<const N: u32>(self, x: [u32; W]) -> [u32; W] {
        check_shift::<N>();
        x.map(|v| v >> N)
    }

    #[inline(always)]
    fn shl<const N: u32>(self, x: [u32; W]) -> [u32; W] {
        check_shift::<N>();
        x.map(|v| v << N)
    }

    #[inline(always)]
    fn rol<const N: u32>(self, x: [u32; W]) -> [u32; W] {
        check_shift::<N>();
        x.map(|v| v.rotate_left(N))
    }

    #[inline(always)]
    fn load<E: ByteOrder>(self, buf: &[u8], stride: usize, offset: usize) -> [u32; W] {
        check_span(buf.len(), Self::WAY, stride, offset);
        core::array::from_fn(|i| crate::kernels::lanes::read_word::<E>(buf, offset + i * stride))
    }

    #[inline(always)]
    fn save<E: ByteOrder>(self, x: [u32; W], buf: &mut [u8], stride: usize, offset: usize) {
        check_span(buf.len(), Self::WAY, stride, offset);
        for (i, v) in x.into_iter().enumerate() {
            crate::kernels::lanes::write_word::<E>(buf, offset + i * stride, v);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::lanes::{BigEndian, LittleEndian};

    #[test]
    fn swar_add_does_not_carry_across_lanes() {
        let b = Swar2;
        let x = pack(0xFFFF_FFFF, 0x0000_0001);
        let y = pack(0x0000_0001, 0x7FFF_FFFF);
        assert_eq!(unpack(b.add(x, y)), (0, 0x8000_0000));

        let x = pack(0x8000_0000, 0x8000_0000);
        assert_eq!(unpack(b.add(x, x)), (0, 0));
    }

    #[test]
    fn swar_shifts_stay_in_lane() {
        let b = Swar2;
        let x = pack(0x0000_0001, 0x8000_0000);
        assert_eq!(unpack(b.shl::<1>(x)), (2, 0));
        assert_eq!(unpack(b.shr::<1>(x)), (0, 0x4000_0000));
        assert_eq!(unpack(b.shr::<0>(x)), unpack(x));
        assert_eq!(unpack(b.rol::<1>(x)), (2, 1));
    }

    #[test]
    fn scalar_load_respects_byte_order() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(Scalar.load::<BigEndian>(&buf, 4, 0), 0x0102_0304);
        assert_eq!(Scalar.load::<LittleEndian>(&buf, 4, 0), 0x0403_0201);
    }

    #[test]
    fn soft_lanes_follow_stride() {
        let b = Soft::<4>;
        let mut buf = [0u8; 32];
        b.save::<LittleEndian>([1, 2, 3, 4], &mut buf, 8, 4);
        assert_eq!(&buf[4..8], &1u32.to_le_bytes());
        assert_eq!(&buf[28..32], &4u32.to_le_bytes());
        assert_eq!(b.load::<LittleEndian>(&buf, 8, 4), [1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "lane buffer too small")]
    fn soft_load_checks_span() {
        let _ = Soft::<4>.load::<BigEndian>(&[0u8; 15], 4, 0);
    }
}
