//! Lane Backend Interface
//!
//! A lane backend processes `WAY` independent 32-bit lanes with one operation.
//! The group type is opaque: the only ways in and out of it are `broadcast`,
//! `load` and `save`. Every operation is lane-wise; addition and rotation wrap
//! within a lane and never carry into a neighbour.
//!
//! Lane `i` of a loaded group is read from `offset + i * stride`, and `save`
//! writes it back to the same place.

// =============================================================================
// BYTE ORDER
// =============================================================================

/// Byte order used by [`LaneBackend::load`] and [`LaneBackend::save`].
pub trait ByteOrder {
    /// Decode one lane.
    fn read(bytes: [u8; 4]) -> u32;
    /// Encode one lane.
    fn write(value: u32) -> [u8; 4];
}

/// Most significant byte first (SHA-256 message words and digests).
#[derive(Debug, Clone, Copy)]
pub enum BigEndian {}

/// Least significant byte first.
#[derive(Debug, Clone, Copy)]
pub enum LittleEndian {}

impl ByteOrder for BigEndian {
    #[inline(always)]
    fn read(bytes: [u8; 4]) -> u32 {
        u32::from_be_bytes(bytes)
    }

    #[inline(always)]
    fn write(value: u32) -> [u8; 4] {
        value.to_be_bytes()
    }
}

impl ByteOrder for LittleEndian {
    #[inline(always)]
    fn read(bytes: [u8; 4]) -> u32 {
        u32::from_le_bytes(bytes)
    }

    #[inline(always)]
    fn write(value: u32) -> [u8; 4] {
        value.to_le_bytes()
    }
}

/// Read the 4-byte word at `pos`. Panics when out of range.
#[inline(always)]
pub(crate) fn read_word<E: ByteOrder>(buf: &[u8], pos: usize) -> u32 {
    let mut w = [0u8; 4];
    w.copy_from_slice(&buf[pos..pos + 4]);
    E::read(w)
}

/// Write a 4-byte word at `pos`. Panics when out of range.
#[inline(always)]
pub(crate) fn write_word<E: ByteOrder>(buf: &mut [u8], pos: usize, value: u32) {
    buf[pos..pos + 4].copy_from_slice(&E::write(value));
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Fixed operation set over a group of `WAY` 32-bit lanes.
///
/// Implementors are small `Copy` values. Hardware backends are capability
/// tokens that can only be obtained once the processor has been checked, which
/// is what makes their safe methods sound.
pub trait LaneBackend: Copy {
    /// Opaque group of `WAY` lanes.
    type Group: Copy;

    /// Number of lanes.
    const WAY: usize;

    /// Human-readable backend name.
    const NAME: &'static str;

    /// Number of lanes.
    #[inline(always)]
    fn way(self) -> usize {
        Self::WAY
    }

    /// Replicate `value` into every lane.
    fn broadcast(self, value: u32) -> Self::Group;

    /// Lane-wise `x + y` modulo 2^32.
    fn add(self, x: Self::Group, y: Self::Group) -> Self::Group;

    /// Lane-wise `x + y + z` modulo 2^32.
    #[inline(always)]
    fn add3(self, x: Self::Group, y: Self::Group, z: Self::Group) -> Self::Group {
        self.add(self.add(x, y), z)
    }

    /// Lane-wise `w + x + y + z` modulo 2^32.
    #[inline(always)]
    fn add4(self, w: Self::Group, x: Self::Group, y: Self::Group, z: Self::Group) -> Self::Group {
        self.add(self.add(w, x), self.add(y, z))
    }

    /// Lane-wise `x ^ y`.
    fn xor(self, x: Self::Group, y: Self::Group) -> Self::Group;

    /// Lane-wise `x | y`.
    fn or(self, x: Self::Group, y: Self::Group) -> Self::Group;

    /// Lane-wise `x & y`.
    fn and(self, x: Self::Group, y: Self::Group) -> Self::Group;

    /// Lane-wise `!x & y`.
    fn andnot(self, x: Self::Group, y: Self::Group) -> Self::Group;

    /// Lane-wise logical shift right by `N` (`N < 32`).
    fn shr<const N: u32>(self, x: Self::Group) -> Self::Group;

    /// Lane-wise logical shift left by `N` (`N < 32`).
    fn shl<const N: u32>(self, x: Self::Group) -> Self::Group;

    /// Lane-wise rotate left by `N` (`N < 32`), i.e. `shl<N> | shr<32 - N>`.
    fn rol<const N: u32>(self, x: Self::Group) -> Self::Group;

    /// Read one word per lane: lane `i` from `buf[offset + i * stride..][..4]`.
    fn load<E: ByteOrder>(self, buf: &[u8], stride: usize, offset: usize) -> Self::Group;

    /// Inverse of [`load`](Self::load).
    fn save<E: ByteOrder>(self, x: Self::Group, buf: &mut [u8], stride: usize, offset: usize);
}

/// Compile-time guard for shift and rotate amounts.
#[inline(always)]
pub(crate) const fn check_shift<const N: u32>() {
    const { assert!(N < 32, "lane shift amount must be below 32") };
}

/// Asserts that `buf` can hold lane `way - 1` at `offset + (way - 1) * stride`.
#[inline(always)]
pub(crate) fn check_span(len: usize, way: usize, stride: usize, offset: usize) {
    let last = (way - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(offset))
        .and_then(|v| v.checked_add(4));
    assert!(
        last.is_some_and(|end| end <= len),
        "lane buffer too small: {way} lanes at stride {stride} from offset {offset} in {len} bytes"
    );
}
