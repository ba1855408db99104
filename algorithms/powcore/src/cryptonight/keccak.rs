//! Keccak-1600 sponge in its original (pre-SHA-3) parameterization.
//!
//! Absorbs at rate 136 with the `0x01 .. 0x80` padding and returns the whole
//! 200-byte state rather than a truncated digest.

/// Bytes of Keccak-f\[1600\] state.
pub const STATE_SIZE: usize = 200;

/// Absorption rate in bytes.
pub const RATE: usize = 136;

const LANES: usize = STATE_SIZE / 8;

/// Keccak-f\[1600\] (24 rounds) over a byte-serialized state.
pub fn permute(state: &mut [u8; STATE_SIZE]) {
    let mut lanes = to_lanes(state);
    keccak::f1600(&mut lanes);
    from_lanes(&lanes, state);
}

/// Absorb `input` and return the full 200-byte state.
pub fn keccak1600(input: &[u8]) -> [u8; STATE_SIZE] {
    let mut lanes = [0u64; LANES];

    let mut blocks = input.chunks_exact(RATE);
    for block in &mut blocks {
        absorb(&mut lanes, block);
        keccak::f1600(&mut lanes);
    }

    let rem = blocks.remainder();
    let mut last = [0u8; RATE];
    last[..rem.len()].copy_from_slice(rem);
    last[rem.len()] = 0x01;
    last[RATE - 1] |= 0x80;
    absorb(&mut lanes, &last);
    keccak::f1600(&mut lanes);

    let mut out = [0u8; STATE_SIZE];
    from_lanes(&lanes, &mut out);
    out
}

fn absorb(lanes: &mut [u64; LANES], block: &[u8]) {
    for (lane, word) in lanes.iter_mut().zip(block.chunks_exact(8)) {
        *lane ^= read_u64(word);
    }
}

fn to_lanes(state: &[u8; STATE_SIZE]) -> [u64; LANES] {
    core::array::from_fn(|i| read_u64(&state[8 * i..8 * i + 8]))
}

fn from_lanes(lanes: &[u64; LANES], out: &mut [u8; STATE_SIZE]) {
    for (chunk, lane) in out.chunks_exact_mut(8).zip(lanes) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
}

#[inline]
pub(crate) fn read_u64(bytes: &[u8]) -> u64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(w)
}
