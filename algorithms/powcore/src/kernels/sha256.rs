//! Multiway SHA-256 Engine
//!
//! The 64-round compression function written once against [`LaneBackend`].
//! Each lane carries its own independent message; `WAY` compressions share one
//! pass of control flow.
//!
//! Buffer layout for a backend of width `W`:
//! - blocks: `count` chunks of `64 * W` bytes; inside a chunk, lane `i`'s block
//!   starts at `64 * i`. Chunk `c + 1` continues each lane's message.
//! - digests: lane `i`'s 32-byte big-endian digest starts at `32 * i`.
//!
//! Blocks must already carry SHA-256 padding; the engine never pads.

use crate::kernels::constants::{BLOCK_SIZE, DIGEST_SIZE, IV, K};
use crate::kernels::lanes::{BigEndian, LaneBackend};

/// Eight running words `a..h` for `WAY` parallel compressions.
pub type State<B> = [<B as LaneBackend>::Group; 8];

// =============================================================================
// ROUND FUNCTIONS
// =============================================================================

#[inline(always)]
fn big_sigma0<B: LaneBackend>(b: B, x: B::Group) -> B::Group {
    b.xor(b.xor(b.rol::<30>(x), b.rol::<19>(x)), b.rol::<10>(x))
}

#[inline(always)]
fn big_sigma1<B: LaneBackend>(b: B, x: B::Group) -> B::Group {
    b.xor(b.xor(b.rol::<26>(x), b.rol::<21>(x)), b.rol::<7>(x))
}

#[inline(always)]
fn small_sigma0<B: LaneBackend>(b: B, x: B::Group) -> B::Group {
    b.xor(b.xor(b.rol::<25>(x), b.rol::<14>(x)), b.shr::<3>(x))
}

#[inline(always)]
fn small_sigma1<B: LaneBackend>(b: B, x: B::Group) -> B::Group {
    b.xor(b.xor(b.rol::<15>(x), b.rol::<13>(x)), b.shr::<10>(x))
}

#[inline(always)]
fn ch<B: LaneBackend>(b: B, x: B::Group, y: B::Group, z: B::Group) -> B::Group {
    b.xor(z, b.and(x, b.xor(y, z)))
}

#[inline(always)]
fn maj<B: LaneBackend>(b: B, x: B::Group, y: B::Group, z: B::Group) -> B::Group {
    b.or(b.and(x, y), b.and(z, b.or(x, y)))
}

// =============================================================================
// COMPRESSION
// =============================================================================

/// Initial state: the SHA-256 IV in every lane.
#[inline(always)]
pub fn initial_state<B: LaneBackend>(b: B) -> State<B> {
    IV.map(|v| b.broadcast(v))
}

/// Compress one `64 * WAY`-byte chunk into `state`.
///
/// # Panics
/// If `block` is shorter than `64 * WAY` bytes.
#[inline(always)]
pub fn process_block<B: LaneBackend>(b: B, state: &mut State<B>, block: &[u8]) {
    assert!(
        block.len() >= BLOCK_SIZE * B::WAY,
        "block chunk is {} bytes, {} needed for {} lanes",
        block.len(),
        BLOCK_SIZE * B::WAY,
        B::WAY
    );

    let mut w: [B::Group; 16] = core::array::from_fn(|i| b.load::<BigEndian>(block, BLOCK_SIZE, 4 * i));
    let [mut s0, mut s1, mut s2, mut s3, mut s4, mut s5, mut s6, mut s7] = *state;

    for (i, &k) in K.iter().enumerate() {
        if i >= 16 {
            // w[i] = sigma1(w[i-2]) + w[i-7] + sigma0(w[i-15]) + w[i-16]
            w[i & 15] = b.add4(
                small_sigma1(b, w[(i - 2) & 15]),
                w[(i - 7) & 15],
                small_sigma0(b, w[(i - 15) & 15]),
                w[i & 15],
            );
        }

        let t1 = b.add4(
            s7,
            big_sigma1(b, s4),
            ch(b, s4, s5, s6),
            b.add(b.broadcast(k), w[i & 15]),
        );
        let t2 = b.add(big_sigma0(b, s0), maj(b, s0, s1, s2));

        s7 = s6;
        s6 = s5;
        s5 = s4;
        s4 = b.add(s3, t1);
        s3 = s2;
        s2 = s1;
        s1 = s0;
        s0 = b.add(t1, t2);
    }

    let mixed = [s0, s1, s2, s3, s4, s5, s6, s7];
    for (acc, v) in state.iter_mut().zip(mixed) {
        *acc = b.add(*acc, v);
    }
}

/// Serialize `state` as `WAY` big-endian digests packed at 32-byte stride.
#[inline(always)]
pub fn write_digests<B: LaneBackend>(b: B, state: &State<B>, out: &mut [u8]) {
    for (i, &word) in state.iter().enumerate() {
        b.save::<BigEndian>(word, out, DIGEST_SIZE, 4 * i);
    }
}

/// Hash `count` chained chunks per lane from the IV and write `WAY` digests.
///
/// A `count` of zero writes the IV itself into every lane.
///
/// # Panics
/// If `blocks` is shorter than `64 * WAY * count` bytes or `out` is shorter
/// than `32 * WAY` bytes.
#[inline(always)]
pub fn process_trunk<B: LaneBackend>(b: B, out: &mut [u8], blocks: &[u8], count: usize) {
    let chunk = BLOCK_SIZE * B::WAY;
    assert!(
        count.checked_mul(chunk).is_some_and(|n| blocks.len() >= n),
        "{} block bytes supplied, {count} x {chunk} needed",
        blocks.len()
    );
    assert!(
        out.len() >= DIGEST_SIZE * B::WAY,
        "digest buffer is {} bytes, {} needed",
        out.len(),
        DIGEST_SIZE * B::WAY
    );

    let mut state = initial_state(b);
    for block in blocks.chunks_exact(chunk).take(count) {
        process_block(b, &mut state, block);
    }
    write_digests(b, &state, out);
}

// =============================================================================
// TESTS
// =============================================================================
