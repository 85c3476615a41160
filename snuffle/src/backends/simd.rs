//======================================================================
// src/backends/simd.rs
// Lane-parallel keystream generation shared by the SSE2 and AVX2 engines.
//======================================================================

use crate::consts::STATE_WORDS;
use crate::rounds::{permute, Lane, Rounds};
use crate::state::{CipherState, CounterLayout};
use crate::variant::Variant;
use cipher::consts::U64;
use cipher::generic_array::GenericArray;

/// A SIMD register holding the same state word for `LANES` blocks.
pub(crate) trait Vector: Lane {
    const LANES: usize;

    fn splat(word: u32) -> Self;
    /// Packs the first `LANES` entries of `words`, entry `i` into lane `i`.
    fn gather(words: &[u32]) -> Self;
    /// Unpacks into the first `LANES` entries of `out`.
    fn scatter(self, out: &mut [u32]);
}

const MAX_LANES: usize = 8;

/// Generates `W::LANES` consecutive keystream blocks into `out`, lane `i`
/// using counter `base + i`, and advances the state past them.
#[inline(always)]
pub(crate) fn batch<V, R, W>(state: &mut CipherState, out: &mut [GenericArray<u8, U64>])
where
    V: Variant,
    R: Rounds,
    W: Vector,
{
    let layout = V::COUNTER;
    let base = state.counter(layout);
    let mut low = [0u32; MAX_LANES];
    let mut high = [0u32; MAX_LANES];
    for (i, (lo, hi)) in low.iter_mut().zip(high.iter_mut()).take(W::LANES).enumerate() {
        let counter = layout.offset(base, i as u64);
        *lo = counter as u32;
        *hi = (counter >> 32) as u32;
    }

    let mut input = [W::splat(0); STATE_WORDS];
    for (v, &word) in input.iter_mut().zip(state.words.iter()) {
        *v = W::splat(word);
    }
    match layout {
        CounterLayout::Narrow { word } => input[word] = W::gather(&low),
        CounterLayout::Wide { word } => {
            input[word] = W::gather(&low);
            input[word + 1] = W::gather(&high);
        }
    }

    let mut x = input;
    permute::<V::Family, R, W>(&mut x);

    let mut words = [[0u32; MAX_LANES]; STATE_WORDS];
    for ((lanes, v), i) in words.iter_mut().zip(x.iter()).zip(input.iter()) {
        v.add(*i).scatter(lanes);
    }
    for (lane, block) in out.iter_mut().enumerate().take(W::LANES) {
        for (chunk, lanes) in block.chunks_exact_mut(4).zip(words.iter()) {
            chunk.copy_from_slice(&lanes[lane].to_le_bytes());
        }
    }

    state.advance(layout, W::LANES as u64);
}
