//======================================================================
// src/backends/sse2.rs
// 128-bit engine: four blocks per call, one state word per register.
//======================================================================

use super::simd::{batch, Vector};
use super::soft::keystream_block;
use crate::rounds::{Lane, Rounds};
use crate::state::CipherState;
use crate::variant::Variant;
use cipher::consts::{U4, U64};
use cipher::{Block, BlockSizeUser, ParBlocks, ParBlocksSizeUser, StreamBackend, StreamClosure};
use core::marker::PhantomData;

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// Runs `f` with the SSE2 backend.
///
/// # Safety
/// The CPU must support SSE2.
#[inline]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn inner<V, R, F>(state: &mut CipherState, f: F)
where
    V: Variant,
    R: Rounds,
    F: StreamClosure<BlockSize = U64>,
{
    f.call(&mut Backend::<V, R> { state, _marker: PhantomData });
}

#[derive(Clone, Copy)]
struct Word(__m128i);

impl Lane for Word {
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Word(_mm_add_epi32(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        unsafe { Word(_mm_xor_si128(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn rotl(self, n: u32) -> Self {
        unsafe {
            let left = _mm_sll_epi32(self.0, _mm_cvtsi32_si128(n as i32));
            let right = _mm_srl_epi32(self.0, _mm_cvtsi32_si128(32 - n as i32));
            Word(_mm_or_si128(left, right))
        }
    }
}

impl Vector for Word {
    const LANES: usize = 4;

    #[inline(always)]
    fn splat(word: u32) -> Self {
        unsafe { Word(_mm_set1_epi32(word as i32)) }
    }

    #[inline(always)]
    fn gather(words: &[u32]) -> Self {
        let w = &words[..4];
        unsafe { Word(_mm_set_epi32(w[3] as i32, w[2] as i32, w[1] as i32, w[0] as i32)) }
    }

    #[inline(always)]
    fn scatter(self, out: &mut [u32]) {
        let out = &mut out[..4];
        // SAFETY: `out` holds exactly 16 writable bytes.
        unsafe { _mm_storeu_si128(out.as_mut_ptr().cast(), self.0) }
    }
}

struct Backend<'a, V: Variant, R: Rounds> {
    state: &'a mut CipherState,
    _marker: PhantomData<(V, R)>,
}

impl<V: Variant, R: Rounds> BlockSizeUser for Backend<'_, V, R> {
    type BlockSize = U64;
}

impl<V: Variant, R: Rounds> ParBlocksSizeUser for Backend<'_, V, R> {
    type ParBlocksSize = U4;
}

impl<V: Variant, R: Rounds> StreamBackend for Backend<'_, V, R> {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        keystream_block::<V, R>(self.state, block);
    }

    #[inline(always)]
    fn gen_par_ks_blocks(&mut self, blocks: &mut ParBlocks<Self>) {
        batch::<V, R, Word>(self.state, blocks);
    }
}
