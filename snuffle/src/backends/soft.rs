//======================================================================
// src/backends/soft.rs
// Portable scalar engine. The vector engines reuse its single-block path.
//======================================================================

use crate::rounds::{block, Rounds};
use crate::state::{store_le, CipherState};
use crate::variant::Variant;
use cipher::consts::{U1, U64};
use cipher::{Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend};
use core::marker::PhantomData;

/// The software (scalar) backend.
pub(crate) struct Backend<'a, V: Variant, R: Rounds> {
    state: &'a mut CipherState,
    _marker: PhantomData<(V, R)>,
}

impl<'a, V: Variant, R: Rounds> Backend<'a, V, R> {
    pub(crate) fn new(state: &'a mut CipherState) -> Self {
        Self { state, _marker: PhantomData }
    }
}

impl<V: Variant, R: Rounds> BlockSizeUser for Backend<'_, V, R> {
    type BlockSize = U64;
}

impl<V: Variant, R: Rounds> ParBlocksSizeUser for Backend<'_, V, R> {
    type ParBlocksSize = U1;
}

impl<V: Variant, R: Rounds> StreamBackend for Backend<'_, V, R> {
    #[inline(always)]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        keystream_block::<V, R>(self.state, block);
    }
}

/// Writes the block at the current counter into `out` and steps the counter.
#[inline(always)]
pub(crate) fn keystream_block<V: Variant, R: Rounds>(state: &mut CipherState, out: &mut [u8]) {
    let words = block::<V::Family, R>(&state.words);
    store_le(&words, out);
    state.advance(V::COUNTER, 1);
}
