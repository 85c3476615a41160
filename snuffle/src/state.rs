//======================================================================
// src/state.rs
// The 16-word cipher state and the block counter embedded in it.
//======================================================================

use crate::consts::STATE_WORDS;
use zeroize::Zeroize;

/// Position of the block counter inside a [`CipherState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterLayout {
    /// A single 32-bit counter word.
    Narrow { word: usize },
    /// A 64-bit counter: low half in `word`, high half in `word + 1`.
    Wide { word: usize },
}

impl CounterLayout {
    /// Largest counter value the layout can hold.
    pub const fn max(self) -> u64 {
        match self {
            CounterLayout::Narrow { .. } => u32::MAX as u64,
            CounterLayout::Wide { .. } => u64::MAX,
        }
    }

    /// Counter of the block `offset` positions after `base`, wrapped to the
    /// layout's width.
    #[inline(always)]
    pub const fn offset(self, base: u64, offset: u64) -> u64 {
        match self {
            CounterLayout::Narrow { .. } => (base as u32).wrapping_add(offset as u32) as u64,
            CounterLayout::Wide { .. } => base.wrapping_add(offset),
        }
    }
}

/// Sixteen little-endian words of key, nonce, counter and constants.
///
/// The layout is fixed by the variant that initialised it; this type only
/// knows how to move words and counters around.
#[derive(Clone, Zeroize)]
pub struct CipherState {
    pub(crate) words: [u32; STATE_WORDS],
}

impl CipherState {
    pub(crate) const fn new() -> Self {
        Self { words: [0; STATE_WORDS] }
    }

    #[inline(always)]
    pub(crate) fn counter(&self, layout: CounterLayout) -> u64 {
        match layout {
            CounterLayout::Narrow { word } => u64::from(self.words[word]),
            CounterLayout::Wide { word } => {
                u64::from(self.words[word]) | (u64::from(self.words[word + 1]) << 32)
            }
        }
    }

    /// Stores `value` truncated to the layout's width.
    #[inline(always)]
    pub(crate) fn set_counter(&mut self, layout: CounterLayout, value: u64) {
        match layout {
            CounterLayout::Narrow { word } => self.words[word] = value as u32,
            CounterLayout::Wide { word } => {
                self.words[word] = value as u32;
                self.words[word + 1] = (value >> 32) as u32;
            }
        }
    }

    #[inline(always)]
    pub(crate) fn advance(&mut self, layout: CounterLayout, blocks: u64) {
        let next = layout.offset(self.counter(layout), blocks);
        self.set_counter(layout, next);
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

/// Fills `words` from `bytes`, four little-endian bytes per word.
#[inline(always)]
pub(crate) fn load_le(words: &mut [u32], bytes: &[u8]) {
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}

/// Writes `words` into `out` as little-endian bytes.
#[inline(always)]
pub(crate) fn store_le(words: &[u32], out: &mut [u8]) {
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
