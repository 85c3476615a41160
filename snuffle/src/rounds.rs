//======================================================================
// src/rounds.rs
// Quarter rounds, double rounds and the block function for both the
// ChaCha and Salsa families, written once over a generic word lane.
//======================================================================

use crate::consts::{SHORT_KEY_SIZE, SIGMA16, SIGMA32, STATE_WORDS};
use crate::state::load_le;
use core::fmt::Debug;

/// One column of the state: a scalar `u32` or a vector holding the same
/// word of several blocks.
pub trait Lane: Copy {
    fn add(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
    fn rotl(self, n: u32) -> Self;
}

impl Lane for u32 {
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn rotl(self, n: u32) -> Self {
        self.rotate_left(n)
    }
}

/// Number of rounds applied by the permutation.
pub trait Rounds: Copy + Clone + Debug + Default + 'static {
    const COUNT: usize;
}

/// 8 rounds.
#[derive(Copy, Clone, Debug, Default)]
pub struct R8;
impl Rounds for R8 {
    const COUNT: usize = 8;
}

/// 12 rounds.
#[derive(Copy, Clone, Debug, Default)]
pub struct R12;
impl Rounds for R12 {
    const COUNT: usize = 12;
}

/// 20 rounds.
#[derive(Copy, Clone, Debug, Default)]
pub struct R20;
impl Rounds for R20 {
    const COUNT: usize = 20;
}

/// A permutation family: where the constants and key sit in the state and
/// how a double round mixes it.
pub trait Family: Copy + Clone + Debug + Default + 'static {
    /// Words holding the four sigma constants.
    const SIGMA_WORDS: [usize; 4];
    /// First word of each 16-byte key half.
    const KEY_WORDS: [usize; 2];
    /// First of the four words that take the 16-byte HChaCha/HSalsa input.
    const INPUT_WORD: usize;
    /// Words of the permuted state that form a derived subkey.
    const SUBKEY_WORDS: [usize; 8];

    fn double_round<L: Lane>(x: &mut [L; STATE_WORDS]);
}

/// Bernstein's ChaCha: constants in row 0, key in rows 1-2.
#[derive(Copy, Clone, Debug, Default)]
pub struct ChaChaFamily;

impl Family for ChaChaFamily {
    const SIGMA_WORDS: [usize; 4] = [0, 1, 2, 3];
    const KEY_WORDS: [usize; 2] = [4, 8];
    const INPUT_WORD: usize = 12;
    const SUBKEY_WORDS: [usize; 8] = [0, 1, 2, 3, 12, 13, 14, 15];

    #[inline(always)]
    fn double_round<L: Lane>(x: &mut [L; STATE_WORDS]) {
        // columns
        chacha_quarter(x, 0, 4, 8, 12);
        chacha_quarter(x, 1, 5, 9, 13);
        chacha_quarter(x, 2, 6, 10, 14);
        chacha_quarter(x, 3, 7, 11, 15);
        // diagonals
        chacha_quarter(x, 0, 5, 10, 15);
        chacha_quarter(x, 1, 6, 11, 12);
        chacha_quarter(x, 2, 7, 8, 13);
        chacha_quarter(x, 3, 4, 9, 14);
    }
}

/// Bernstein's Salsa20: constants on the diagonal.
#[derive(Copy, Clone, Debug, Default)]
pub struct SalsaFamily;

impl Family for SalsaFamily {
    const SIGMA_WORDS: [usize; 4] = [0, 5, 10, 15];
    const KEY_WORDS: [usize; 2] = [1, 11];
    const INPUT_WORD: usize = 6;
    const SUBKEY_WORDS: [usize; 8] = [0, 5, 10, 15, 6, 7, 8, 9];

    #[inline(always)]
    fn double_round<L: Lane>(x: &mut [L; STATE_WORDS]) {
        // columns
        salsa_quarter(x, 0, 4, 8, 12);
        salsa_quarter(x, 5, 9, 13, 1);
        salsa_quarter(x, 10, 14, 2, 6);
        salsa_quarter(x, 15, 3, 7, 11);
        // rows
        salsa_quarter(x, 0, 1, 2, 3);
        salsa_quarter(x, 5, 6, 7, 4);
        salsa_quarter(x, 10, 11, 8, 9);
        salsa_quarter(x, 15, 12, 13, 14);
    }
}

#[inline(always)]
fn chacha_quarter<L: Lane>(x: &mut [L; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].add(x[b]);
    x[d] = x[d].xor(x[a]).rotl(16);
    x[c] = x[c].add(x[d]);
    x[b] = x[b].xor(x[c]).rotl(12);
    x[a] = x[a].add(x[b]);
    x[d] = x[d].xor(x[a]).rotl(8);
    x[c] = x[c].add(x[d]);
    x[b] = x[b].xor(x[c]).rotl(7);
}

#[inline(always)]
fn salsa_quarter<L: Lane>(x: &mut [L; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    x[b] = x[b].xor(x[a].add(x[d]).rotl(7));
    x[c] = x[c].xor(x[b].add(x[a]).rotl(9));
    x[d] = x[d].xor(x[c].add(x[b]).rotl(13));
    x[a] = x[a].xor(x[d].add(x[c]).rotl(18));
}

/// Applies `R::COUNT` rounds without the final feed-forward.
#[inline(always)]
pub(crate) fn permute<F: Family, R: Rounds, L: Lane>(x: &mut [L; STATE_WORDS]) {
    for _ in 0..R::COUNT / 2 {
        F::double_round(x);
    }
}

/// The block function: rounds, then the input added back word by word.
#[inline(always)]
pub(crate) fn block<F: Family, R: Rounds>(input: &[u32; STATE_WORDS]) -> [u32; STATE_WORDS] {
    let mut x = *input;
    permute::<F, R, u32>(&mut x);
    for (out, word) in x.iter_mut().zip(input) {
        *out = out.wrapping_add(*word);
    }
    x
}

/// Writes the sigma constants and a 16- or 32-byte key into `words`.
///
/// A 16-byte key selects `SIGMA16` and fills both key halves with the same
/// bytes.
pub(crate) fn expand_key<F: Family>(words: &mut [u32; STATE_WORDS], key: &[u8]) {
    let (sigma, low, high) = if key.len() == SHORT_KEY_SIZE {
        (SIGMA16, key, key)
    } else {
        let (low, high) = key.split_at(SHORT_KEY_SIZE);
        (SIGMA32, low, high)
    };
    for (&i, &c) in F::SIGMA_WORDS.iter().zip(sigma.iter()) {
        words[i] = c;
    }
    let [lo, hi] = F::KEY_WORDS;
    load_le(&mut words[lo..lo + 4], low);
    load_le(&mut words[hi..hi + 4], high);
}
