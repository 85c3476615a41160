//======================================================================
// src/variant.rs
// State layouts: how each cipher places key, nonce and counter words.
//======================================================================

use crate::consts::{HNONCE_SIZE, KEY_SIZE, SHORT_KEY_SIZE, XNONCE_SIZE};
use crate::rounds::{expand_key, ChaChaFamily, Family, Rounds, SalsaFamily};
use crate::state::{load_le, CipherState, CounterLayout};
use crate::xnonce::derive_subkey;
use cipher::consts::{U12, U24, U8};
use cipher::generic_array::ArrayLength;
use core::fmt::Debug;
use zeroize::Zeroize;

/// A concrete state layout within one permutation family.
pub trait Variant: Copy + Clone + Debug + Default + 'static {
    /// Permutation family driving the block function.
    type Family: Family;
    /// Nonce size type, for the `cipher` trait surface.
    type NonceSize: ArrayLength<u8>;
    const NONCE_SIZE: usize;
    /// Accepted key lengths in bytes.
    const KEY_SIZES: &'static [usize];
    const COUNTER: CounterLayout;

    /// Lays out key, nonce and a zero counter. Lengths are checked by the
    /// caller.
    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]);
}

/// RFC 8439 ChaCha20: 96-bit nonce, 32-bit counter in word 12.
#[derive(Copy, Clone, Debug, Default)]
pub struct Ietf;

impl Variant for Ietf {
    type Family = ChaChaFamily;
    type NonceSize = U12;
    const NONCE_SIZE: usize = 12;
    const KEY_SIZES: &'static [usize] = &[KEY_SIZE];
    const COUNTER: CounterLayout = CounterLayout::Narrow { word: 12 };

    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]) {
        expand_key::<ChaChaFamily>(&mut state.words, key);
        state.words[12] = 0;
        load_le(&mut state.words[13..16], nonce);
    }
}

/// Bernstein's original ChaCha layout: 64-bit nonce, 64-bit counter in words
/// 12 and 13.
#[derive(Copy, Clone, Debug, Default)]
pub struct Original;

impl Variant for Original {
    type Family = ChaChaFamily;
    type NonceSize = U8;
    const NONCE_SIZE: usize = 8;
    const KEY_SIZES: &'static [usize] = &[SHORT_KEY_SIZE, KEY_SIZE];
    const COUNTER: CounterLayout = CounterLayout::Wide { word: 12 };

    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]) {
        expand_key::<ChaChaFamily>(&mut state.words, key);
        state.set_counter(Self::COUNTER, 0);
        load_le(&mut state.words[14..16], nonce);
    }
}

/// XChaCha20: HChaCha subkey over the first 16 nonce bytes, then the
/// original layout with the last 8.
#[derive(Copy, Clone, Debug, Default)]
pub struct XChaCha;

impl Variant for XChaCha {
    type Family = ChaChaFamily;
    type NonceSize = U24;
    const NONCE_SIZE: usize = XNONCE_SIZE;
    const KEY_SIZES: &'static [usize] = &[KEY_SIZE];
    const COUNTER: CounterLayout = Original::COUNTER;

    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]) {
        let (head, tail) = nonce.split_at(HNONCE_SIZE);
        let mut subkey = derive_subkey::<ChaChaFamily, R>(key, head);
        Original::init::<R>(state, &subkey, tail);
        subkey.zeroize();
    }
}

/// Salsa20: 64-bit nonce in words 6-7, 64-bit counter in words 8-9.
#[derive(Copy, Clone, Debug, Default)]
pub struct Salsa;

impl Variant for Salsa {
    type Family = SalsaFamily;
    type NonceSize = U8;
    const NONCE_SIZE: usize = 8;
    const KEY_SIZES: &'static [usize] = &[SHORT_KEY_SIZE, KEY_SIZE];
    const COUNTER: CounterLayout = CounterLayout::Wide { word: 8 };

    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]) {
        expand_key::<SalsaFamily>(&mut state.words, key);
        load_le(&mut state.words[6..8], nonce);
        state.set_counter(Self::COUNTER, 0);
    }
}

/// XSalsa20: HSalsa subkey over the first 16 nonce bytes, then the Salsa20
/// layout with the last 8.
#[derive(Copy, Clone, Debug, Default)]
pub struct XSalsa;

impl Variant for XSalsa {
    type Family = SalsaFamily;
    type NonceSize = U24;
    const NONCE_SIZE: usize = XNONCE_SIZE;
    const KEY_SIZES: &'static [usize] = &[KEY_SIZE];
    const COUNTER: CounterLayout = Salsa::COUNTER;

    fn init<R: Rounds>(state: &mut CipherState, key: &[u8], nonce: &[u8]) {
        let (head, tail) = nonce.split_at(HNONCE_SIZE);
        let mut subkey = derive_subkey::<SalsaFamily, R>(key, head);
        Salsa::init::<R>(state, &subkey, tail);
        subkey.zeroize();
    }
}
