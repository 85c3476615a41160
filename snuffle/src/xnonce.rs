//======================================================================
// src/xnonce.rs
// HChaCha20 / HSalsa20 subkey derivation for the extended-nonce ciphers.
//======================================================================

use crate::consts::{HNONCE_SIZE, KEY_SIZE, STATE_WORDS};
use crate::rounds::{expand_key, permute, ChaChaFamily, Family, Rounds, SalsaFamily};
use crate::state::load_le;
use zeroize::Zeroize;

/// HChaCha: derives a 32-byte subkey from `key` and 16 bytes of nonce.
///
/// The input occupies the counter and nonce words (12..16). The output is
/// words 0..4 and 12..16 of the permuted state, with no feed-forward.
pub fn hchacha<R: Rounds>(key: &[u8; KEY_SIZE], input: &[u8; HNONCE_SIZE]) -> [u8; KEY_SIZE] {
    derive_subkey::<ChaChaFamily, R>(key, input)
}

/// HSalsa: derives a 32-byte subkey from `key` and 16 bytes of nonce.
///
/// The input occupies the nonce and counter words (6..10). The output is
/// the diagonal words 0, 5, 10, 15 followed by words 6..10.
pub fn hsalsa<R: Rounds>(key: &[u8; KEY_SIZE], input: &[u8; HNONCE_SIZE]) -> [u8; KEY_SIZE] {
    derive_subkey::<SalsaFamily, R>(key, input)
}

pub(crate) fn derive_subkey<F: Family, R: Rounds>(key: &[u8], input: &[u8]) -> [u8; KEY_SIZE] {
    let mut x = [0u32; STATE_WORDS];
    expand_key::<F>(&mut x, key);
    load_le(&mut x[F::INPUT_WORD..F::INPUT_WORD + 4], input);
    permute::<F, R, u32>(&mut x);

    let mut subkey = [0u8; KEY_SIZE];
    for (chunk, &i) in subkey.chunks_exact_mut(4).zip(F::SUBKEY_WORDS.iter()) {
        chunk.copy_from_slice(&x[i].to_le_bytes());
    }
    x.zeroize();
    subkey
}
