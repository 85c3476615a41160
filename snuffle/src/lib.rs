#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//======================================================================
// src/lib.rs
// Crate entry point: module layout, public re-exports and cipher aliases.
//======================================================================

// --- Module declarations ---
mod backends;
pub mod consts;
mod driver;
mod error;
mod rounds;
mod state;
pub mod stream;
pub mod variant;
mod xnonce;

// --- Test Module ---
#[cfg(test)]
mod tests;

// --- Re-exports ---
pub use backends::BackendTier;
pub use driver::Snuffle;
pub use error::{Error, Result};
pub use rounds::{ChaChaFamily, Family, Rounds, SalsaFamily, R12, R20, R8};
pub use stream::SnuffleCore;
pub use xnonce::{hchacha, hsalsa};

pub use cipher;

use variant::{Ietf, Original, Salsa, XChaCha, XSalsa};

// -- Stream drivers --

/// ChaCha20 with a 96-bit nonce and 32-bit counter (RFC 8439).
pub type ChaCha20 = Snuffle<Ietf>;
/// ChaCha reduced to 12 rounds, RFC 8439 layout.
pub type ChaCha12 = Snuffle<Ietf, R12>;
/// ChaCha reduced to 8 rounds, RFC 8439 layout.
pub type ChaCha8 = Snuffle<Ietf, R8>;
/// ChaCha20 with the original 64-bit nonce and 64-bit counter. Accepts 16-
/// or 32-byte keys.
pub type ChaCha20Original = Snuffle<Original>;
/// ChaCha20 with a 192-bit nonce.
pub type XChaCha20 = Snuffle<XChaCha>;
pub type XChaCha12 = Snuffle<XChaCha, R12>;
pub type XChaCha8 = Snuffle<XChaCha, R8>;
/// Salsa20/20. Accepts 16- or 32-byte keys.
pub type Salsa20 = Snuffle<Salsa>;
pub type Salsa12 = Snuffle<Salsa, R12>;
pub type Salsa8 = Snuffle<Salsa, R8>;
/// Salsa20 with a 192-bit nonce.
pub type XSalsa20 = Snuffle<XSalsa>;

// -- `cipher` trait wrappers --

pub type ChaCha20Cipher = cipher::StreamCipherCoreWrapper<SnuffleCore<Ietf>>;
pub type ChaCha20OriginalCipher = cipher::StreamCipherCoreWrapper<SnuffleCore<Original>>;
pub type XChaCha20Cipher = cipher::StreamCipherCoreWrapper<SnuffleCore<XChaCha>>;
pub type Salsa20Cipher = cipher::StreamCipherCoreWrapper<SnuffleCore<Salsa>>;
pub type XSalsa20Cipher = cipher::StreamCipherCoreWrapper<SnuffleCore<XSalsa>>;
