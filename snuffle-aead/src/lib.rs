#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//======================================================================
// src/lib.rs
// Crate entry point: Poly1305 and the ChaCha20-Poly1305 compositions.
//======================================================================

// --- Module declarations ---
mod aead;
mod error;
pub mod poly1305;


// --- Re-exports ---
pub use crate::aead::{AeadVariant, ChaChaPoly1305};
pub use error::{Error, Result};
pub use poly1305::Poly1305;

pub use ::aead as aead_api;
pub use snuffle::BackendTier;

use snuffle::variant::{Ietf, XChaCha};

/// ChaCha20-Poly1305 with a 96-bit nonce (RFC 8439).
pub type ChaCha20Poly1305 = ChaChaPoly1305<Ietf>;
/// ChaCha20-Poly1305 with a 192-bit nonce, keyed through HChaCha20.
pub type XChaCha20Poly1305 = ChaChaPoly1305<XChaCha>;
