//======================================================================
// src/error.rs
// AEAD error type.
//======================================================================

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Key, nonce or buffer arguments the underlying cipher rejected.
    #[error(transparent)]
    Cipher(#[from] snuffle::Error),
    /// The tag did not match. No plaintext was written.
    #[error("authentication tag mismatch")]
    AuthenticationFailure,
}

impl Error {
    /// Whether the call failed argument validation rather than
    /// authentication.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Cipher(e) => e.is_invalid_argument(),
            Error::AuthenticationFailure => false,
        }
    }
}
