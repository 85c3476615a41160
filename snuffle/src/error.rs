//======================================================================
// src/error.rs
// Error type shared by every driver operation.
//======================================================================

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures reported by the stream cipher drivers.
///
/// Every variant is raised before the driver state is touched, so a failed
/// call can be retried with corrected arguments.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The key length is not one the variant accepts.
    #[error("invalid key length: {0} bytes")]
    InvalidKeyLength(usize),

    /// The nonce length does not match the variant.
    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// Source and destination buffers differ in length.
    #[error("buffer length mismatch: input is {input} bytes, output is {output}")]
    BufferLengthMismatch { input: usize, output: usize },

    /// The requested block counter does not fit the variant's counter words.
    #[error("block counter {0} is out of range")]
    CounterOutOfRange(u64),

    /// The keystream would run past the end of the counter range.
    #[error("keystream data limit exceeded")]
    DataLimitExceeded,
}

impl Error {
    /// `true` for caller mistakes (bad lengths or counters) that can be fixed
    /// and retried.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Error::DataLimitExceeded)
    }
}
