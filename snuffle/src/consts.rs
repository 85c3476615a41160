//======================================================================
// src/consts.rs
// State geometry and the "expand k" constants shared by both families.
//======================================================================

/// Number of 32-bit words in a cipher state.
pub const STATE_WORDS: usize = 16;

/// Size of one keystream block in bytes.
pub const BLOCK_SIZE: usize = STATE_WORDS * 4;

/// Full-size key in bytes.
pub const KEY_SIZE: usize = 32;

/// Short key accepted by the djb layouts (Salsa20, original ChaCha20).
pub const SHORT_KEY_SIZE: usize = 16;

/// Extended nonce used by XChaCha20 and XSalsa20.
pub const XNONCE_SIZE: usize = 24;

/// Input consumed by HChaCha20 / HSalsa20.
pub const HNONCE_SIZE: usize = 16;

/// "expand 32-byte k"
pub const SIGMA32: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// "expand 16-byte k"
pub const SIGMA16: [u32; 4] = [0x6170_7865, 0x3120_646e, 0x7962_2d36, 0x6b20_6574];
