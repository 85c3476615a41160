//======================================================================
// src/aead.rs
// ChaCha20-Poly1305 and XChaCha20-Poly1305 (RFC 8439 section 2.8).
//
// The one-time Poly1305 key is the first 32 bytes of keystream block 0.
// Payload keystream starts at block 1. The MAC runs over
// pad16(aad) || pad16(ciphertext) || le64(aad_len) || le64(ciphertext_len).
//======================================================================

use crate::error::Result;
use crate::poly1305::{self, Poly1305, TAG_SIZE};
use aead::consts::{U0, U16, U32};
use aead::{AeadCore, AeadInPlace, Key, KeyInit, KeySizeUser, Nonce, Tag};
use core::fmt;
use core::marker::PhantomData;
use snuffle::consts::KEY_SIZE;
use snuffle::variant::{Ietf, Variant, XChaCha};
use snuffle::{BackendTier, ChaChaFamily, Snuffle, R20};
use zeroize::{ZeroizeOnDrop, Zeroizing};

mod sealed {
    pub trait Sealed {}
    impl Sealed for snuffle::variant::Ietf {}
    impl Sealed for snuffle::variant::XChaCha {}
}

/// ChaCha layouts the RFC 8439 composition is defined for.
pub trait AeadVariant: Variant<Family = ChaChaFamily> + sealed::Sealed {}

impl AeadVariant for Ietf {}
impl AeadVariant for XChaCha {}

/// ChaCha20-Poly1305 over the nonce layout of `V`.
///
/// Only the key and engine tier are kept. Every call builds its own driver
/// and MAC, so one instance can serve any number of messages as long as
/// each uses a fresh nonce.
#[derive(Clone, ZeroizeOnDrop)]
pub struct ChaChaPoly1305<V: AeadVariant> {
    key: [u8; KEY_SIZE],
    #[zeroize(skip)]
    tier: BackendTier,
    #[zeroize(skip)]
    _variant: PhantomData<V>,
}

impl<V: AeadVariant> ChaChaPoly1305<V> {
    /// Creates an instance on the widest engine the CPU supports.
    pub fn try_new(key: &[u8]) -> Result<Self> {
        Self::with_backend(key, BackendTier::detect())
    }

    /// Creates an instance on `tier`, or on the widest supported tier below
    /// it.
    pub fn with_backend(key: &[u8], tier: BackendTier) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| snuffle::Error::InvalidKeyLength(key.len()))?;
        Ok(Self {
            key,
            tier: tier.resolve(),
            _variant: PhantomData,
        })
    }

    pub fn backend(&self) -> BackendTier {
        self.tier
    }

    /// Encrypts `plaintext` into `destination` and writes the tag.
    pub fn encrypt(
        &self,
        nonce: &[u8],
        plaintext: &[u8],
        destination: &mut [u8],
        tag: &mut [u8; TAG_SIZE],
        associated_data: &[u8],
    ) -> Result<()> {
        check_arguments::<V>(nonce, plaintext.len(), destination.len())?;
        let (mut cipher, mac) = self.start(nonce)?;
        cipher.update(plaintext, destination)?;
        *tag = authenticate(mac, associated_data, destination).finalize();
        Ok(())
    }

    /// Verifies `tag`, then decrypts `ciphertext` into `destination`.
    ///
    /// On [`AuthenticationFailure`](crate::Error::AuthenticationFailure)
    /// `destination` is left exactly as it was.
    pub fn decrypt(
        &self,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8; TAG_SIZE],
        destination: &mut [u8],
        associated_data: &[u8],
    ) -> Result<()> {
        check_arguments::<V>(nonce, ciphertext.len(), destination.len())?;
        let (mut cipher, mac) = self.start(nonce)?;
        authenticate(mac, associated_data, ciphertext)
            .verify(tag)
            .map_err(|e| {
                tracing::debug!(len = ciphertext.len(), "aead tag rejected");
                e
            })?;
        cipher.update(ciphertext, destination)?;
        Ok(())
    }

    /// Builds the per-message driver, positioned at block 1, and the MAC
    /// keyed from block 0.
    fn start(&self, nonce: &[u8]) -> Result<(Snuffle<V, R20>, Poly1305)> {
        let mut cipher = Snuffle::<V, R20>::with_backend(&self.key, nonce, self.tier)?;
        let mut mac_key = Zeroizing::new([0u8; poly1305::KEY_SIZE]);
        cipher.apply_keystream(&mut mac_key[..])?;
        cipher.set_counter(1)?;
        Ok((cipher, Poly1305::new(&mac_key)))
    }
}

/// Rejects bad nonces, then mismatched buffers, before any keystream work.
fn check_arguments<V: Variant>(nonce: &[u8], input: usize, output: usize) -> Result<()> {
    if nonce.len() != V::NONCE_SIZE {
        return Err(snuffle::Error::InvalidNonceLength {
            expected: V::NONCE_SIZE,
            actual: nonce.len(),
        }
        .into());
    }
    if input != output {
        return Err(snuffle::Error::BufferLengthMismatch { input, output }.into());
    }
    Ok(())
}

fn authenticate(mut mac: Poly1305, associated_data: &[u8], ciphertext: &[u8]) -> Poly1305 {
    mac.update_padded(associated_data);
    mac.update_padded(ciphertext);
    let mut lengths = [0u8; 16];
    lengths[..8].copy_from_slice(&(associated_data.len() as u64).to_le_bytes());
    lengths[8..].copy_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    mac.update(&lengths);
    mac
}

impl<V: AeadVariant> fmt::Debug for ChaChaPoly1305<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaChaPoly1305")
            .field("variant", &V::default())
            .field("backend", &self.tier)
            .finish_non_exhaustive()
    }
}

//======================================================================
// `aead` trait surface
//======================================================================

impl<V: AeadVariant> KeySizeUser for ChaChaPoly1305<V> {
    type KeySize = U32;
}

impl<V: AeadVariant> KeyInit for ChaChaPoly1305<V> {
    fn new(key: &Key<Self>) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(key);
        Self {
            key: bytes,
            tier: BackendTier::detect(),
            _variant: PhantomData,
        }
    }
}

impl<V: AeadVariant> AeadCore for ChaChaPoly1305<V> {
    type NonceSize = V::NonceSize;
    type TagSize = U16;
    type CiphertextOverhead = U0;
}

impl<V: AeadVariant> AeadInPlace for ChaChaPoly1305<V> {
    fn encrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> aead::Result<Tag<Self>> {
        let (mut cipher, mac) = self.start(nonce).map_err(|_| aead::Error)?;
        cipher.apply_keystream(buffer).map_err(|_| aead::Error)?;
        Ok(authenticate(mac, associated_data, buffer).finalize().into())
    }

    fn decrypt_in_place_detached(
        &self,
        nonce: &Nonce<Self>,
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &Tag<Self>,
    ) -> aead::Result<()> {
        let tag: &[u8; TAG_SIZE] = tag.as_slice().try_into().map_err(|_| aead::Error)?;
        let (mut cipher, mac) = self.start(nonce).map_err(|_| aead::Error)?;
        authenticate(mac, associated_data, buffer)
            .verify(tag)
            .map_err(|_| {
                tracing::debug!(len = buffer.len(), "aead tag rejected");
                aead::Error
            })?;
        cipher.apply_keystream(buffer).map_err(|_| aead::Error)
    }
}
