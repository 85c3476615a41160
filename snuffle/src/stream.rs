//======================================================================
// src/stream.rs
// Block-level core: key/nonce setup, counter access and the RustCrypto
// `cipher` trait surface.
//======================================================================

use crate::backends::{self, BackendTier};
use crate::consts::KEY_SIZE;
use crate::error::{Error, Result};
use crate::rounds::{Rounds, R20};
use crate::state::CipherState;
use crate::variant::{Ietf, Original, Salsa, Variant, XChaCha, XSalsa};
use cipher::consts::{U32, U64};
use cipher::{
    BlockSizeUser, Iv, IvSizeUser, Key, KeyIvInit, KeySizeUser, StreamCipherCore,
    StreamCipherSeekCore, StreamClosure,
};
use core::fmt;
use core::marker::PhantomData;
use zeroize::ZeroizeOnDrop;

/// Keystream core for variant `V` with `R` rounds.
///
/// Holds the cipher state, the key it was built from and the engine tier
/// chosen at construction. The tier never changes afterwards.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SnuffleCore<V: Variant, R: Rounds = R20> {
    pub(crate) state: CipherState,
    key: [u8; KEY_SIZE],
    key_len: usize,
    #[zeroize(skip)]
    tier: BackendTier,
    #[zeroize(skip)]
    _variant: PhantomData<(V, R)>,
}

impl<V: Variant, R: Rounds> SnuffleCore<V, R> {
    /// Builds a core on the widest engine the CPU supports.
    pub fn new_from_slices(key: &[u8], nonce: &[u8]) -> Result<Self> {
        Self::with_backend(key, nonce, BackendTier::detect())
    }

    /// Builds a core on `tier`, or on the widest supported tier below it.
    pub fn with_backend(key: &[u8], nonce: &[u8], tier: BackendTier) -> Result<Self> {
        if !V::KEY_SIZES.contains(&key.len()) {
            return Err(Error::InvalidKeyLength(key.len()));
        }
        check_nonce::<V>(nonce)?;
        Ok(Self::assemble(key, nonce, tier.resolve()))
    }

    fn assemble(key: &[u8], nonce: &[u8], tier: BackendTier) -> Self {
        let mut stored = [0u8; KEY_SIZE];
        stored[..key.len()].copy_from_slice(key);
        let mut core = Self {
            state: CipherState::new(),
            key: stored,
            key_len: key.len(),
            tier,
            _variant: PhantomData,
        };
        V::init::<R>(&mut core.state, key, nonce);
        tracing::trace!(backend = ?tier, rounds = R::COUNT, "keystream core ready");
        core
    }

    /// Engine tier this core runs on.
    pub fn backend(&self) -> BackendTier {
        self.tier
    }

    /// Re-initialises the state for `nonce` with the stored key. The block
    /// counter restarts at zero.
    pub fn set_iv(&mut self, nonce: &[u8]) -> Result<()> {
        check_nonce::<V>(nonce)?;
        V::init::<R>(&mut self.state, &self.key[..self.key_len], nonce);
        Ok(())
    }

    /// Index of the next keystream block.
    pub fn counter(&self) -> u64 {
        self.state.counter(V::COUNTER)
    }

    /// Moves to keystream block `counter`.
    pub fn set_counter(&mut self, counter: u64) -> Result<()> {
        if counter > V::COUNTER.max() {
            return Err(Error::CounterOutOfRange(counter));
        }
        self.state.set_counter(V::COUNTER, counter);
        Ok(())
    }

    /// Blocks left before the counter is exhausted. The last index of the
    /// layout is never generated, so the counter cannot wrap back to a block
    /// already used.
    pub(crate) fn blocks_remaining(&self) -> u64 {
        V::COUNTER.max() - self.counter()
    }
}

fn check_nonce<V: Variant>(nonce: &[u8]) -> Result<()> {
    if nonce.len() != V::NONCE_SIZE {
        return Err(Error::InvalidNonceLength {
            expected: V::NONCE_SIZE,
            actual: nonce.len(),
        });
    }
    Ok(())
}

impl<V: Variant, R: Rounds> fmt::Debug for SnuffleCore<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnuffleCore")
            .field("variant", &V::default())
            .field("rounds", &R::COUNT)
            .field("backend", &self.tier)
            .finish_non_exhaustive()
    }
}

impl<V: Variant, R: Rounds> KeySizeUser for SnuffleCore<V, R> {
    type KeySize = U32;
}

impl<V: Variant, R: Rounds> IvSizeUser for SnuffleCore<V, R> {
    type IvSize = V::NonceSize;
}

impl<V: Variant, R: Rounds> BlockSizeUser for SnuffleCore<V, R> {
    type BlockSize = U64;
}

impl<V: Variant, R: Rounds> KeyIvInit for SnuffleCore<V, R> {
    fn new(key: &Key<Self>, iv: &Iv<Self>) -> Self {
        Self::assemble(key, iv, BackendTier::detect())
    }
}

impl<V: Variant, R: Rounds> StreamCipherCore for SnuffleCore<V, R> {
    fn remaining_blocks(&self) -> Option<usize> {
        Some(usize::try_from(self.blocks_remaining()).unwrap_or(usize::MAX))
    }

    /// Hands `f` the engine chosen at construction.
    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        backends::process::<V, R, _>(self.tier, &mut self.state, f);
    }
}

macro_rules! impl_seek {
    ($variant:ty, $counter:ty) => {
        impl<R: Rounds> StreamCipherSeekCore for SnuffleCore<$variant, R> {
            type Counter = $counter;

            fn get_block_pos(&self) -> Self::Counter {
                self.counter() as $counter
            }

            fn set_block_pos(&mut self, pos: Self::Counter) {
                self.state.set_counter(<$variant as Variant>::COUNTER, pos as u64);
            }
        }
    };
}

impl_seek!(Ietf, u32);
impl_seek!(Original, u64);
impl_seek!(XChaCha, u64);
impl_seek!(Salsa, u64);
impl_seek!(XSalsa, u64);
