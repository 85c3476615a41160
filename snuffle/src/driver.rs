//======================================================================
// src/driver.rs
// Byte-oriented stream driver: keystream buffer, cursor and the update
// loop that feeds whole batches to the selected engine.
//======================================================================

use crate::backends::BackendTier;
use crate::consts::BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::rounds::{Rounds, R20};
use crate::stream::SnuffleCore;
use crate::variant::Variant;
use cipher::consts::U64;
use cipher::generic_array::typenum::Unsigned;
use cipher::generic_array::GenericArray;
use cipher::{Block, BlockSizeUser, ParBlocks, StreamBackend, StreamCipherCore, StreamClosure};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Stream cipher driver for variant `V` with `R` rounds.
///
/// Keystream left over from a partial block is kept and consumed by the
/// next [`update`](Self::update), so splitting a message across calls never
/// changes the output.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Snuffle<V: Variant, R: Rounds = R20> {
    /// Wipes itself on drop.
    #[zeroize(skip)]
    core: SnuffleCore<V, R>,
    keystream: [u8; BLOCK_SIZE],
    /// Bytes of `keystream` already used. Zero means nothing is buffered.
    cursor: usize,
}

impl<V: Variant, R: Rounds> Snuffle<V, R> {
    /// Creates a driver on the widest engine the CPU supports.
    pub fn new(key: &[u8], nonce: &[u8]) -> Result<Self> {
        Self::with_backend(key, nonce, BackendTier::detect())
    }

    /// Creates a driver on `tier`. Tiers the CPU lacks fall back to the
    /// widest one it has; [`backend`](Self::backend) reports the result.
    pub fn with_backend(key: &[u8], nonce: &[u8], tier: BackendTier) -> Result<Self> {
        Ok(Self {
            core: SnuffleCore::with_backend(key, nonce, tier)?,
            keystream: [0; BLOCK_SIZE],
            cursor: 0,
        })
    }

    pub fn backend(&self) -> BackendTier {
        self.core.backend()
    }

    /// Switches to a new nonce. The counter restarts at zero.
    pub fn set_iv(&mut self, nonce: &[u8]) -> Result<()> {
        self.core.set_iv(nonce)?;
        self.discard();
        Ok(())
    }

    /// Positions the stream at the start of block `counter`.
    pub fn set_counter(&mut self, counter: u64) -> Result<()> {
        self.core.set_counter(counter)?;
        self.discard();
        Ok(())
    }

    /// Counter of the next block to be generated.
    pub fn counter(&self) -> u64 {
        self.core.counter()
    }

    /// Rewinds to block zero.
    pub fn reset(&mut self) {
        self.core.state.set_counter(V::COUNTER, 0);
        self.discard();
    }

    /// XORs keystream over `input` into `output`. The buffers must be the
    /// same length.
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        if input.len() != output.len() {
            return Err(Error::BufferLengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        self.check_remaining(input.len())?;
        output.copy_from_slice(input);
        self.xor_keystream(output);
        Ok(())
    }

    /// XORs keystream over `buf` in place.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_remaining(buf.len())?;
        self.xor_keystream(buf);
        Ok(())
    }

    fn discard(&mut self) {
        self.keystream.zeroize();
        self.cursor = 0;
    }

    fn buffered(&self) -> usize {
        if self.cursor == 0 {
            0
        } else {
            BLOCK_SIZE - self.cursor
        }
    }

    fn check_remaining(&self, len: usize) -> Result<()> {
        let remaining = self.core.blocks_remaining();
        let needed = len.saturating_sub(self.buffered()).div_ceil(BLOCK_SIZE) as u64;
        if needed > remaining {
            return Err(Error::DataLimitExceeded);
        }
        Ok(())
    }

    fn xor_keystream(&mut self, mut data: &mut [u8]) {
        if self.cursor != 0 {
            let n = self.buffered().min(data.len());
            let (head, rest) = core::mem::take(&mut data).split_at_mut(n);
            xor(head, &self.keystream[self.cursor..self.cursor + n]);
            self.cursor = (self.cursor + n) % BLOCK_SIZE;
            data = rest;
        }
        if data.is_empty() {
            return;
        }

        let split = data.len() - data.len() % BLOCK_SIZE;
        let (blocks, tail) = data.split_at_mut(split);
        let tail_len = tail.len();
        self.core.process_with_backend(ApplyKeystream {
            blocks,
            tail,
            keystream: &mut self.keystream,
        });
        self.cursor = tail_len;
    }
}

impl<V: Variant, R: Rounds> fmt::Debug for Snuffle<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snuffle")
            .field("core", &self.core)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

/// Whole blocks go through the engine's batch path, then single blocks;
/// a trailing partial block is generated into the driver's buffer.
struct ApplyKeystream<'a> {
    blocks: &'a mut [u8],
    tail: &'a mut [u8],
    keystream: &'a mut [u8; BLOCK_SIZE],
}

impl BlockSizeUser for ApplyKeystream<'_> {
    type BlockSize = U64;
}

impl StreamClosure for ApplyKeystream<'_> {
    #[inline(always)]
    fn call<B: StreamBackend<BlockSize = Self::BlockSize>>(self, backend: &mut B) {
        let singles = if B::ParBlocksSize::USIZE > 1 {
            let mut par = ParBlocks::<B>::default();
            let mut batches = self
                .blocks
                .chunks_exact_mut(B::ParBlocksSize::USIZE * BLOCK_SIZE);
            for batch in &mut batches {
                backend.gen_par_ks_blocks(&mut par);
                for (chunk, ks) in batch.chunks_exact_mut(BLOCK_SIZE).zip(par.iter()) {
                    xor(chunk, ks);
                }
            }
            for ks in par.iter_mut() {
                ks.as_mut_slice().zeroize();
            }
            batches.into_remainder()
        } else {
            self.blocks
        };

        let mut block = Block::<B>::default();
        for chunk in singles.chunks_exact_mut(BLOCK_SIZE) {
            backend.gen_ks_block(&mut block);
            xor(chunk, &block);
        }
        block.as_mut_slice().zeroize();

        if !self.tail.is_empty() {
            backend.gen_ks_block(GenericArray::from_mut_slice(&mut self.keystream[..]));
            xor(self.tail, &self.keystream[..]);
        }
    }
}

#[inline(always)]
fn xor(buf: &mut [u8], keystream: &[u8]) {
    for (b, k) in buf.iter_mut().zip(keystream) {
        *b ^= k;
    }
}
