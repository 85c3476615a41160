//======================================================================
// src/poly1305.rs
// Poly1305 one-time authenticator (RFC 8439 section 2.5), 26-bit limbs.
//======================================================================

use crate::error::{Error, Result};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// One-time key size.
pub const KEY_SIZE: usize = 32;
/// Message block size.
pub const BLOCK_SIZE: usize = 16;
/// Authenticator size.
pub const TAG_SIZE: usize = 16;

const LIMB_MASK: u32 = 0x03ff_ffff;
/// The 2^128 bit every full block carries, in limb 4.
const HIBIT: u32 = 1 << 24;

/// Poly1305 keyed with a one-time key.
///
/// Input may be fed in pieces of any size; only whole 16-byte blocks are
/// absorbed until [`finalize`](Self::finalize). Finalizing consumes the
/// MAC, so a key cannot produce two tags.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    s: [u32; 4],
    h: [u32; 5],
    buffer: [u8; BLOCK_SIZE],
    pos: usize,
}

impl Poly1305 {
    /// `key` is `r ‖ s`; `r` is clamped as RFC 8439 requires.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        let r = [
            le32(&key[0..]) & 0x03ff_ffff,
            (le32(&key[3..]) >> 2) & 0x03ff_ff03,
            (le32(&key[6..]) >> 4) & 0x03ff_c0ff,
            (le32(&key[9..]) >> 6) & 0x03f0_3fff,
            (le32(&key[12..]) >> 8) & 0x000f_ffff,
        ];
        let s = [le32(&key[16..]), le32(&key[20..]), le32(&key[24..]), le32(&key[28..])];
        Self {
            r,
            s,
            h: [0; 5],
            buffer: [0; BLOCK_SIZE],
            pos: 0,
        }
    }

    /// Absorbs `data`.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.pos > 0 {
            let n = (BLOCK_SIZE - self.pos).min(data.len());
            self.buffer[self.pos..self.pos + n].copy_from_slice(&data[..n]);
            self.pos += n;
            data = &data[n..];
            if self.pos < BLOCK_SIZE {
                return;
            }
            absorb(&mut self.h, &self.r, &self.buffer, HIBIT);
            self.pos = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in &mut blocks {
            absorb(&mut self.h, &self.r, block, HIBIT);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.pos = rest.len();
    }

    /// Absorbs `data`, then zero-fills up to the next block boundary. This is
    /// the `pad16` step of the ChaCha20-Poly1305 layout.
    pub fn update_padded(&mut self, data: &[u8]) {
        self.update(data);
        if self.pos > 0 {
            self.buffer[self.pos..].fill(0);
            absorb(&mut self.h, &self.r, &self.buffer, HIBIT);
            self.pos = 0;
        }
    }

    /// Produces the tag.
    pub fn finalize(mut self) -> [u8; TAG_SIZE] {
        self.compute_tag()
    }

    /// Checks `tag` in constant time.
    pub fn verify(mut self, tag: &[u8; TAG_SIZE]) -> Result<()> {
        let mut expected = self.compute_tag();
        let equal = expected.ct_eq(tag);
        expected.zeroize();
        if bool::from(equal) {
            Ok(())
        } else {
            Err(Error::AuthenticationFailure)
        }
    }

    fn compute_tag(&mut self) -> [u8; TAG_SIZE] {
        if self.pos > 0 {
            // final partial block: 0x01 marker, no 2^128 bit
            self.buffer[self.pos] = 1;
            self.buffer[self.pos + 1..].fill(0);
            absorb(&mut self.h, &self.r, &self.buffer, 0);
            self.pos = 0;
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        // full carry
        let mut c = h1 >> 26;
        h1 &= LIMB_MASK;
        h2 += c;
        c = h2 >> 26;
        h2 &= LIMB_MASK;
        h3 += c;
        c = h3 >> 26;
        h3 &= LIMB_MASK;
        h4 += c;
        c = h4 >> 26;
        h4 &= LIMB_MASK;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= LIMB_MASK;
        h1 += c;

        // g = h + -p
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= LIMB_MASK;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= LIMB_MASK;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= LIMB_MASK;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= LIMB_MASK;
        let mut g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        // h >= p selects g, without branching
        let mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        let keep = !mask;
        h0 = (h0 & keep) | g0;
        h1 = (h1 & keep) | g1;
        h2 = (h2 & keep) | g2;
        h3 = (h3 & keep) | g3;
        h4 = (h4 & keep) | g4;

        // h mod 2^128
        let w0 = h0 | (h1 << 26);
        let w1 = (h1 >> 6) | (h2 << 20);
        let w2 = (h2 >> 12) | (h3 << 14);
        let w3 = (h3 >> 18) | (h4 << 8);

        // tag = (h + s) mod 2^128
        let mut tag = [0u8; TAG_SIZE];
        let mut carry = 0u64;
        for ((chunk, w), s) in tag.chunks_exact_mut(4).zip([w0, w1, w2, w3]).zip(self.s) {
            let f = u64::from(w) + u64::from(s) + carry;
            chunk.copy_from_slice(&(f as u32).to_le_bytes());
            carry = f >> 32;
        }
        tag
    }
}

/// h = (h + m) * r mod 2^130 - 5
fn absorb(h: &mut [u32; 5], r: &[u32; 5], m: &[u8], hibit: u32) {
    let [r0, r1, r2, r3, r4] = *r;
    let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

    let h0 = h[0] + (le32(&m[0..]) & LIMB_MASK);
    let h1 = h[1] + ((le32(&m[3..]) >> 2) & LIMB_MASK);
    let h2 = h[2] + ((le32(&m[6..]) >> 4) & LIMB_MASK);
    let h3 = h[3] + ((le32(&m[9..]) >> 6) & LIMB_MASK);
    let h4 = h[4] + ((le32(&m[12..]) >> 8) | hibit);

    let mul = |a: u32, b: u32| u64::from(a) * u64::from(b);
    let d0 = mul(h0, r0) + mul(h1, s4) + mul(h2, s3) + mul(h3, s2) + mul(h4, s1);
    let mut d1 = mul(h0, r1) + mul(h1, r0) + mul(h2, s4) + mul(h3, s3) + mul(h4, s2);
    let mut d2 = mul(h0, r2) + mul(h1, r1) + mul(h2, r0) + mul(h3, s4) + mul(h4, s3);
    let mut d3 = mul(h0, r3) + mul(h1, r2) + mul(h2, r1) + mul(h3, r0) + mul(h4, s4);
    let mut d4 = mul(h0, r4) + mul(h1, r3) + mul(h2, r2) + mul(h3, r1) + mul(h4, r0);

    // partial reduction
    let mut c = d0 >> 26;
    let mut h0 = d0 as u32 & LIMB_MASK;
    d1 += c;
    c = d1 >> 26;
    let mut h1 = d1 as u32 & LIMB_MASK;
    d2 += c;
    c = d2 >> 26;
    let h2 = d2 as u32 & LIMB_MASK;
    d3 += c;
    c = d3 >> 26;
    let h3 = d3 as u32 & LIMB_MASK;
    d4 += c;
    c = d4 >> 26;
    let h4 = d4 as u32 & LIMB_MASK;
    let folded = u64::from(h0) + c * 5;
    h0 = folded as u32 & LIMB_MASK;
    h1 += (folded >> 26) as u32;

    *h = [h0, h1, h2, h3, h4];
}

#[inline(always)]
fn le32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
