//======================================================================
// Snuffle Crate Test Suite
//======================================================================
#![cfg(test)]

use crate::consts::BLOCK_SIZE;
use crate::variant::{Ietf, Original, Salsa, Variant, XChaCha, XSalsa};
use crate::{
    hchacha, hsalsa, BackendTier, ChaCha12, ChaCha20, ChaCha20Cipher, ChaCha20Original, ChaCha8,
    Error, Rounds, Salsa20, Snuffle, SnuffleCore, XChaCha20, XSalsa20, XSalsa20Cipher, R12, R20,
    R8,
};
use cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use hex_literal::hex;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use zeroize::ZeroizeOnDrop;

const SEQUENTIAL_KEY: [u8; 32] = hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");

fn random_bytes(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// `len` keystream bytes starting at block `counter`.
fn keystream<V: Variant, R: Rounds>(
    key: &[u8],
    nonce: &[u8],
    tier: BackendTier,
    counter: u64,
    len: usize,
) -> Vec<u8> {
    let mut cipher = Snuffle::<V, R>::with_backend(key, nonce, tier).expect("valid key and nonce");
    cipher.set_counter(counter).expect("counter in range");
    let mut out = vec![0u8; len];
    cipher.apply_keystream(&mut out).expect("within data limit");
    out
}

//======================================================================
// Published Vectors
//======================================================================

#[test]
fn chacha20_rfc8439_block_function() {
    // RFC 8439 section 2.3.2
    let nonce = hex!("000000090000004a00000000");
    let expected = hex!(
        "10f1e7e4d13b5915500fdd1fa32071c4c7d1f4c733c068030422aa9ac3d46c4e"
        "d2826446079faa0914c2d705d98b02a2b5129cd1de164eb9cbd083e8a2503c4e"
    );
    for tier in BackendTier::ALL {
        let block = keystream::<Ietf, R20>(&SEQUENTIAL_KEY, &nonce, tier, 1, BLOCK_SIZE);
        assert_eq!(block, expected, "RFC 8439 block mismatch on {tier:?}");
    }
}

#[test]
fn chacha20_all_zero_key_and_nonce() {
    let expected = hex!(
        "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7"
        "da41597c5157488d7724e03fb8d84a376a43b8f41518a11cc387b669b2ee6586"
    );
    let ietf = keystream::<Ietf, R20>(&[0; 32], &[0; 12], BackendTier::detect(), 0, 64);
    assert_eq!(ietf, expected, "IETF layout with zero key and nonce");

    // At counter zero with a zero nonce both ChaCha layouts coincide.
    let original = keystream::<Original, R20>(&[0; 32], &[0; 8], BackendTier::detect(), 0, 64);
    assert_eq!(original, expected, "original layout with zero key and nonce");
}

#[test]
fn chacha20_sequential_key_and_nonce_first_block() {
    let nonce = hex!("000102030405060708090a0b");
    let expected = hex!(
        "103af111c18b549d39248fb07d60c29a95d1db88d892f7b4af709a5fd47a9e4b"
        "d5ff9a658dd52c708bef1f0f622b3747040fa3551300b1f293150a88620d5fed"
    );
    let plaintext = [0u8; 64];
    let mut ciphertext = [0u8; 64];
    let mut cipher = ChaCha20::new(&SEQUENTIAL_KEY, &nonce).expect("valid key and nonce");
    cipher.update(&plaintext, &mut ciphertext).expect("update succeeds");
    assert_eq!(ciphertext, expected, "first keystream block mismatch");
}

#[test]
fn chacha_original_short_key_and_reduced_rounds() {
    // 128-bit all-zero key, 20 rounds
    let expected = hex!(
        "89670952608364fd00b2f90936f031c8e756e15dba04b8493d00429259b20f46"
        "cc04f111246b6c2ce066be3bfb32d9aa0fddfbc12123d4b9e44f34dca05a103f"
    );
    let out = keystream::<Original, R20>(&[0; 16], &[0; 8], BackendTier::detect(), 0, 64);
    assert_eq!(out, expected, "16-byte key must use the 16-byte sigma");

    // 256-bit all-zero key, 8 rounds
    let expected = hex!(
        "3e00ef2f895f40d67f5bb8e81f09a5a12c840ec3ce9a7f3b181be188ef711a1e"
        "984ce172b9216f419f445367456d5619314a42a3da86b001387bfdb80e0cfe42"
    );
    for tier in BackendTier::ALL {
        let out = keystream::<Original, R8>(&[0; 32], &[0; 8], tier, 0, 64);
        assert_eq!(out, expected, "ChaCha8 mismatch on {tier:?}");
    }

    // 256-bit all-zero key, 12 rounds
    let expected = hex!(
        "9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f"
        "0564f879d27ae3c02ce82834acfa8c793a629f2ca0de6919610be82f411326be"
    );
    let out = keystream::<Original, R12>(&[0; 32], &[0; 8], BackendTier::detect(), 0, 64);
    assert_eq!(out, expected, "ChaCha12 mismatch");
}

#[test]
fn salsa20_ecrypt_set1_vector0() {
    let mut key = [0u8; 32];
    key[0] = 0x80;
    let expected = hex!(
        "e3be8fdd8beca2e3ea8ef9475b29a6e7003951e1097a5c38d23b7a5fad9f6844"
        "b22c97559e2723c7cbbd3fe4fc8d9a0744652a83e72a9c461876af4d7ef1a117"
    );
    for tier in BackendTier::ALL {
        let out = keystream::<Salsa, R20>(&key, &[0; 8], tier, 0, 64);
        assert_eq!(out, expected, "256-bit Salsa20 vector mismatch on {tier:?}");
    }

    let expected = hex!(
        "4dfa5e481da23ea09a31022050859936da52fcee218005164f267cb65f5cfd7f"
        "2b4f97e0ff16924a52df269515110a07f9e460bc65ef95da58f740b7d1dbb0aa"
    );
    let out = keystream::<Salsa, R20>(&key[..16], &[0; 8], BackendTier::detect(), 0, 64);
    assert_eq!(out, expected, "128-bit Salsa20 vector mismatch");
}

#[test]
fn hchacha20_draft_vector() {
    let input = hex!("000000090000004a0000000031415927");
    let expected = hex!("82413b4227b27bfed30e42508a877d73a0f9e4d58a74a853c12ec41326d3ecdc");
    assert_eq!(hchacha::<R20>(&SEQUENTIAL_KEY, &input), expected, "HChaCha20 subkey mismatch");
}

#[test]
fn xsalsa20_hello_world() {
    let key = b"this is 32-byte key for xsalsa20";
    let nonce = b"24-byte nonce for xsalsa";
    let mut buffer = *b"Hello world!";
    let mut cipher = XSalsa20::new(key, nonce).expect("valid key and nonce");
    cipher.apply_keystream(&mut buffer).expect("within data limit");
    assert_eq!(buffer, hex!("002d4513843fc240c401e541"), "XSalsa20 ciphertext mismatch");
}

#[test]
fn xchacha20_known_keystream() {
    let key = hex!("808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f");
    let nonce = hex!("404142434445464748494a4b4c4d4e4f5051525354555657");
    let expected = hex!(
        "7b191f80f361f099094f6f4b8fb97df847cc6873a8f2b190dd73807183f907d5"
        "a1cb27385b00329f7ddc127059d6882551a120e7631352e9b0381572e950155a"
    );
    let out = keystream::<XChaCha, R20>(&key, &nonce, BackendTier::detect(), 0, 64);
    assert_eq!(out, expected, "XChaCha20 keystream mismatch");
}

//======================================================================
// Backend Equivalence
//======================================================================

const AWKWARD_LENGTHS: [usize; 14] = [0, 1, 63, 64, 65, 191, 255, 256, 257, 511, 512, 513, 1000, 4113];

fn assert_tiers_agree<V: Variant, R: Rounds>(seed: u8, key_len: usize) {
    let variant = V::default();
    let mut rng = ChaCha8Rng::from_seed([seed; 32]);
    for &len in AWKWARD_LENGTHS.iter() {
        let key = random_bytes(&mut rng, key_len);
        let nonce = random_bytes(&mut rng, V::NONCE_SIZE);
        let counter = u64::from(rng.next_u32() >> 8);
        let reference = keystream::<V, R>(&key, &nonce, BackendTier::Scalar, counter, len);
        for tier in BackendTier::ALL {
            let out = keystream::<V, R>(&key, &nonce, tier, counter, len);
            assert_eq!(out, reference, "{variant:?}/{} rounds: {tier:?} differs at length {len}", R::COUNT);
        }
    }
}

#[test]
fn tiers_agree_for_every_variant() {
    assert_tiers_agree::<Ietf, R20>(1, 32);
    assert_tiers_agree::<Ietf, R12>(2, 32);
    assert_tiers_agree::<Ietf, R8>(3, 32);
    assert_tiers_agree::<Original, R20>(4, 32);
    assert_tiers_agree::<Original, R20>(5, 16);
    assert_tiers_agree::<XChaCha, R20>(6, 32);
    assert_tiers_agree::<Salsa, R20>(7, 32);
    assert_tiers_agree::<Salsa, R20>(8, 16);
    assert_tiers_agree::<Salsa, R8>(9, 32);
    assert_tiers_agree::<XSalsa, R20>(10, 32);
}

#[test]
fn tiers_agree_across_fragmented_updates() {
    let mut rng = ChaCha8Rng::from_seed([11; 32]);
    let key = random_bytes(&mut rng, 32);
    let nonce = random_bytes(&mut rng, 12);
    let plaintext = random_bytes(&mut rng, 3000);
    let pieces = [1, 7, 64, 3, 200, 512, 129, 1, 1, 1000, 33];

    let mut outputs = Vec::new();
    for tier in BackendTier::ALL {
        let mut cipher = ChaCha20::with_backend(&key, &nonce, tier).expect("valid key and nonce");
        let mut ciphertext = vec![0u8; plaintext.len()];
        let mut offset = 0;
        for &piece in pieces.iter().cycle() {
            if offset == plaintext.len() {
                break;
            }
            let end = (offset + piece).min(plaintext.len());
            cipher
                .update(&plaintext[offset..end], &mut ciphertext[offset..end])
                .expect("update succeeds");
            offset = end;
        }
        outputs.push(ciphertext);
    }
    for out in &outputs[1..] {
        assert_eq!(out, &outputs[0], "fragmented updates must not depend on the tier");
    }
}

#[test]
fn original_layout_counter_carries_into_high_word() {
    let mut rng = ChaCha8Rng::from_seed([12; 32]);
    let key = random_bytes(&mut rng, 32);
    let nonce = random_bytes(&mut rng, 8);
    let start = (1u64 << 32) - 5;
    let blocks = 16;

    for tier in BackendTier::ALL {
        let mut cipher = ChaCha20Original::with_backend(&key, &nonce, tier).expect("valid key and nonce");
        cipher.set_counter(start).expect("counter in range");
        let mut bulk = vec![0u8; blocks * BLOCK_SIZE];
        cipher.apply_keystream(&mut bulk).expect("within data limit");
        assert_eq!(cipher.counter(), start + blocks as u64, "counter after bulk generation on {tier:?}");

        for (i, chunk) in bulk.chunks_exact(BLOCK_SIZE).enumerate() {
            let single = keystream::<Original, R20>(&key, &nonce, BackendTier::Scalar, start + i as u64, BLOCK_SIZE);
            assert_eq!(chunk, &single[..], "block {i} past the carry differs on {tier:?}");
        }
    }
}

#[test]
fn salsa_counter_carries_into_high_word() {
    let mut rng = ChaCha8Rng::from_seed([13; 32]);
    let key = random_bytes(&mut rng, 32);
    let nonce = random_bytes(&mut rng, 8);
    let start = (1u64 << 32) - 3;

    for tier in BackendTier::ALL {
        let bulk = keystream::<Salsa, R20>(&key, &nonce, tier, start, 12 * BLOCK_SIZE);
        for (i, chunk) in bulk.chunks_exact(BLOCK_SIZE).enumerate() {
            let single = keystream::<Salsa, R20>(&key, &nonce, BackendTier::Scalar, start + i as u64, BLOCK_SIZE);
            assert_eq!(chunk, &single[..], "Salsa20 block {i} differs on {tier:?}");
        }
    }
}

//======================================================================
// Stream Properties
//======================================================================

#[test]
fn encrypt_then_decrypt_recovers_plaintext() {
    let mut rng = ChaCha8Rng::from_seed([20; 32]);
    let key = random_bytes(&mut rng, 32);
    let nonce = random_bytes(&mut rng, 12);
    let plaintext = random_bytes(&mut rng, 8192);

    for len in 0..=plaintext.len() {
        let mut ciphertext = vec![0u8; len];
        let mut recovered = vec![0u8; len];
        ChaCha20::new(&key, &nonce)
            .and_then(|mut c| c.update(&plaintext[..len], &mut ciphertext))
            .expect("encrypt succeeds");
        ChaCha20::new(&key, &nonce)
            .and_then(|mut c| c.update(&ciphertext, &mut recovered))
            .expect("decrypt succeeds");
        assert_eq!(recovered, &plaintext[..len], "round trip failed at length {len}");
    }
}

#[test]
fn split_updates_match_single_update() {
    let mut rng = ChaCha8Rng::from_seed([21; 32]);
    let key = random_bytes(&mut rng, 32);
    let nonce = random_bytes(&mut rng, 8);
    let plaintext = random_bytes(&mut rng, 700);

    let mut whole = vec![0u8; plaintext.len()];
    Salsa20::new(&key, &nonce)
        .and_then(|mut c| c.update(&plaintext, &mut whole))
        .expect("single update succeeds");

    for split in 0..=plaintext.len() {
        let mut cipher = Salsa20::new(&key, &nonce).expect("valid key and nonce");
        let mut parts = vec![0u8; plaintext.len()];
        let (first, second) = parts.split_at_mut(split);
        cipher.update(&plaintext[..split], first).expect("first update succeeds");
        cipher.update(&plaintext[split..], second).expect("second update succeeds");
        assert_eq!(parts, whole, "split at {split} changed the output");
    }
}

#[test]
fn single_bit_changes_alter_first_block() {
    let mut rng = ChaCha8Rng::from_seed([22; 32]);

    fn check<V: Variant>(rng: &mut ChaCha8Rng) {
        let variant = V::default();
        let key = random_bytes(rng, 32);
        let nonce = random_bytes(rng, V::NONCE_SIZE);
        let base = keystream::<V, R20>(&key, &nonce, BackendTier::detect(), 0, BLOCK_SIZE);

        for bit in 0..key.len() * 8 {
            let mut flipped = key.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            let out = keystream::<V, R20>(&flipped, &nonce, BackendTier::detect(), 0, BLOCK_SIZE);
            assert_ne!(out, base, "{variant:?}: key bit {bit} left the first block unchanged");
        }
        for bit in 0..nonce.len() * 8 {
            let mut flipped = nonce.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            let out = keystream::<V, R20>(&key, &flipped, BackendTier::detect(), 0, BLOCK_SIZE);
            assert_ne!(out, base, "{variant:?}: nonce bit {bit} left the first block unchanged");
        }
    }

    check::<Ietf>(&mut rng);
    check::<Original>(&mut rng);
    check::<XChaCha>(&mut rng);
    check::<Salsa>(&mut rng);
    check::<XSalsa>(&mut rng);
}

#[test]
fn reduced_round_variants_differ() {
    let key = [7u8; 32];
    let nonce = [9u8; 12];
    let mut outputs = [[0u8; 64]; 3];
    ChaCha20::new(&key, &nonce).and_then(|mut c| c.apply_keystream(&mut outputs[0])).expect("ChaCha20");
    ChaCha12::new(&key, &nonce).and_then(|mut c| c.apply_keystream(&mut outputs[1])).expect("ChaCha12");
    ChaCha8::new(&key, &nonce).and_then(|mut c| c.apply_keystream(&mut outputs[2])).expect("ChaCha8");
    assert_ne!(outputs[0], outputs[1], "20 and 12 rounds must differ");
    assert_ne!(outputs[1], outputs[2], "12 and 8 rounds must differ");
}

//======================================================================
// Extended Nonces
//======================================================================

#[test]
fn xchacha20_matches_hchacha_then_chacha20() {
    let mut rng = ChaCha8Rng::from_seed([30; 32]);
    for _ in 0..8 {
        let key: [u8; 32] = random_bytes(&mut rng, 32).try_into().unwrap();
        let nonce = random_bytes(&mut rng, 24);
        let counter = u64::from(rng.next_u32() >> 4);

        let subkey = hchacha::<R20>(&key, nonce[..16].try_into().unwrap());
        let mut ietf_nonce = [0u8; 12];
        ietf_nonce[4..].copy_from_slice(&nonce[16..]);

        let extended = keystream::<XChaCha, R20>(&key, &nonce, BackendTier::detect(), counter, 777);
        let composed = keystream::<Ietf, R20>(&subkey, &ietf_nonce, BackendTier::detect(), counter, 777);
        assert_eq!(extended, composed, "XChaCha20 must equal HChaCha20 + ChaCha20");
    }
}

#[test]
fn xsalsa20_matches_hsalsa_then_salsa20() {
    let mut rng = ChaCha8Rng::from_seed([31; 32]);
    for _ in 0..8 {
        let key: [u8; 32] = random_bytes(&mut rng, 32).try_into().unwrap();
        let nonce = random_bytes(&mut rng, 24);

        let subkey = hsalsa::<R20>(&key, nonce[..16].try_into().unwrap());
        let extended = keystream::<XSalsa, R20>(&key, &nonce, BackendTier::detect(), 0, 321);
        let composed = keystream::<Salsa, R20>(&subkey, &nonce[16..], BackendTier::detect(), 0, 321);
        assert_eq!(extended, composed, "XSalsa20 must equal HSalsa20 + Salsa20");
    }
}

//======================================================================
// Driver State Machine
//======================================================================

#[test]
fn reset_and_set_counter_restart_the_stream() {
    let key = [0x11u8; 32];
    let nonce = [0x22u8; 12];
    let mut cipher = ChaCha20::new(&key, &nonce).expect("valid key and nonce");

    let mut first = [0u8; 100];
    cipher.apply_keystream(&mut first).expect("within data limit");
    assert_eq!(cipher.counter(), 2, "100 bytes consume two blocks");

    cipher.reset();
    let mut again = [0u8; 100];
    cipher.apply_keystream(&mut again).expect("within data limit");
    assert_eq!(first, again, "reset must replay the keystream");

    // A half-used buffered block is dropped by set_counter.
    cipher.set_counter(1).expect("counter in range");
    let mut second_block = [0u8; 64];
    cipher.apply_keystream(&mut second_block).expect("within data limit");
    let expected = keystream::<Ietf, R20>(&key, &nonce, BackendTier::Scalar, 1, 64);
    assert_eq!(&second_block[..], &expected[..], "set_counter must discard buffered keystream");
}

#[test]
fn set_iv_matches_fresh_instance() {
    let key = [0x33u8; 32];
    let first_nonce = [0x44u8; 24];
    let second_nonce = [0x55u8; 24];

    let mut cipher = XChaCha20::new(&key, &first_nonce).expect("valid key and nonce");
    let mut scratch = [0u8; 70];
    cipher.apply_keystream(&mut scratch).expect("within data limit");
    cipher.set_iv(&second_nonce).expect("valid nonce");
    assert_eq!(cipher.counter(), 0, "set_iv restarts the counter");

    let mut rekeyed = [0u8; 200];
    cipher.apply_keystream(&mut rekeyed).expect("within data limit");
    let fresh = keystream::<XChaCha, R20>(&key, &second_nonce, BackendTier::detect(), 0, 200);
    assert_eq!(&rekeyed[..], &fresh[..], "set_iv must re-derive the XChaCha20 subkey");
}

#[test]
fn capability_query_is_consistent() {
    let detected = BackendTier::detect();
    assert!(detected.is_supported(), "the detected tier must be supported");
    assert!(BackendTier::Scalar.is_supported(), "the scalar tier is always available");
    assert_eq!(BackendTier::detect(), detected, "detection must be stable");

    for tier in BackendTier::ALL {
        let cipher = ChaCha20::with_backend(&[0; 32], &[0; 12], tier).expect("valid key and nonce");
        let selected = cipher.backend();
        assert!(selected <= tier, "{tier:?} must never be upgraded");
        assert!(selected.is_supported(), "{tier:?} resolved to an unsupported {selected:?}");
        if tier.is_supported() {
            assert_eq!(selected, tier, "supported tiers are used as requested");
        }
        assert_eq!(tier.resolve(), selected, "{tier:?}: resolve must match the driver");
    }
    assert_eq!(BackendTier::Vector256.par_blocks(), 8);
}

#[test]
fn key_holding_types_wipe_on_drop() {
    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
    assert_zeroize_on_drop::<ChaCha20>();
    assert_zeroize_on_drop::<XChaCha20>();
    assert_zeroize_on_drop::<Salsa20>();
    assert_zeroize_on_drop::<SnuffleCore<XSalsa>>();
    assert_zeroize_on_drop::<SnuffleCore<Original, R8>>();

    // Cloning shares nothing: dropping one copy leaves the other usable.
    let mut original = ChaCha20::new(&SEQUENTIAL_KEY, &[0; 12]).expect("valid key and nonce");
    let mut copy = original.clone();
    let mut first = [0u8; 64];
    original.apply_keystream(&mut first[..10]).expect("within data limit");
    drop(original);
    let mut second = [0u8; 64];
    copy.apply_keystream(&mut second[..10]).expect("within data limit");
    assert_eq!(first, second, "a clone must produce the same keystream");
}

//======================================================================
// Argument Validation
//======================================================================

#[test]
fn rejects_bad_key_and_nonce_lengths() {
    assert_eq!(
        ChaCha20::new(&[0; 31], &[0; 12]).err(),
        Some(Error::InvalidKeyLength(31)),
        "31-byte key"
    );
    assert_eq!(
        ChaCha20::new(&[0; 16], &[0; 12]).err(),
        Some(Error::InvalidKeyLength(16)),
        "the IETF layout has no short-key form"
    );
    assert!(ChaCha20Original::new(&[0; 16], &[0; 8]).is_ok(), "original layout accepts 16-byte keys");
    assert!(Salsa20::new(&[0; 16], &[0; 8]).is_ok(), "Salsa20 accepts 16-byte keys");
    assert_eq!(
        XSalsa20::new(&[0; 16], &[0; 24]).err(),
        Some(Error::InvalidKeyLength(16)),
        "extended nonces need 32-byte keys"
    );
    assert_eq!(
        XChaCha20::new(&[0; 32], &[0; 12]).err(),
        Some(Error::InvalidNonceLength { expected: 24, actual: 12 }),
        "12-byte nonce for XChaCha20"
    );
    assert_eq!(
        Salsa20::new(&[0; 32], &[0; 24]).err(),
        Some(Error::InvalidNonceLength { expected: 8, actual: 24 }),
        "24-byte nonce for Salsa20"
    );
}

#[test]
fn failed_calls_leave_state_untouched() {
    let key = [0x66u8; 32];
    let nonce = [0x77u8; 12];
    let mut cipher = ChaCha20::new(&key, &nonce).expect("valid key and nonce");

    let mut short = [0u8; 9];
    let err = cipher.update(&[1u8; 10], &mut short).expect_err("length mismatch must fail");
    assert_eq!(err, Error::BufferLengthMismatch { input: 10, output: 9 });
    assert!(err.is_invalid_argument());

    let err = cipher.set_iv(&[0u8; 8]).expect_err("short nonce must fail");
    assert!(matches!(err, Error::InvalidNonceLength { expected: 12, actual: 8 }));

    let err = cipher.set_counter(1 << 32).expect_err("33-bit counter must fail");
    assert_eq!(err, Error::CounterOutOfRange(1 << 32));

    let mut out = [0u8; 64];
    cipher.apply_keystream(&mut out).expect("within data limit");
    let expected = keystream::<Ietf, R20>(&key, &nonce, BackendTier::Scalar, 0, 64);
    assert_eq!(&out[..], &expected[..], "rejected calls must not disturb the stream");

    let mut wide = ChaCha20Original::new(&key, &[0; 8]).expect("valid key and nonce");
    wide.set_counter(1 << 32).expect("64-bit counter accepts 2^32");
}

#[test]
fn data_limit_is_enforced_before_generation() {
    let mut cipher = ChaCha20::new(&[1; 32], &[2; 12]).expect("valid key and nonce");
    cipher.set_counter(u64::from(u32::MAX) - 2).expect("counter in range");

    let mut buf = [0u8; 100];
    cipher.apply_keystream(&mut buf[..10]).expect("first block is available");
    cipher.apply_keystream(&mut buf[..54]).expect("buffered bytes need no new block");
    cipher.apply_keystream(&mut buf[..64]).expect("second block is available");

    let counter = cipher.counter();
    let err = cipher.apply_keystream(&mut buf[..1]).expect_err("counter exhausted");
    assert_eq!(err, Error::DataLimitExceeded);
    assert!(!err.is_invalid_argument());
    assert_eq!(cipher.counter(), counter, "a rejected update must not move the counter");

    // Wide counters carry past 2^32.
    let mut wide = ChaCha20Original::new(&[1; 32], &[2; 8]).expect("valid key and nonce");
    wide.set_counter(u64::from(u32::MAX)).expect("counter in range");
    wide.apply_keystream(&mut buf).expect("64-bit counter carries on");
}

#[test]
fn wide_counter_never_wraps_to_block_zero() {
    let key = [1u8; 32];
    let nonce = [2u8; 8];

    for tier in BackendTier::ALL {
        let mut cipher =
            ChaCha20Original::with_backend(&key, &nonce, tier).expect("valid key and nonce");
        cipher.set_counter(u64::MAX).expect("u64::MAX is a representable counter");

        let mut buf = [0u8; 128];
        let err = cipher.apply_keystream(&mut buf).expect_err("last block index is reserved");
        assert_eq!(err, Error::DataLimitExceeded, "{tier:?}");
        assert_eq!(cipher.counter(), u64::MAX, "{tier:?}: counter moved on a rejected update");
        assert_eq!(buf, [0u8; 128], "{tier:?}: buffer touched on a rejected update");

        // One block short of the end: exactly one block remains.
        cipher.set_counter(u64::MAX - 1).expect("counter in range");
        cipher.apply_keystream(&mut buf[..64]).expect("final usable block");
        assert_eq!(cipher.counter(), u64::MAX, "{tier:?}");
        let err = cipher.apply_keystream(&mut buf[..1]).expect_err("counter exhausted");
        assert_eq!(err, Error::DataLimitExceeded, "{tier:?}");

        let block_zero = keystream::<Original, R20>(&key, &nonce, tier, 0, BLOCK_SIZE);
        assert_ne!(&buf[..64], &block_zero[..], "{tier:?}: keystream reused block zero");
    }

    let mut salsa = Salsa20::new(&[3; 32], &[4; 8]).expect("valid key and nonce");
    salsa.set_counter(u64::MAX - 1).expect("counter in range");
    let err = salsa.update(&[0u8; 65], &mut [0u8; 65]).expect_err("would run past the range");
    assert_eq!(err, Error::DataLimitExceeded);
    assert_eq!(salsa.counter(), u64::MAX - 1, "a rejected update must not move the counter");
}

//======================================================================
// `cipher` Trait Surface
//======================================================================

#[test]
fn cipher_wrapper_matches_driver() {
    let key = [0x0fu8; 32];
    let nonce = [0xf0u8; 12];
    let mut via_trait = vec![0u8; 1000];
    let mut cipher = ChaCha20Cipher::new(&key.into(), &nonce.into());
    cipher.apply_keystream(&mut via_trait);

    let via_driver = keystream::<Ietf, R20>(&key, &nonce, BackendTier::detect(), 0, 1000);
    assert_eq!(via_trait, via_driver, "trait wrapper and driver must agree");

    let mut tail = vec![0u8; 1000 - 197];
    let mut cipher = ChaCha20Cipher::new(&key.into(), &nonce.into());
    cipher.seek(197u64);
    cipher.apply_keystream(&mut tail);
    assert_eq!(&tail[..], &via_driver[197..], "seeking must land mid-block correctly");
}

#[test]
fn xsalsa20_wrapper_round_trip() {
    let key = [0x01u8; 32];
    let nonce = [0x02u8; 24];
    let plaintext = b"This is a reasonably long test message for the XSalsa20 wrapper.";
    let mut buffer = plaintext.to_vec();

    let mut cipher = XSalsa20Cipher::new(&key.into(), &nonce.into());
    cipher.apply_keystream(&mut buffer);
    assert_ne!(&buffer[..], &plaintext[..], "Ciphertext should not match plaintext");

    let mut cipher = XSalsa20Cipher::new(&key.into(), &nonce.into());
    cipher.apply_keystream(&mut buffer);
    assert_eq!(&buffer[..], &plaintext[..], "Decrypted text should match original");
}
