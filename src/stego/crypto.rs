// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Cipher envelope and key helpers.
//!
//! The envelope is AES-CBC with PKCS#7 padding and a fresh random IV per
//! message:
//!
//! ```text
//! [16 bytes ] IV
//! [k*16 bytes] ciphertext (PKCS#7 padded, k >= 1)
//! ```
//!
//! The key length picks the AES variant (16 → AES-128, 24 → AES-192,
//! 32 → AES-256). The envelope carries no MAC: a wrong key is detected only
//! through inconsistent padding, which is reported as
//! [`DecryptionError::PaddingInvalid`].

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::stego::error::{DecryptionError, StegoError};

/// IV length in bytes.
pub const IV_LEN: usize = 16;
/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;
/// Key length produced by [`derive_key`] when no other length is needed.
pub const DEFAULT_KEY_LEN: usize = 16;

/// Derive key bytes from a passphrase: SHA-256 of its UTF-8 bytes, truncated
/// to `len` (at most 32) bytes.
pub fn derive_key(passphrase: &str, len: usize) -> Zeroizing<Vec<u8>> {
    let digest = Sha256::digest(passphrase.as_bytes());
    Zeroizing::new(digest[..len.min(digest.len())].to_vec())
}

/// 32-byte PRNG seed from arbitrary key bytes (SHA-256).
pub fn seed_from_key(key: &[u8]) -> [u8; 32] {
    Sha256::digest(key).into()
}

/// Reject keys that are not a valid AES key length.
pub fn check_key_len(key: &[u8]) -> Result<(), StegoError> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        n => Err(StegoError::InvalidKeyLength(n)),
    }
}

/// Size of the envelope for a plaintext of `plaintext_len` bytes.
pub fn envelope_len(plaintext_len: usize) -> usize {
    IV_LEN + (plaintext_len / BLOCK_LEN + 1) * BLOCK_LEN
}

/// Largest plaintext whose envelope fits in `budget` bytes.
pub fn max_plaintext_len(budget: usize) -> Option<usize> {
    let blocks = budget.checked_sub(IV_LEN)? / BLOCK_LEN;
    // PKCS#7 always adds at least one byte.
    (blocks * BLOCK_LEN).checked_sub(1)
}

fn cbc_encrypt(key: &[u8], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>, StegoError> {
    let ct = match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        n => return Err(StegoError::InvalidKeyLength(n)),
    };
    Ok(ct)
}

fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, StegoError> {
    let pt = match key.len() {
        16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| StegoError::InvalidKeyLength(key.len()))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        n => return Err(StegoError::InvalidKeyLength(n)),
    };
    pt.map_err(|_| DecryptionError::PaddingInvalid.into())
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Returns `IV ‖ ciphertext`.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);
    encrypt_with_iv(plaintext, key, &iv)
}

/// Encrypt with a caller-provided IV. Only useful for reproducible tests;
/// [`encrypt`] is the normal entry point.
pub fn encrypt_with_iv(plaintext: &[u8], key: &[u8], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, StegoError> {
    let ct = cbc_encrypt(key, iv, plaintext)?;
    let mut out = Vec::with_capacity(IV_LEN + ct.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Decrypt an `IV ‖ ciphertext` envelope.
///
/// # Errors
/// - [`StegoError::InvalidKeyLength`] if `key` is not 16/24/32 bytes.
/// - [`DecryptionError::Malformed`] if the envelope is too short or not
///   block-aligned.
/// - [`DecryptionError::PaddingInvalid`] on a wrong key or corrupted data.
pub fn decrypt(envelope: &[u8], key: &[u8]) -> Result<Vec<u8>, StegoError> {
    check_key_len(key)?;
    if envelope.len() < IV_LEN + BLOCK_LEN || (envelope.len() - IV_LEN) % BLOCK_LEN != 0 {
        return Err(DecryptionError::Malformed.into());
    }
    let (iv, ct) = envelope.split_at(IV_LEN);
    cbc_decrypt(key, iv, ct)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = *b"0123456789abcdef";

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let msg = b"Hello, steganography!";
        let env = encrypt(msg, &KEY).unwrap();
        assert_eq!(decrypt(&env, &KEY).unwrap(), msg);
    }

    #[test]
    fn all_key_sizes() {
        for len in [16usize, 24, 32] {
            let key = vec![7u8; len];
            let env = encrypt(b"abc", &key).unwrap();
            assert_eq!(decrypt(&env, &key).unwrap(), b"abc");
        }
    }

    #[test]
    fn empty_message_is_one_padding_block() {
        let env = encrypt(b"", &KEY).unwrap();
        assert_eq!(env.len(), IV_LEN + BLOCK_LEN);
        assert_eq!(decrypt(&env, &KEY).unwrap(), b"");
    }

    #[test]
    fn envelope_sizes() {
        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let env = encrypt(&vec![0xAB; len], &KEY).unwrap();
            assert_eq!(env.len(), envelope_len(len), "len {len}");
            assert_eq!((env.len() - IV_LEN) % BLOCK_LEN, 0);
        }
    }

    #[test]
    fn max_plaintext_fits_budget() {
        assert_eq!(max_plaintext_len(31), None);
        assert_eq!(max_plaintext_len(32), Some(15));
        assert_eq!(max_plaintext_len(47), Some(15));
        assert_eq!(max_plaintext_len(48), Some(31));
        for budget in 32..200 {
            let m = max_plaintext_len(budget).unwrap();
            assert!(envelope_len(m) <= budget);
            assert!(envelope_len(m + 1) > budget);
        }
    }

    #[test]
    fn fresh_iv_per_call() {
        let a = encrypt(b"same message", &KEY).unwrap();
        let b = encrypt(b"same message", &KEY).unwrap();
        assert_ne!(a[..IV_LEN], b[..IV_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_iv_is_deterministic() {
        let iv = [9u8; IV_LEN];
        let a = encrypt_with_iv(b"xyz", &KEY, &iv).unwrap();
        let b = encrypt_with_iv(b"xyz", &KEY, &iv).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..IV_LEN], &iv);
    }

    #[test]
    fn wrong_key_fails() {
        // With a fixed IV and a 15-byte message the last block ends in a single
        // 0x01 padding byte. Find a wrong key that does not accidentally
        // produce valid padding (probability ~1/256 per key).
        let iv = [3u8; IV_LEN];
        let env = encrypt_with_iv(b"fifteen bytes!!", &KEY, &iv).unwrap();
        let failures = (0u8..16)
            .filter(|&i| {
                let wrong = [i.wrapping_add(100); 16];
                matches!(
                    decrypt(&env, &wrong),
                    Err(StegoError::Decryption(DecryptionError::PaddingInvalid))
                )
            })
            .count();
        assert!(failures >= 14, "only {failures}/16 wrong keys rejected");
    }

    #[test]
    fn malformed_envelopes() {
        assert!(matches!(
            decrypt(&[0u8; 16], &KEY),
            Err(StegoError::Decryption(DecryptionError::Malformed))
        ));
        assert!(matches!(
            decrypt(&[0u8; 40], &KEY),
            Err(StegoError::Decryption(DecryptionError::Malformed))
        ));
    }

    #[test]
    fn bad_key_length() {
        assert!(matches!(encrypt(b"x", &[0u8; 10]), Err(StegoError::InvalidKeyLength(10))));
        assert!(matches!(decrypt(&[0u8; 32], &[0u8; 10]), Err(StegoError::InvalidKeyLength(10))));
    }

    #[test]
    fn derive_key_truncates_sha256() {
        let k16 = derive_key("correct horse battery staple", 16);
        let k32 = derive_key("correct horse battery staple", 32);
        assert_eq!(k16.len(), 16);
        assert_eq!(&k32[..16], &k16[..]);
        assert_eq!(derive_key("pw", 64).len(), 32);
        assert_ne!(derive_key("a", 16), derive_key("b", 16));
    }

    #[test]
    fn seed_is_sha256() {
        // SHA-256("abc")
        let seed = seed_from_key(b"abc");
        assert_eq!(seed[..4], [0xba, 0x78, 0x16, 0xbf]);
    }
}
