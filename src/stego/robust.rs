// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Robustness layer: CRC-32, bit repetition and keyed interleaving.
//!
//! ```text
//! encode: bytes ‖ crc32(bytes) → each bit ×repeat → shuffle (optional)
//! decode: unshuffle → majority vote per group → split and verify crc32
//! ```
//!
//! Repeat factor and interleave flag are out-of-band: they are not stored in
//! the signal and must be supplied identically on both sides.
//!
//! The interleaver is a Fisher-Yates shuffle driven by its own ChaCha20
//! stream, seeded from the key, a domain tag, the bit count and the repeat
//! factor, so it never shares draws with the sample ordering.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::stego::config::RobustConfig;
use crate::stego::error::StegoError;
use crate::stego::frame::{bits_to_bytes, bytes_to_bits};

/// Domain separation tag for the interleaver seed.
const INTERLEAVE_TAG: &[u8; 4] = b"RBST";

/// Length of the appended checksum in bytes.
pub const CRC_LEN: usize = 4;

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobustDecoded {
    /// Recovered payload with the checksum stripped.
    pub payload: Vec<u8>,
    /// `true` if the recomputed CRC-32 matched the stored one.
    pub intact: bool,
}

/// Encoded length for a `payload_len`-byte input.
pub fn encoded_len(payload_len: usize, repeat: usize) -> usize {
    (payload_len + CRC_LEN) * repeat
}

fn interleave_seed(key: &[u8], n_bits: usize, repeat: usize) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(key);
    h.update(INTERLEAVE_TAG);
    h.update((n_bits as u64).to_be_bytes());
    h.update((repeat as u32).to_be_bytes());
    h.finalize().into()
}

/// Keyed permutation of `0..n`: output position `i` takes input `perm[i]`.
///
/// Uses `u32` for `gen_range` so 32- and 64-bit targets consume the same
/// entropy per step.
pub fn interleave_permutation(n: usize, key: &[u8], repeat: usize) -> Vec<usize> {
    let mut rng = ChaCha20Rng::from_seed(interleave_seed(key, n, repeat));
    let mut perm: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=(i as u32)) as usize;
        perm.swap(i, j);
    }
    perm
}

/// Repeat each bit `repeat` times, copies adjacent.
pub fn repeat_bits(bits: &[u8], repeat: usize) -> Vec<u8> {
    bits.iter().flat_map(|&b| std::iter::repeat(b).take(repeat)).collect()
}

/// Majority vote over consecutive groups of `repeat` bits.
///
/// A tie (only possible for even `repeat`) resolves to 1.
pub fn majority_vote(bits: &[u8], repeat: usize) -> Vec<u8> {
    bits.chunks(repeat)
        .map(|group| {
            let ones = group.iter().filter(|&&b| b & 1 == 1).count();
            u8::from(2 * ones >= group.len())
        })
        .collect()
}

/// Protect `payload` with checksum, repetition and (optionally) interleaving.
pub fn encode(payload: &[u8], config: &RobustConfig, key: &[u8]) -> Result<Vec<u8>, StegoError> {
    config.validate()?;

    let mut inner = Vec::with_capacity(payload.len() + CRC_LEN);
    inner.extend_from_slice(payload);
    inner.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());

    let repeated = repeat_bits(&bytes_to_bits(&inner), config.repeat);
    let bits = if config.interleave {
        let perm = interleave_permutation(repeated.len(), key, config.repeat);
        perm.iter().map(|&src| repeated[src]).collect()
    } else {
        repeated
    };
    Ok(bits_to_bytes(&bits))
}

/// Undo [`encode`].
///
/// # Errors
/// [`StegoError::FrameCorrupted`] if `encoded` is not a whole number of
/// repeated bytes or is too short to hold the checksum. A checksum mismatch
/// is not an error here: it is reported through [`RobustDecoded::intact`].
pub fn decode(encoded: &[u8], config: &RobustConfig, key: &[u8]) -> Result<RobustDecoded, StegoError> {
    config.validate()?;
    if encoded.len() % config.repeat != 0 || encoded.len() / config.repeat < CRC_LEN {
        return Err(StegoError::FrameCorrupted);
    }

    let received = bytes_to_bits(encoded);
    let bits = if config.interleave {
        let perm = interleave_permutation(received.len(), key, config.repeat);
        let mut restored = vec![0u8; received.len()];
        for (pos, &src) in perm.iter().enumerate() {
            restored[src] = received[pos];
        }
        restored
    } else {
        received
    };

    let inner = bits_to_bytes(&majority_vote(&bits, config.repeat));
    let (payload, crc_bytes) = inner.split_at(inner.len() - CRC_LEN);
    let stored = u32::from_be_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let intact = crc32fast::hash(payload) == stored;

    Ok(RobustDecoded { payload: payload.to_vec(), intact })
}
