// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! LSB read/write along an ordering.
//!
//! Bit `i` lives in the least significant bit of `samples[ordering[i]]`.
//! Writing changes a sample by at most 1; samples beyond the first
//! `bits.len()` ordered positions are never touched.

use crate::stego::error::StegoError;

/// The positions `ordering[..n_bits]` must exist in a buffer of `len` samples.
fn check_positions(len: usize, ordering: &[usize], n_bits: usize) -> Result<(), StegoError> {
    if n_bits > ordering.len() || n_bits > len {
        return Err(StegoError::Capacity {
            needed_bits: n_bits,
            available_bits: ordering.len().min(len),
        });
    }
    if ordering[..n_bits].iter().any(|&idx| idx >= len) {
        return Err(StegoError::InvalidParameters("ordering index out of range"));
    }
    Ok(())
}

/// Write `bits` into `samples` along `ordering`, in place.
///
/// Fails before touching any sample: with [`StegoError::Capacity`] if there
/// are more bits than ordered positions or samples, and with
/// [`StegoError::InvalidParameters`] if a used position lies outside
/// `samples`.
pub fn embed_bits(samples: &mut [i16], ordering: &[usize], bits: &[u8]) -> Result<(), StegoError> {
    check_positions(samples.len(), ordering, bits.len())?;
    for (&idx, &bit) in ordering.iter().zip(bits) {
        samples[idx] = (samples[idx] & !1) | i16::from(bit & 1);
    }
    Ok(())
}

/// Read `n_bits` LSBs along `ordering`.
///
/// Any sample yields a valid bit, so a wrong key is not detected here; it
/// shows up later as a header mismatch or a decryption failure.
pub fn extract_bits(samples: &[i16], ordering: &[usize], n_bits: usize) -> Result<Vec<u8>, StegoError> {
    check_positions(samples.len(), ordering, n_bits)?;
    Ok(ordering[..n_bits].iter().map(|&idx| (samples[idx] & 1) as u8).collect())
}
