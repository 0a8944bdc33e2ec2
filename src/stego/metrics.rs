// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Distortion and recovery metrics.

use crate::stego::error::StegoError;

/// Guard against log of zero.
const TINY: f64 = 1e-12;

fn to_unit(s: i16) -> f64 {
    s as f64 / 32768.0
}

/// Signal-to-noise ratio of `stego` against `cover` in dB.
///
/// Both signals are scaled by their common peak first. Only the overlapping
/// prefix is compared. Identical signals give a large finite value (the
/// noise power is floored at 1e-12).
pub fn snr_db(cover: &[i16], stego: &[i16]) -> f64 {
    let n = cover.len().min(stego.len());
    if n == 0 {
        return 0.0;
    }
    let peak = cover[..n]
        .iter()
        .chain(&stego[..n])
        .map(|&s| to_unit(s).abs())
        .fold(TINY, f64::max);

    let mut p_sig = 0.0;
    let mut p_noise = 0.0;
    for (&c, &s) in cover[..n].iter().zip(&stego[..n]) {
        let x = to_unit(c) / peak;
        let y = to_unit(s) / peak;
        p_sig += x * x;
        p_noise += (y - x) * (y - x);
    }
    let p_sig = p_sig / n as f64 + TINY;
    let p_noise = p_noise / n as f64 + TINY;
    10.0 * (p_sig / p_noise).log10()
}

/// Fraction of positions where the two bit sequences differ.
///
/// Empty input gives 0. Sequences of different length are an error.
pub fn bit_error_rate(a: &[u8], b: &[u8]) -> Result<f64, StegoError> {
    if a.len() != b.len() {
        return Err(StegoError::InvalidParameters("bit sequences must have equal length"));
    }
    if a.is_empty() {
        return Ok(0.0);
    }
    let errors = a.iter().zip(b).filter(|(x, y)| (*x & 1) != (*y & 1)).count();
    Ok(errors as f64 / a.len() as f64)
}

/// Per-sample modification counts between a cover and its stego version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeStats {
    /// Samples compared (the overlapping prefix).
    pub samples_total: usize,
    /// Samples whose value differs at all.
    pub samples_changed: usize,
    /// Samples whose least significant bit differs.
    pub lsb_changed: usize,
}

impl ChangeStats {
    /// `samples_changed / samples_total`, 0 for an empty comparison.
    pub fn fraction_changed(&self) -> f64 {
        if self.samples_total == 0 {
            return 0.0;
        }
        self.samples_changed as f64 / self.samples_total as f64
    }

    /// Fraction of compared samples whose LSB was flipped.
    pub fn lsb_ber(&self) -> f64 {
        if self.samples_total == 0 {
            return 0.0;
        }
        self.lsb_changed as f64 / self.samples_total as f64
    }
}

/// Count changed samples and flipped LSBs over the overlapping prefix.
pub fn lsb_change_stats(cover: &[i16], stego: &[i16]) -> ChangeStats {
    let n = cover.len().min(stego.len());
    let mut stats = ChangeStats { samples_total: n, ..ChangeStats::default() };
    for (&c, &s) in cover[..n].iter().zip(&stego[..n]) {
        if c != s {
            stats.samples_changed += 1;
        }
        if (c ^ s) & 1 != 0 {
            stats.lsb_changed += 1;
        }
    }
    stats
}
