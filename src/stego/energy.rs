// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Frame energy analysis.
//!
//! Produces a per-sample loudness score in `[0, 1]` used by the order
//! generator to pull embedding positions toward louder passages.
//!
//! Frames start every `hop_size` samples and span up to `frame_size`
//! samples; trailing partial frames are kept and treated as zero-padded.
//! RMS is always computed on the LSB-cleared signal (`x & !1`), so the
//! cover and the stego buffer yield bit-identical profiles.

use crate::stego::config::EnergyParams;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this spread all frames are treated as equally loud.
const FLAT_SPREAD: f64 = 1e-12;

/// Half-open sample range `[start, end)` of one analysis frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub start: usize,
    pub end: usize,
}

/// Frame layout for a buffer of `n` samples.
///
/// One frame per start position `0, hop, 2*hop, ... < n`. Depends only on
/// `n` and the parameters.
pub fn frame_edges(n: usize, frame_size: usize, hop_size: usize) -> Vec<Frame> {
    if frame_size == 0 || hop_size == 0 {
        return Vec::new();
    }
    (0..n)
        .step_by(hop_size)
        .map(|start| Frame { start, end: (start + frame_size).min(n) })
        .collect()
}

fn frame_rms(samples: &[i16], frame: Frame, frame_size: usize) -> f64 {
    let sum_sq: f64 = samples[frame.start..frame.end]
        .iter()
        .map(|&s| {
            let v = (s & !1) as f64;
            v * v
        })
        .sum();
    (sum_sq / frame_size as f64).sqrt()
}

/// RMS of every frame, on the LSB-cleared signal.
pub fn frame_energies(samples: &[i16], frames: &[Frame], frame_size: usize) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        frames.par_iter().map(|&f| frame_rms(samples, f, frame_size)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        frames.iter().map(|&f| frame_rms(samples, f, frame_size)).collect()
    }
}

/// Min-max normalize to `[0, 1]`. A flat input maps to all ones.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread < FLAT_SPREAD {
        return vec![1.0; values.len()];
    }
    values.iter().map(|&v| (v - min) / spread).collect()
}

/// `q`-th percentile (0..=100) with linear interpolation between closest ranks.
///
/// Returns 0 for an empty input.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Compute the per-sample energy profile of `samples`.
///
/// Frame scores are min-max normalized; when `energy_percentile > 0`, frames
/// strictly below that percentile get score 0. Each frame's score is then
/// written over its samples in left-to-right frame order, so where frames
/// overlap the later frame wins.
pub fn energy_profile(samples: &[i16], params: &EnergyParams) -> Vec<f64> {
    let n = samples.len();
    let frames = frame_edges(n, params.frame_size, params.hop_size);
    let rms = frame_energies(samples, &frames, params.frame_size);
    let mut scores = normalize(&rms);

    if params.energy_percentile > 0.0 {
        let threshold = percentile(&scores, params.energy_percentile);
        for s in scores.iter_mut() {
            if *s < threshold {
                *s = 0.0;
            }
        }
    }

    let mut profile = vec![0.0f64; n];
    for (frame, &score) in frames.iter().zip(&scores) {
        profile[frame.start..frame.end].fill(score);
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(frame_size: usize, hop_size: usize, energy_percentile: f64) -> EnergyParams {
        EnergyParams { frame_size, hop_size, energy_percentile }
    }

    #[test]
    fn frame_layout_includes_partial_tail() {
        let f = frame_edges(10, 4, 3);
        assert_eq!(
            f,
            vec![
                Frame { start: 0, end: 4 },
                Frame { start: 3, end: 7 },
                Frame { start: 6, end: 10 },
                Frame { start: 9, end: 10 },
            ]
        );
        assert!(frame_edges(0, 4, 2).is_empty());
    }

    #[test]
    fn rms_ignores_lsb() {
        let a = vec![100i16, -201, 3000, 7];
        let b: Vec<i16> = a.iter().map(|&s| s ^ 1).collect();
        let p = params(2, 1, 0.0);
        assert_eq!(energy_profile(&a, &p), energy_profile(&b, &p));
    }

    #[test]
    fn partial_frame_is_zero_padded() {
        // One full frame of 4 and a tail frame holding a single sample.
        let samples = vec![10i16, 10, 10, 10, 10];
        let frames = frame_edges(samples.len(), 4, 4);
        let rms = frame_energies(&samples, &frames, 4);
        assert!((rms[0] - 10.0).abs() < 1e-12);
        assert!((rms[1] - 5.0).abs() < 1e-12, "tail rms = {}", rms[1]);
    }

    #[test]
    fn normalize_flat_is_ones() {
        assert_eq!(normalize(&[3.0, 3.0, 3.0]), vec![1.0, 1.0, 1.0]);
        assert_eq!(normalize(&[0.0, 5.0, 10.0]), vec![0.0, 0.5, 1.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&v, 0.0), 1.0);
        assert_eq!(percentile(&v, 100.0), 4.0);
        assert!((percentile(&v, 50.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn loud_frame_scores_highest() {
        let mut samples = vec![10i16; 300];
        for s in &mut samples[100..200] {
            *s = 8000;
        }
        let profile = energy_profile(&samples, &params(100, 100, 0.0));
        assert_eq!(profile.len(), 300);
        assert_eq!(profile[150], 1.0);
        assert_eq!(profile[50], 0.0);
        assert_eq!(profile[250], 0.0);
    }

    #[test]
    fn percentile_zeroes_quiet_frames() {
        let mut samples = Vec::new();
        for level in [100i16, 200, 400, 800] {
            samples.extend(std::iter::repeat(level).take(50));
        }
        let profile = energy_profile(&samples, &params(50, 50, 50.0));
        // Normalized scores ~[0, .14, .43, 1]; median ~.29, so the two
        // quietest frames drop to zero and the others keep their score.
        assert_eq!(profile[0], 0.0);
        assert_eq!(profile[60], 0.0);
        assert!(profile[110] > 0.0);
        assert_eq!(profile[199], 1.0);
    }

    #[test]
    fn later_frame_overwrites_overlap() {
        let mut samples = vec![0i16; 20];
        for s in &mut samples[10..20] {
            *s = 1000;
        }
        // Frames: [0,10) quiet, [5,15) half loud, [10,20) loud, [15,20) loud.
        let profile = energy_profile(&samples, &params(10, 5, 0.0));
        // Samples 5..10 belong to frames 0 and 1; frame 1 wins.
        let frames = frame_edges(20, 10, 5);
        let scores = normalize(&frame_energies(&samples, &frames, 10));
        assert_eq!(profile[7], scores[1]);
        assert_eq!(profile[2], scores[0]);
    }

    #[test]
    fn empty_buffer() {
        assert!(energy_profile(&[], &params(1024, 512, 0.0)).is_empty());
    }
}
