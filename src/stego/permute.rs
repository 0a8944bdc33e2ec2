// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed, energy-weighted sample ordering.
//!
//! Every sample index gets a sort key `r / (score + EPS)` where `r` is a
//! uniform draw from a ChaCha20 stream seeded with SHA-256 of the key and
//! `score` is the sample's energy score. Sorting ascending with a stable
//! sort gives the order in which samples carry payload bits: loud samples
//! tend to come first, and nobody without the key can reproduce the order.
//!
//! # Cross-platform portability
//!
//! Draws are taken from `next_u64` (top 53 bits scaled to `[0, 1)`), one per
//! index in ascending order, rather than through `Rng::gen::<f64>()`. The
//! stream consumed per index is then fixed at 8 bytes regardless of platform
//! or `rand` version. The ordering is computed once for all `n` indices, so
//! any prefix of it is independent of how many bits are later embedded.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::stego::config::EnergyParams;
use crate::stego::crypto::seed_from_key;
use crate::stego::energy::energy_profile;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Keeps silent frames (score 0) finite in the sort key.
pub const EPS: f64 = 1e-6;

const F53: f64 = 1.0 / (1u64 << 53) as f64;

/// Uniform `f64` in `[0, 1)` from the top 53 bits of one `u64` draw.
#[inline]
fn unit_f64(rng: &mut ChaCha20Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 * F53
}

/// `n` uniform draws, index-ascending, from the stream seeded by `seed`.
pub fn uniform_draws(seed: &[u8; 32], n: usize) -> Vec<f64> {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    (0..n).map(|_| unit_f64(&mut rng)).collect()
}

/// Sort indices `0..r.len()` by `r[i] / (scores[i] + EPS)`, ascending and stable.
pub fn order_from_scores(r: &[f64], scores: &[f64]) -> Vec<usize> {
    debug_assert_eq!(r.len(), scores.len());

    #[cfg(feature = "parallel")]
    let keys: Vec<f64> = r.par_iter().zip(scores.par_iter()).map(|(&r, &s)| r / (s + EPS)).collect();
    #[cfg(not(feature = "parallel"))]
    let keys: Vec<f64> = r.iter().zip(scores).map(|(&r, &s)| r / (s + EPS)).collect();

    let mut order: Vec<usize> = (0..keys.len()).collect();

    // Both sorts are stable: equal keys keep ascending index order.
    #[cfg(feature = "parallel")]
    order.par_sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));
    #[cfg(not(feature = "parallel"))]
    order.sort_by(|&a, &b| keys[a].total_cmp(&keys[b]));

    order
}

/// Produce the embedding order for `samples` under `key` and `params`.
///
/// The result is a permutation of `0..samples.len()` and depends only on
/// the length, the key, the parameters and the LSB-cleared sample values.
/// An empty buffer gives an empty ordering.
pub fn generate_order(samples: &[i16], key: &[u8], params: &EnergyParams) -> Vec<usize> {
    let scores = energy_profile(samples, params);
    let r = uniform_draws(&seed_from_key(key), samples.len());
    order_from_scores(&r, &scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EnergyParams {
        EnergyParams { frame_size: 100, hop_size: 50, energy_percentile: 0.0 }
    }

    fn tone(n: usize) -> Vec<i16> {
        (0..n).map(|i| (((i * 37) % 2000) as i16 - 1000) * ((i / 250 % 4) as i16 + 1)).collect()
    }

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        order.len() == n
            && order.iter().all(|&i| i < n && !std::mem::replace(&mut seen[i], true))
    }

    #[test]
    fn deterministic() {
        let s = tone(1000);
        assert_eq!(generate_order(&s, b"k1", &params()), generate_order(&s, b"k1", &params()));
    }

    #[test]
    fn is_a_permutation() {
        for n in [1usize, 2, 7, 100, 1001] {
            let order = generate_order(&tone(n), b"key", &params());
            assert!(is_permutation(&order, n), "n={n}");
        }
    }

    #[test]
    fn empty_buffer() {
        assert!(generate_order(&[], b"key", &params()).is_empty());
    }

    #[test]
    fn different_keys_differ() {
        let s = tone(1000);
        assert_ne!(generate_order(&s, b"k1", &params()), generate_order(&s, b"k2", &params()));
    }

    #[test]
    fn different_params_differ() {
        let s = tone(1000);
        let other = EnergyParams { frame_size: 64, hop_size: 32, energy_percentile: 0.0 };
        assert_ne!(generate_order(&s, b"k1", &params()), generate_order(&s, b"k1", &other));
    }

    #[test]
    fn independent_of_lsbs() {
        let cover = tone(1000);
        let flipped: Vec<i16> = cover.iter().enumerate().map(|(i, &s)| if i % 3 == 0 { s ^ 1 } else { s }).collect();
        assert_eq!(generate_order(&cover, b"k", &params()), generate_order(&flipped, b"k", &params()));
    }

    #[test]
    fn draws_in_unit_interval_and_prefix_stable() {
        let seed = seed_from_key(b"k");
        let long = uniform_draws(&seed, 500);
        let short = uniform_draws(&seed, 100);
        assert_eq!(&long[..100], &short[..]);
        assert!(long.iter().all(|&r| (0.0..1.0).contains(&r)));
    }

    #[test]
    fn ties_keep_index_order() {
        let r = vec![0.5; 6];
        let scores = vec![1.0; 6];
        assert_eq!(order_from_scores(&r, &scores), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn energy_pulls_indices_forward() {
        // Equal draws; the loud index sorts first.
        let r = vec![0.5, 0.5, 0.5];
        let scores = vec![0.0, 1.0, 0.1];
        assert_eq!(order_from_scores(&r, &scores), vec![1, 2, 0]);
    }

    #[test]
    fn loud_region_dominates_prefix() {
        let mut s = vec![2i16; 2000];
        for x in &mut s[1000..1500] {
            *x = 20_000;
        }
        let order = generate_order(&s, b"bias", &params());
        // Frames straddling the edges reach 50 samples past either side.
        let head = &order[..200];
        let loud = head.iter().filter(|&&i| (950..1550).contains(&i)).count();
        assert!(loud >= 198, "only {loud}/200 leading positions in the loud region");
    }
}
