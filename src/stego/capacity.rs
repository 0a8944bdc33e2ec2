// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Capacity accounting.
//!
//! Every sample carries one bit and every sample is eligible: the energy
//! percentile only changes where a sample lands in the ordering. The first
//! 64 positions hold the header, so a buffer of `n` samples carries at most
//! `(n - 64) / 8` body bytes.

use crate::stego::config::StegoConfig;
use crate::stego::crypto;
use crate::stego::frame::HEADER_BITS;
use crate::stego::robust::CRC_LEN;

/// Sample positions needed to embed a body of `body_len` bytes.
pub fn required_bits(body_len: usize) -> usize {
    HEADER_BITS + 8 * body_len
}

/// Maximum body length in bytes (after cipher and robustness encoding) for
/// a buffer of `n_samples`.
pub fn max_payload_bytes(n_samples: usize) -> usize {
    n_samples.saturating_sub(HEADER_BITS) / 8
}

/// Maximum message length in bytes for `n_samples` under `config`.
///
/// Accounts for the robustness layer (each byte repeated, plus the CRC) and
/// the cipher envelope (IV plus PKCS#7 padding). Returns 0 when not even an
/// empty message fits.
pub fn max_message_bytes(n_samples: usize, config: &StegoConfig) -> usize {
    let mut budget = max_payload_bytes(n_samples);

    if let Some(rc) = &config.robust {
        if rc.repeat == 0 {
            return 0;
        }
        budget = match (budget / rc.repeat).checked_sub(CRC_LEN) {
            Some(b) => b,
            None => return 0,
        };
    }

    if config.use_cipher() {
        budget = crypto::max_plaintext_len(budget).unwrap_or(0);
    }
    budget
}
