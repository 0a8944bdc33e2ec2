// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Keyed, energy-adaptive LSB embedding for 16-bit PCM audio.
//!
//! - **Energy analysis** (`energy`): per-sample loudness from frame RMS of
//!   the LSB-cleared signal.
//! - **Ordering** (`permute`): ChaCha20 draws weighted by loudness, stably
//!   sorted into a reproducible permutation of sample indices.
//! - **Frame** (`frame`): `ASTG` preamble + length header, body composition.
//! - **Cipher envelope** (`crypto`): AES-CBC + PKCS#7, random IV.
//! - **Robustness** (`robust`): CRC-32, repetition, keyed interleave.
//! - **LSB engine** (`lsb`): one bit per ordered sample.
//!
//! [`embed`] and [`extract`] tie these together.

pub mod error;
pub mod config;
pub mod energy;
pub mod permute;
pub mod crypto;
pub mod robust;
pub mod frame;
pub mod lsb;
pub mod capacity;
pub mod metrics;
mod pipeline;

pub use error::{DecryptionError, StegoError};
pub use config::{EnergyParams, RobustConfig, StegoConfig};
pub use frame::{Decoded, Integrity};
pub use pipeline::{embed, extract, extract_verified};
#[cfg(feature = "wav")]
pub use pipeline::{wav_embed, wav_extract};
pub use capacity::{max_message_bytes, max_payload_bytes};
