// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # astg-core
//!
//! Keyed, energy-adaptive LSB steganography for 16-bit PCM audio.
//!
//! A payload is written one bit per sample into the least significant bit
//! of samples visited in a key-dependent order that favours loud passages.
//! The order depends only on the key, the analysis parameters and the
//! LSB-cleared signal, so the receiver can rebuild it from the stego audio.
//! Optional layers encrypt the payload (AES-CBC) and protect it against
//! random bit flips (CRC-32 + repetition + interleaving).
//!
//! The engine (`stego` module) works on `&[i16]` and does no I/O. The `wav`
//! module (default `wav` feature) reads and writes mono PCM16 WAV files.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use astg_core::{embed, extract, StegoConfig};
//!
//! let cover: Vec<i16> = load_samples();
//! let config = StegoConfig::from_passphrase("correct horse battery staple");
//! let stego = embed(&cover, b"secret message", &config).unwrap();
//! let decoded = extract(&stego, &config).unwrap();
//! assert_eq!(decoded.message, b"secret message");
//! ```

pub mod stego;
#[cfg(feature = "wav")]
pub mod wav;

pub use stego::{embed, extract, extract_verified, StegoError, DecryptionError};
pub use stego::{StegoConfig, EnergyParams, RobustConfig, Decoded, Integrity};
pub use stego::{max_message_bytes, max_payload_bytes};
pub use stego::crypto::derive_key;
pub use stego::metrics::{snr_db, bit_error_rate, lsb_change_stats, ChangeStats};
#[cfg(feature = "wav")]
pub use stego::{wav_embed, wav_extract};
#[cfg(feature = "wav")]
pub use wav::{WavAudio, WavError};
