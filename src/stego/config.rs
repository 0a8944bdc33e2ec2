// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embedding configuration.
//!
//! Every field of [`StegoConfig`] except the message itself must be identical
//! on the embedding and the extracting side. A mismatch in the key or the
//! energy parameters changes the sample ordering, which is what keeps the
//! payload unreadable without them.

use zeroize::Zeroizing;

use crate::stego::crypto;
use crate::stego::error::StegoError;

/// Default analysis frame length in samples.
pub const DEFAULT_FRAME_SIZE: usize = 1024;
/// Default analysis hop in samples.
pub const DEFAULT_HOP_SIZE: usize = 512;
/// Default repetition factor of the robustness layer.
pub const DEFAULT_REPEAT: usize = 3;

/// Energy analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyParams {
    /// Frame length in samples (> 0).
    pub frame_size: usize,
    /// Distance between frame starts in samples (> 0).
    pub hop_size: usize,
    /// Frames below this percentile (0..=100) of normalized energy are
    /// pushed to the back of the ordering. 0 disables gating.
    pub energy_percentile: f64,
}

impl Default for EnergyParams {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            energy_percentile: 0.0,
        }
    }
}

impl EnergyParams {
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.frame_size == 0 {
            return Err(StegoError::InvalidParameters("frame_size must be > 0"));
        }
        if self.hop_size == 0 {
            return Err(StegoError::InvalidParameters("hop_size must be > 0"));
        }
        if !(0.0..=100.0).contains(&self.energy_percentile) {
            return Err(StegoError::InvalidParameters("energy_percentile must be in 0..=100"));
        }
        Ok(())
    }
}

/// Robustness layer settings. Not recorded in the stego signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustConfig {
    /// Copies of each bit (>= 1). Odd values avoid voting ties.
    pub repeat: usize,
    /// Scatter repeated bits with a key-seeded permutation.
    pub interleave: bool,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self { repeat: DEFAULT_REPEAT, interleave: true }
    }
}

impl RobustConfig {
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.repeat == 0 {
            return Err(StegoError::InvalidParameters("repeat factor must be >= 1"));
        }
        Ok(())
    }
}

/// Full configuration for [`embed`](crate::stego::embed) and
/// [`extract`](crate::stego::extract).
#[derive(Clone)]
pub struct StegoConfig {
    pub params: EnergyParams,
    /// Ordering key. Also seeds the interleaver.
    pub key: Zeroizing<Vec<u8>>,
    /// AES key (16, 24 or 32 bytes). `None` leaves the payload in the clear.
    pub cipher_key: Option<Zeroizing<Vec<u8>>>,
    /// `None` disables the robustness layer.
    pub robust: Option<RobustConfig>,
}

impl std::fmt::Debug for StegoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes never go to logs.
        f.debug_struct("StegoConfig")
            .field("params", &self.params)
            .field("key", &"[REDACTED]")
            .field("cipher_key", &self.cipher_key.as_ref().map(|_| "[REDACTED]"))
            .field("robust", &self.robust)
            .finish()
    }
}

impl StegoConfig {
    /// Plain configuration: default energy parameters, no cipher, no
    /// robustness layer.
    pub fn new(key: &[u8]) -> Self {
        Self {
            params: EnergyParams::default(),
            key: Zeroizing::new(key.to_vec()),
            cipher_key: None,
            robust: None,
        }
    }

    /// Derive a 16-byte key from `passphrase` and use it both as the ordering
    /// key and as the AES-128 key.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let key = crypto::derive_key(passphrase, crypto::DEFAULT_KEY_LEN);
        Self {
            params: EnergyParams::default(),
            cipher_key: Some(key.clone()),
            key,
            robust: None,
        }
    }

    pub fn with_params(mut self, params: EnergyParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cipher_key(mut self, cipher_key: &[u8]) -> Self {
        self.cipher_key = Some(Zeroizing::new(cipher_key.to_vec()));
        self
    }

    pub fn without_cipher(mut self) -> Self {
        self.cipher_key = None;
        self
    }

    pub fn with_robust(mut self, robust: RobustConfig) -> Self {
        self.robust = Some(robust);
        self
    }

    pub fn use_cipher(&self) -> bool {
        self.cipher_key.is_some()
    }

    pub fn use_robust(&self) -> bool {
        self.robust.is_some()
    }

    /// Check every parameter. Called at the top of embed and extract.
    pub fn validate(&self) -> Result<(), StegoError> {
        self.params.validate()?;
        if let Some(robust) = &self.robust {
            robust.validate()?;
        }
        if let Some(k) = &self.cipher_key {
            crypto::check_key_len(k)?;
        }
        Ok(())
    }
}
