// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from parameter validation through
//! header parsing, decryption and integrity verification. Every failure is a
//! deterministic function of the inputs, so nothing here is retryable.

use core::fmt;

/// Why the cipher envelope could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionError {
    /// PKCS#7 padding bytes are inconsistent. This is what a wrong cipher key
    /// or corrupted ciphertext looks like.
    PaddingInvalid,
    /// The envelope is shorter than IV + one block, or the ciphertext body is
    /// not a whole number of blocks.
    Malformed,
}

impl fmt::Display for DecryptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaddingInvalid => write!(f, "invalid padding (wrong key or corrupted data)"),
            Self::Malformed => write!(f, "malformed ciphertext envelope"),
        }
    }
}

/// Errors that can occur during steganographic embedding or extraction.
#[derive(Debug)]
pub enum StegoError {
    /// Frame size, hop size, percentile or repeat factor is out of range.
    InvalidParameters(&'static str),
    /// The cipher key is not 16, 24 or 32 bytes long.
    InvalidKeyLength(usize),
    /// The encoded payload does not fit the 32-bit length field of the header.
    MessageTooLarge,
    /// Header + payload need more sample positions than the buffer has.
    /// Raised before any sample is modified.
    Capacity { needed_bits: usize, available_bits: usize },
    /// The preamble read from the first 64 ordered samples is not `ASTG`.
    HeaderMismatch,
    /// The header declares more payload bytes than the buffer can hold.
    LengthOutOfRange { declared_bytes: usize, available_bytes: usize },
    /// The robustness-encoded body is structurally malformed.
    FrameCorrupted,
    /// The cipher envelope could not be decrypted.
    Decryption(DecryptionError),
    /// The robustness checksum did not match. `recovered` holds the
    /// best-effort bytes after majority voting (and decryption, if enabled).
    IntegrityError { recovered: Vec<u8> },
    /// The audio container could not be read or written.
    #[cfg(feature = "wav")]
    Wav(crate::wav::WavError),
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters(what) => write!(f, "invalid parameters: {what}"),
            Self::InvalidKeyLength(n) => {
                write!(f, "cipher key must be 16, 24 or 32 bytes, got {n}")
            }
            Self::MessageTooLarge => write!(f, "payload exceeds the 32-bit length field"),
            Self::Capacity { needed_bits, available_bits } => write!(
                f,
                "payload too large: needs {needed_bits} sample positions, have {available_bits}"
            ),
            Self::HeaderMismatch => write!(f, "no hidden message found or wrong key"),
            Self::LengthOutOfRange { declared_bytes, available_bytes } => write!(
                f,
                "header declares {declared_bytes} payload bytes but only {available_bytes} fit"
            ),
            Self::FrameCorrupted => write!(f, "robustness frame is malformed"),
            Self::Decryption(e) => write!(f, "decryption failed: {e}"),
            Self::IntegrityError { recovered } => write!(
                f,
                "payload checksum mismatch ({} bytes recovered, possibly corrupted)",
                recovered.len()
            ),
            #[cfg(feature = "wav")]
            Self::Wav(e) => write!(f, "wav: {e}"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "wav")]
            Self::Wav(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecryptionError> for StegoError {
    fn from(e: DecryptionError) -> Self {
        Self::Decryption(e)
    }
}

#[cfg(feature = "wav")]
impl From<crate::wav::WavError> for StegoError {
    fn from(e: crate::wav::WavError) -> Self {
        Self::Wav(e)
    }
}
