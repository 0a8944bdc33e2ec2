// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for WAV decoding and encoding.

use std::fmt;

/// Errors that can occur while reading or writing a WAV container.
#[derive(Debug)]
pub enum WavError {
    /// The input is not a readable RIFF/WAVE stream.
    Decode(String),
    /// The output could not be written.
    Encode(String),
    /// Only 16-bit integer PCM is supported.
    UnsupportedFormat { bits_per_sample: u16, float: bool },
    /// The file declares zero channels.
    NoChannels,
    /// Underlying file system error.
    Io(std::io::Error),
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "cannot decode WAV: {msg}"),
            Self::Encode(msg) => write!(f, "cannot encode WAV: {msg}"),
            Self::UnsupportedFormat { bits_per_sample, float } => write!(
                f,
                "only 16-bit PCM is supported, got {bits_per_sample}-bit {}",
                if *float { "float" } else { "integer" }
            ),
            Self::NoChannels => write!(f, "WAV has no channels"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for WavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WavError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, WavError>;
