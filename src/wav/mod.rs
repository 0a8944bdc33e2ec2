// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Thin WAV container layer around `hound`.
//!
//! The embedding engine works on a mono `i16` sample sequence. This module
//! gets audio in and out of that shape:
//!
//! - only 16-bit integer PCM is accepted
//! - multi-channel input is reduced to its first channel
//! - output is always mono PCM16 at the source sample rate
//!
//! Nothing in `stego` depends on this module.

pub mod error;

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

pub use error::{Result, WavError};

/// Mono 16-bit PCM audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavAudio {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source before mono reduction.
    pub source_channels: u16,
    /// Mono samples (channel 0 of the source).
    pub samples: Vec<i16>,
}

impl WavAudio {
    /// Wrap an existing mono sample buffer.
    pub fn new(sample_rate: u32, samples: Vec<i16>) -> Self {
        Self { sample_rate, source_channels: 1, samples }
    }

    /// Decode a WAV file held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| WavError::Decode(e.to_string()))?;
        Self::from_reader(reader)
    }

    /// Decode a WAV file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(io) => WavError::Io(io),
            other => WavError::Decode(other.to_string()),
        })?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(WavError::UnsupportedFormat {
                bits_per_sample: spec.bits_per_sample,
                float: spec.sample_format == SampleFormat::Float,
            });
        }
        if spec.channels == 0 {
            return Err(WavError::NoChannels);
        }

        let channels = spec.channels as usize;
        let interleaved: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| WavError::Decode(e.to_string()))?;

        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved.iter().step_by(channels).copied().collect()
        };

        Ok(Self { sample_rate: spec.sample_rate, source_channels: spec.channels, samples })
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Encode as a mono PCM16 WAV file in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, self.spec())
                .map_err(|e| WavError::Encode(e.to_string()))?;
            for &s in &self.samples {
                writer.write_sample(s).map_err(|e| WavError::Encode(e.to_string()))?;
            }
            writer.finalize().map_err(|e| WavError::Encode(e.to_string()))?;
        }
        Ok(cursor.into_inner())
    }

    /// Encode as a mono PCM16 WAV file on disk.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_wav(frames: &[(i16, i16)]) -> Vec<u8> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut w = WavWriter::new(&mut cursor, spec).unwrap();
            for &(l, r) in frames {
                w.write_sample(l).unwrap();
                w.write_sample(r).unwrap();
            }
            w.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn mono_roundtrip() {
        let audio = WavAudio::new(44_100, vec![0, 1, -1, i16::MAX, i16::MIN, 1234]);
        let bytes = audio.to_bytes().unwrap();
        let back = WavAudio::from_bytes(&bytes).unwrap();
        assert_eq!(back, audio);
    }

    #[test]
    fn stereo_reduced_to_first_channel() {
        let bytes = stereo_wav(&[(10, -10), (20, -20), (30, -30)]);
        let audio = WavAudio::from_bytes(&bytes).unwrap();
        assert_eq!(audio.samples, vec![10, 20, 30]);
        assert_eq!(audio.source_channels, 2);
        assert_eq!(audio.sample_rate, 8000);
    }

    #[test]
    fn rejects_float_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut w = WavWriter::new(&mut cursor, spec).unwrap();
            w.write_sample(0.5f32).unwrap();
            w.finalize().unwrap();
        }
        let err = WavAudio::from_bytes(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, WavError::UnsupportedFormat { bits_per_sample: 32, float: true }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(WavAudio::from_bytes(b"not a wav"), Err(WavError::Decode(_))));
    }

    #[test]
    fn duration() {
        let audio = WavAudio::new(8000, vec![0; 4000]);
        assert!((audio.duration_secs() - 0.5).abs() < 1e-12);
    }
}
