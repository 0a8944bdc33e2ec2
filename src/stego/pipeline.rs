// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embed/extract pipeline.
//!
//! Embedding:
//! 1. Energy profile of the LSB-cleared cover
//! 2. Keyed ordering of all sample indices
//! 3. Message → [cipher envelope] → [robustness layer] → header + body
//! 4. Capacity check, then one bit per sample along the ordering
//!
//! Extraction recomputes 1–2 on the stego buffer (identical, since the
//! profile ignores LSBs), then walks the state machine
//! header (64 bits) → preamble → length → body → [robust] → [cipher].
//! Nothing is retried: every failure is a deterministic function of the input.

use tracing::{debug, warn};

use crate::stego::capacity::{max_payload_bytes, required_bits};
use crate::stego::config::StegoConfig;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, Decoded, Integrity, HEADER_BITS, HEADER_LEN};
use crate::stego::lsb;
use crate::stego::permute;

/// Hide `message` in a copy of `cover`.
///
/// # Errors
/// - [`StegoError::InvalidParameters`] / [`StegoError::InvalidKeyLength`] for a
///   bad configuration.
/// - [`StegoError::MessageTooLarge`] if the encoded body exceeds `u32::MAX` bytes.
/// - [`StegoError::Capacity`] if header + body need more than `cover.len()`
///   samples. The cover is never modified.
pub fn embed(cover: &[i16], message: &[u8], config: &StegoConfig) -> Result<Vec<i16>, StegoError> {
    config.validate()?;

    let frame_bytes = frame::encode_frame(message, config)?;
    let body_len = frame_bytes.len() - HEADER_LEN;
    let needed = required_bits(body_len);
    if needed > cover.len() {
        return Err(StegoError::Capacity { needed_bits: needed, available_bits: cover.len() });
    }

    let ordering = permute::generate_order(cover, &config.key, &config.params);
    let bits = frame::bytes_to_bits(&frame_bytes);

    let mut stego = cover.to_vec();
    lsb::embed_bits(&mut stego, &ordering, &bits)?;

    debug!(
        samples = cover.len(),
        message_bytes = message.len(),
        body_bytes = body_len,
        bits = bits.len(),
        cipher = config.use_cipher(),
        robust = config.use_robust(),
        "embedded payload"
    );
    Ok(stego)
}

/// Recover the message hidden in `stego`.
///
/// A robustness checksum failure is not an error at this level: the
/// best-effort message comes back flagged [`Integrity::Mismatch`]. Use
/// [`Decoded::into_verified`] (or [`extract_verified`]) to turn it into
/// [`StegoError::IntegrityError`].
///
/// # Errors
/// - [`StegoError::HeaderMismatch`] for a wrong key, wrong parameters or a
///   buffer with nothing embedded.
/// - [`StegoError::LengthOutOfRange`] if the header declares more bytes than
///   the buffer can carry.
/// - [`StegoError::FrameCorrupted`] if the robustness body is malformed.
/// - [`StegoError::Decryption`] for a wrong cipher key or corrupted ciphertext.
pub fn extract(stego: &[i16], config: &StegoConfig) -> Result<Decoded, StegoError> {
    config.validate()?;

    if stego.len() < HEADER_BITS {
        debug!(samples = stego.len(), "buffer shorter than a header");
        return Err(StegoError::HeaderMismatch);
    }

    let ordering = permute::generate_order(stego, &config.key, &config.params);

    let header_bits = lsb::extract_bits(stego, &ordering, HEADER_BITS)?;
    let header: [u8; HEADER_LEN] = frame::bits_to_bytes(&header_bits)
        .try_into()
        .map_err(|_| StegoError::HeaderMismatch)?;
    let body_len = frame::parse_header(&header)?;

    let available = max_payload_bytes(stego.len());
    if body_len > available {
        return Err(StegoError::LengthOutOfRange { declared_bytes: body_len, available_bytes: available });
    }
    debug!(body_bytes = body_len, "header found");

    let all_bits = lsb::extract_bits(stego, &ordering, required_bits(body_len))?;
    let body = frame::bits_to_bytes(&all_bits[HEADER_BITS..]);
    let decoded = frame::decode_body(&body, config)?;

    if decoded.integrity == Integrity::Mismatch {
        warn!(
            recovered_bytes = decoded.message.len(),
            "payload checksum mismatch, returning best-effort bytes"
        );
    }
    Ok(decoded)
}

/// [`extract`], failing with [`StegoError::IntegrityError`] on a checksum
/// mismatch.
pub fn extract_verified(stego: &[i16], config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    extract(stego, config)?.into_verified()
}

/// Embed into a WAV file held in memory. Returns a mono PCM16 WAV.
#[cfg(feature = "wav")]
pub fn wav_embed(cover_wav: &[u8], message: &[u8], config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    use crate::wav::WavAudio;

    let audio = WavAudio::from_bytes(cover_wav)?;
    let samples = embed(&audio.samples, message, config)?;
    Ok(WavAudio::new(audio.sample_rate, samples).to_bytes()?)
}

/// Extract from a WAV file held in memory.
#[cfg(feature = "wav")]
pub fn wav_extract(stego_wav: &[u8], config: &StegoConfig) -> Result<Decoded, StegoError> {
    let audio = crate::wav::WavAudio::from_bytes(stego_wav)?;
    extract(&audio.samples, config)
}
