// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload frame construction and parsing.
//!
//! The frame is what gets written, one bit per sample, along the ordering:
//!
//! ```text
//! [4 bytes] preamble "ASTG"
//! [4 bytes] body length in bytes (big-endian u32)
//! [N bytes] body
//! ```
//!
//! The body is the message, optionally wrapped by the cipher envelope and
//! then by the robustness layer (encrypt first, so redundancy also covers the
//! ciphertext). The header itself is never encrypted or repeated: it must be
//! readable from the first 64 ordered samples before anything else is known.

use crate::stego::config::StegoConfig;
use crate::stego::crypto;
use crate::stego::error::StegoError;
use crate::stego::robust;

/// Synchronization constant at the start of every frame.
pub const PREAMBLE: [u8; 4] = *b"ASTG";

/// Header length in bytes (preamble + length).
pub const HEADER_LEN: usize = 8;

/// Header length in bits.
pub const HEADER_BITS: usize = HEADER_LEN * 8;

/// Whether the checksum of the robustness layer was verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Robustness layer disabled; nothing to check.
    NotChecked,
    /// CRC matched.
    Verified,
    /// CRC mismatch. The bytes are a best-effort recovery.
    Mismatch,
}

/// A decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub message: Vec<u8>,
    pub integrity: Integrity,
}

impl Decoded {
    /// The message, or [`StegoError::IntegrityError`] carrying the
    /// best-effort bytes if the checksum failed.
    pub fn into_verified(self) -> Result<Vec<u8>, StegoError> {
        match self.integrity {
            Integrity::Mismatch => Err(StegoError::IntegrityError { recovered: self.message }),
            Integrity::NotChecked | Integrity::Verified => Ok(self.message),
        }
    }
}

/// Build the 8-byte header for a body of `body_len` bytes.
pub fn build_header(body_len: usize) -> Result<[u8; HEADER_LEN], StegoError> {
    let len = u32::try_from(body_len).map_err(|_| StegoError::MessageTooLarge)?;
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&PREAMBLE);
    header[4..].copy_from_slice(&len.to_be_bytes());
    Ok(header)
}

/// Parse a header, returning the declared body length in bytes.
///
/// Returns [`StegoError::HeaderMismatch`] if the preamble is wrong, which is
/// what a wrong key, wrong parameters or a clean cover produce.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<usize, StegoError> {
    if header[..4] != PREAMBLE {
        return Err(StegoError::HeaderMismatch);
    }
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    Ok(len as usize)
}

/// Wrap `message` into a body: cipher envelope, then robustness layer.
pub fn encode_body(message: &[u8], config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    let mut body = match &config.cipher_key {
        Some(k) => crypto::encrypt(message, k)?,
        None => message.to_vec(),
    };
    if let Some(rc) = &config.robust {
        body = robust::encode(&body, rc, &config.key)?;
    }
    Ok(body)
}

/// Unwrap a body: robustness layer, then cipher envelope.
///
/// A checksum mismatch does not stop decoding: the best-effort bytes still
/// go through decryption and the result is flagged [`Integrity::Mismatch`].
/// If decryption then fails, the damage is reported as
/// [`StegoError::IntegrityError`] carrying the undecrypted envelope, so it
/// cannot be mistaken for a wrong cipher key.
pub fn decode_body(body: &[u8], config: &StegoConfig) -> Result<Decoded, StegoError> {
    let (inner, integrity) = match &config.robust {
        Some(rc) => {
            let r = robust::decode(body, rc, &config.key)?;
            let integrity = if r.intact { Integrity::Verified } else { Integrity::Mismatch };
            (r.payload, integrity)
        }
        None => (body.to_vec(), Integrity::NotChecked),
    };
    let message = match &config.cipher_key {
        Some(k) => match crypto::decrypt(&inner, k) {
            Ok(plain) => plain,
            Err(StegoError::Decryption(_)) if integrity == Integrity::Mismatch => {
                return Err(StegoError::IntegrityError { recovered: inner });
            }
            Err(e) => return Err(e),
        },
        None => inner,
    };
    Ok(Decoded { message, integrity })
}

/// Full frame bytes (header + body) for `message`.
pub fn encode_frame(message: &[u8], config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    let body = encode_body(message, config)?;
    let header = build_header(body.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&header);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode from already-extracted header and body bits (MSB-first).
pub fn decode_frame(header_bits: &[u8], body_bits: &[u8], config: &StegoConfig) -> Result<Decoded, StegoError> {
    let header: [u8; HEADER_LEN] = bits_to_bytes(header_bits)
        .try_into()
        .map_err(|_| StegoError::HeaderMismatch)?;
    let len = parse_header(&header)?;
    let body = bits_to_bytes(body_bits);
    if body.len() < len {
        return Err(StegoError::LengthOutOfRange { declared_bytes: len, available_bytes: body.len() });
    }
    decode_body(&body[..len], config)
}

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((bits.len() + 7) / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}
