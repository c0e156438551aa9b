//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────────┬──────────┬─────────────────────────────┐
//! │ Len (ASCII, var) │  Token   │         Payload             │
//! └──────────────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` counts token + payload bytes and excludes itself. It has no
//! delimiter: the digit run ends at the token's first letter, so the length
//! cannot be read with a fixed-width `read_exact`.

use std::io::Write;

use crate::error::{ClipdError, Result};
use super::{Frame, Token};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a message to wire bytes
///
/// Format: ascii_decimal(len(token) + len(payload)) + token + payload
pub fn encode(token: Token, payload: &[u8]) -> Vec<u8> {
    let length = (token.len() + payload.len()).to_string();

    let mut message = Vec::with_capacity(length.len() + token.len() + payload.len());
    message.extend_from_slice(length.as_bytes());
    message.extend_from_slice(token.as_bytes());
    message.extend_from_slice(payload);

    message
}

// =============================================================================
// Decoding
// =============================================================================

/// Parse the length prefix at the start of `buf`
///
/// Returns the declared length and the bytes following the prefix, or
/// `Ok(None)` when every byte seen so far is a digit (including an empty
/// buffer) and more input is needed.
pub fn decode_length(buf: &[u8]) -> Result<Option<(usize, &[u8])>> {
    let Some(end) = buf.iter().position(|b| !b.is_ascii_digit()) else {
        return Ok(None);
    };

    if end == 0 {
        return Err(ClipdError::Protocol(format!(
            "invalid length prefix: expected a digit, got 0x{:02x}",
            buf[0]
        )));
    }

    let length = buf[..end].iter().try_fold(0usize, |acc, &b| {
        acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
    });

    match length {
        Some(length) => Ok(Some((length, &buf[end..]))),
        None => Err(ClipdError::Protocol(
            "invalid length prefix: value overflows".to_string(),
        )),
    }
}

/// Decode the token and payload that follow a parsed length prefix
///
/// Returns `Ok(None)` while fewer than `length` bytes are available. The
/// remainder must then hold exactly `length` bytes: extra trailing bytes are
/// a length mismatch, not something to silently drop.
pub fn decode_frame(remainder: &[u8], length: usize) -> Result<Option<Frame>> {
    if remainder.len() < length {
        return Ok(None);
    }

    let token = Token::match_prefix(remainder)
        .ok_or_else(|| ClipdError::Protocol("unknown token".to_string()))?;

    if length < token.len() || remainder.len() != length {
        return Err(ClipdError::Protocol(format!(
            "length mismatch: declared {} bytes, received {}",
            length,
            remainder.len()
        )));
    }

    let payload = &remainder[token.len()..];
    Ok(Some(Frame::new(token, payload.to_vec())))
}

/// Decode one complete message held entirely in `bytes`
///
/// Unlike the incremental functions, a short buffer is an error here.
pub fn decode(bytes: &[u8]) -> Result<Frame> {
    let Some((length, remainder)) = decode_length(bytes)? else {
        return Err(ClipdError::Protocol(
            "incomplete message: no token after length prefix".to_string(),
        ));
    };

    decode_frame(remainder, length)?.ok_or_else(|| {
        ClipdError::Protocol(format!(
            "length mismatch: declared {} bytes, received {}",
            length,
            remainder.len()
        ))
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = frame.encode();
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
