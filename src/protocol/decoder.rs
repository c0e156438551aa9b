//! Incremental frame decoder
//!
//! Accumulates bytes from partial socket reads until one frame is complete.
//! Parsing runs in two phases:
//! - `AwaitingLength`: digits seen so far, waiting for the first token byte
//! - `AwaitingBody`: length known, waiting for `length` bytes after the prefix
//!
//! Each connection carries exactly one frame per direction, so the decoder
//! yields at most one frame.

use bytes::{Buf, BytesMut};

use crate::error::{ClipdError, Result};
use super::{decode_frame, decode_length, Frame};

/// Initial buffer capacity; most clipboard texts fit
const INITIAL_CAPACITY: usize = 4096;

/// Parsing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Length prefix not yet terminated
    AwaitingLength,
    /// Length prefix parsed and stripped from the buffer
    AwaitingBody { length: usize },
}

/// Buffer plus state machine for one inbound frame
#[derive(Debug)]
pub struct FrameDecoder {
    /// Bytes received and not yet consumed by the length phase
    buffer: BytesMut,

    /// Current parsing phase
    state: DecoderState,

    /// Largest declared length accepted
    max_message_size: usize,
}

impl FrameDecoder {
    /// Create a decoder that rejects frames longer than `max_message_size`
    pub fn new(max_message_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(INITIAL_CAPACITY),
            state: DecoderState::AwaitingLength,
            max_message_size,
        }
    }

    /// Current parsing phase
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Number of buffered bytes (excluding a stripped length prefix)
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk read from the peer
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Try to produce the frame
    ///
    /// Returns `Ok(None)` when more bytes are needed.
    pub fn decode(&mut self) -> Result<Option<Frame>> {
        if let DecoderState::AwaitingLength = self.state {
            let Some((length, remainder)) = decode_length(&self.buffer)? else {
                return Ok(None);
            };

            if length > self.max_message_size {
                return Err(ClipdError::MessageTooLarge {
                    length,
                    max: self.max_message_size,
                });
            }

            let prefix_len = self.buffer.len() - remainder.len();
            self.buffer.advance(prefix_len);
            self.state = DecoderState::AwaitingBody { length };
        }

        match self.state {
            DecoderState::AwaitingBody { length } => decode_frame(&self.buffer, length),
            DecoderState::AwaitingLength => Ok(None),
        }
    }

    /// Signal end of stream
    ///
    /// Returns the frame if the buffered bytes complete one; otherwise the
    /// peer stopped mid-message and the frame is rejected rather than
    /// truncated.
    pub fn finish(mut self) -> Result<Frame> {
        if let Some(frame) = self.decode()? {
            return Ok(frame);
        }

        Err(match self.state {
            DecoderState::AwaitingLength if self.buffer.is_empty() => ClipdError::Protocol(
                "connection closed before any data was received".to_string(),
            ),
            DecoderState::AwaitingLength => ClipdError::Protocol(
                "connection closed inside the length prefix".to_string(),
            ),
            DecoderState::AwaitingBody { length } => ClipdError::Protocol(format!(
                "length mismatch: declared {} bytes, received {}",
                length,
                self.buffer.len()
            )),
        })
    }
}
