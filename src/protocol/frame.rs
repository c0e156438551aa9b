//! Frame definitions
//!
//! One complete protocol message: a token plus its payload.

use bytes::Bytes;

use super::Token;

/// A decoded (or to-be-encoded) protocol message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Request/response kind
    pub token: Token,

    /// Raw payload, possibly empty
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame from a token and payload
    pub fn new(token: Token, payload: impl Into<Bytes>) -> Self {
        Self {
            token,
            payload: payload.into(),
        }
    }

    /// A PUSH request carrying new clipboard contents
    pub fn push(payload: impl Into<Bytes>) -> Self {
        Self::new(Token::Push, payload)
    }

    /// A PULL request
    pub fn pull() -> Self {
        Self::new(Token::Pull, Bytes::new())
    }

    /// An OK response with optional payload
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self::new(Token::Ok, payload)
    }

    /// An ERR response
    pub fn error(message: &str) -> Self {
        Self::new(Token::Err, Bytes::copy_from_slice(message.as_bytes()))
    }

    /// Value of the length prefix: token bytes plus payload bytes
    pub fn total_length(&self) -> usize {
        self.token.len() + self.payload.len()
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        super::encode(self.token, &self.payload)
    }
}
