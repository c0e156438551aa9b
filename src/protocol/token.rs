//! Token definitions
//!
//! The fixed ASCII words identifying request and response kinds.

use std::fmt;

/// Request/response kind
///
/// No token is a prefix of another and none starts with a digit, which is
/// what lets the decoder find the end of the length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Client -> server, payload is the new clipboard text
    Push,
    /// Client -> server, empty payload
    Pull,
    /// Server -> client, payload is the clipboard text or empty
    Ok,
    /// Server -> client, payload is an error message
    Err,
}

impl Token {
    /// Every token, in match order
    pub const ALL: [Token; 4] = [Token::Push, Token::Pull, Token::Ok, Token::Err];

    /// Wire representation
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Token::Push => b"PUSH",
            Token::Pull => b"PULL",
            Token::Ok => b"OK",
            Token::Err => b"ERR",
        }
    }

    /// Byte length on the wire
    pub fn len(self) -> usize {
        self.as_bytes().len()
    }

    /// Find the token `buf` starts with
    pub fn match_prefix(buf: &[u8]) -> Option<Token> {
        Self::ALL
            .into_iter()
            .find(|token| buf.starts_with(token.as_bytes()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::Push => "PUSH",
            Token::Pull => "PULL",
            Token::Ok => "OK",
            Token::Err => "ERR",
        };
        f.write_str(s)
    }
}
