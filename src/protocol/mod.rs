//! Protocol Module
//!
//! Defines the wire protocol shared by server and client.
//!
//! ## Message Format
//! ```text
//! ┌──────────────────┬──────────┬─────────────────────────────┐
//! │ Len (ASCII, var) │  Token   │         Payload             │
//! └──────────────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Tokens
//! - PUSH: request, payload = new clipboard text
//! - PULL: request, empty payload
//! - OK:   response, payload = clipboard text or empty
//! - ERR:  response, payload = error message
//!
//! One message per TCP connection in each direction.

mod token;
mod frame;
mod codec;
mod decoder;

pub use token::Token;
pub use frame::Frame;
pub use codec::{encode, decode, decode_length, decode_frame, write_frame};
pub use decoder::{DecoderState, FrameDecoder};
