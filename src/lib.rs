//! # clipd
//!
//! A network shared clipboard:
//! - One server process holds a single text value in memory
//! - Clients push new text or pull the current value
//! - Custom length-prefixed TCP protocol, one request per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐                      ┌─────────────────────────────┐
//! │    Client    │  encode ──TCP──►     │         TCP Server          │
//! │ (pull/push)  │                      │  (thread per connection)    │
//! └──────▲───────┘                      └──────────────┬──────────────┘
//!        │                                             │
//!        │                              ┌──────────────▼──────────────┐
//!        │                              │     Connection Handler      │
//!        │                              │  (FrameDecoder → dispatch)  │
//!        │                              └──────────────┬──────────────┘
//!        │                                             │
//!        │         ◄──TCP── encode      ┌──────────────▼──────────────┐
//!        └──────────────────────────────│      Clipboard Store        │
//!                                       │          (Mutex)            │
//!                                       └─────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClipdError, Result};
pub use config::{ClientConfig, Config};
pub use network::{Client, Server, ShutdownHandle};
pub use store::{Clipboard, ClipboardStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of clipd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
