//! Error types for clipd
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ClipdError
pub type Result<T> = std::result::Result<T, ClipdError>;

/// Unified error type for clipd operations
#[derive(Debug, Error)]
pub enum ClipdError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Message too large: {length} bytes (max {max})")]
    MessageTooLarge { length: usize, max: usize },

    // -------------------------------------------------------------------------
    // Clipboard Errors
    // -------------------------------------------------------------------------
    /// The server answered with `ERR`; holds its message verbatim
    #[error("{0}")]
    Clipboard(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClipdError {
    /// Whether this error is a framing violation that the peer should hear
    /// about as an `ERR` response
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ClipdError::Protocol(_) | ClipdError::MessageTooLarge { .. }
        )
    }
}
