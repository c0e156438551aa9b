//! Connection Handler
//!
//! Handles one client connection: read one request, answer it, close.
//!
//! ## Lifecycle
//! ```text
//! AwaitingLength ──► AwaitingBody ──► Dispatch ──► Responding ──► Closed
//!       │                  │
//!       │ malformed        │ peer closed
//!       ▼                  ▼
//!   ERR + close      close, no response
//! ```
//! The first two phases live in [`FrameDecoder`]; the rest is driven by
//! [`Connection::handle`], which consumes the connection.

use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ClipdError, Result};
use crate::protocol::{write_frame, Frame, FrameDecoder, Token};
use crate::store::Clipboard;

/// Bytes requested per socket read
const READ_CHUNK_SIZE: usize = 1024;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream, used for both directions
    stream: TcpStream,

    /// Shared clipboard
    store: Arc<dyn Clipboard>,

    /// Accumulates the request across partial reads
    decoder: FrameDecoder,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: Arc<dyn Clipboard>, max_message_size: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            store,
            decoder: FrameDecoder::new(max_message_size),
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Serve the single request on this connection, then close it
    ///
    /// Peer disconnects and timeouts are not errors; only failures the
    /// server should log as its own are returned.
    pub fn handle(mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let request = match self.read_request() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!(
                    "Client {} disconnected before completing a request ({:?}, {} bytes buffered)",
                    self.peer_addr,
                    self.decoder.state(),
                    self.decoder.buffered()
                );
                return Ok(());
            }
            Err(ClipdError::Io(ref e)) if is_timeout(e) => {
                tracing::debug!("Read timeout for client {}", self.peer_addr);
                return self.respond(&Frame::error("read timed out"));
            }
            Err(ClipdError::Io(ref e)) if is_disconnect(e) => {
                tracing::debug!("Connection dropped by client {}: {}", self.peer_addr, e);
                return Ok(());
            }
            Err(e) if e.is_protocol() => {
                tracing::warn!("Malformed request from {}: {}", self.peer_addr, e);
                return self.respond(&Frame::error(&e.to_string()));
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        let token = request.token;
        let size = request.payload.len();

        let response = self.dispatch(request);
        self.respond(&response)?;

        tracing::info!(
            "Handled {} request from {} ({} bytes in, {} bytes out)",
            token,
            self.peer_addr,
            size,
            response.payload.len()
        );
        Ok(())
    }

    /// Read until one frame is complete
    ///
    /// `Ok(None)` means the peer closed the connection first.
    fn read_request(&mut self) -> Result<Option<Frame>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if let Some(frame) = self.decoder.decode()? {
                return Ok(Some(frame));
            }

            let n = match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            tracing::trace!("Read {} bytes from {}", n, self.peer_addr);
            self.decoder.extend(&chunk[..n]);
        }
    }

    /// Apply a request to the clipboard and build the response
    fn dispatch(&self, request: Frame) -> Frame {
        match request.token {
            Token::Push => {
                self.store.set(request.payload);
                Frame::ok(Vec::new())
            }
            Token::Pull => Frame::ok(self.store.get()),
            Token::Ok | Token::Err => Frame::error("Unsupported request type"),
        }
    }

    /// Write the response and close our side
    fn respond(&mut self, response: &Frame) -> Result<()> {
        match write_frame(&mut self.stream, response) {
            Ok(()) => {}
            Err(ClipdError::Io(ref e)) if is_disconnect(e) || is_timeout(e) => {
                // No channel left to report on
                tracing::debug!(
                    "Client {} went away before the response could be sent: {}",
                    self.peer_addr,
                    e
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }

        // The peer may already have closed; either way we are done
        let _ = self.stream.shutdown(Shutdown::Write);
        Ok(())
    }
}

/// Read/write timeout (Windows reports TimedOut instead of WouldBlock)
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
