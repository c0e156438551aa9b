//! Client Request Functions
//!
//! One fresh connection per call: send the request, read exactly one framed
//! response, close. Nothing is retried.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::config::ClientConfig;
use crate::error::{ClipdError, Result};
use crate::protocol::{write_frame, Frame, FrameDecoder, Token};

/// Bytes requested per socket read
const READ_CHUNK_SIZE: usize = 1024;

/// Client for a clipd server
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Create a client from a config
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Create a client for `host` and `port` with default settings
    pub fn with_addr(server: impl Into<String>, port: u16) -> Self {
        Self::new(ClientConfig {
            server: server.into(),
            port,
            ..ClientConfig::default()
        })
    }

    /// The config in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the clipboard text
    pub fn pull(&self) -> Result<String> {
        let payload = self.pull_bytes()?;
        String::from_utf8(payload.to_vec())
            .map_err(|e| ClipdError::Protocol(format!("clipboard is not valid UTF-8: {}", e)))
    }

    /// Fetch the raw clipboard bytes
    pub fn pull_bytes(&self) -> Result<Bytes> {
        self.request(&Frame::pull())
    }

    /// Replace the clipboard text
    pub fn push(&self, text: &str) -> Result<()> {
        self.push_bytes(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Replace the clipboard with raw bytes
    pub fn push_bytes(&self, payload: impl Into<Bytes>) -> Result<()> {
        self.request(&Frame::push(payload)).map(|_| ())
    }

    /// Round trip plus response validation; returns the OK payload
    fn request(&self, request: &Frame) -> Result<Bytes> {
        let response = self.round_trip(request)?;

        match response.token {
            Token::Ok => Ok(response.payload),
            Token::Err => Err(ClipdError::Clipboard(
                String::from_utf8_lossy(&response.payload).into_owned(),
            )),
            other => Err(ClipdError::Protocol(format!(
                "unexpected response token {}",
                other
            ))),
        }
    }

    /// Send one frame and read one frame back on a fresh connection
    fn round_trip(&self, request: &Frame) -> Result<Frame> {
        let mut stream = self.connect()?;
        tracing::debug!("Sending {} request to {}", request.token, self.config.addr());

        write_frame(&mut stream, request)?;

        let mut decoder = FrameDecoder::new(self.config.max_message_size);
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        // Stop at the frame boundary rather than waiting for EOF
        loop {
            if let Some(frame) = decoder.decode()? {
                return Ok(frame);
            }

            match stream.read(&mut chunk) {
                Ok(0) => return decoder.finish(),
                Ok(n) => decoder.extend(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addr = self.config.addr();

        let stream = if self.config.timeout_ms > 0 {
            let timeout = Duration::from_millis(self.config.timeout_ms);
            let stream = connect_timeout(&addr, timeout)?;
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
            stream
        } else {
            TcpStream::connect(&addr)?
        };

        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

/// Try each resolved address in turn, like `TcpStream::connect`
fn connect_timeout(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;

    for socket_addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err
        .unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} did not resolve to any address", addr),
            )
        })
        .into())
}
