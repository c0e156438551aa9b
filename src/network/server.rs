//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.
//!
//! There is no worker pool: concurrency is one thread per connection,
//! optionally capped by `Config::max_connections`. Stopping the server stops
//! the accept loop only; in-flight connections are abandoned, not drained.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{write_frame, Frame};
use crate::store::Clipboard;
use super::Connection;

/// How long `ShutdownHandle::shutdown` waits to wake the accept loop
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// TCP server for clipd
pub struct Server {
    config: Config,
    store: Arc<dyn Clipboard>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address and prepare to serve `store`
    pub fn bind(config: Config, store: Arc<dyn Clipboard>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently being handled
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let mut wake_addr = self.local_addr()?;
        match wake_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => wake_addr.set_ip(Ipv4Addr::LOCALHOST.into()),
            IpAddr::V6(ip) if ip.is_unspecified() => wake_addr.set_ip(Ipv6Addr::LOCALHOST.into()),
            _ => {}
        }

        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            wake_addr,
        })
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        let mut next_id: u64 = 0;

        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    next_id += 1;
                    self.accept(stream, next_id);
                }
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            }
        }

        tracing::info!(
            "Stopped accepting connections ({} still in flight)",
            self.active_connections()
        );
        Ok(())
    }

    /// Spawn a handler thread for one accepted stream
    fn accept(&self, stream: TcpStream, id: u64) {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(Arc::clone(&self.active));
        let over_limit = self.config.max_connections.is_some_and(|max| previous >= max);

        let store = Arc::clone(&self.store);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("clipd-conn-{}", id))
            .spawn(move || {
                let _guard = guard;

                if over_limit {
                    tracing::warn!(
                        "Rejecting connection {}: {} already active (max {:?})",
                        id,
                        previous,
                        config.max_connections
                    );
                    reject_busy(stream);
                    return;
                }

                let result = Connection::new(stream, store, config.max_message_size).and_then(|mut conn| {
                    conn.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
                    conn.handle()
                });

                if let Err(e) = result {
                    tracing::warn!("Connection {} failed: {}", id, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn handler thread: {}", e);
        }
    }
}

/// Stops a running server's accept loop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }

        // The accept loop is blocked in accept(); a throwaway connection
        // lets it observe the flag
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT) {
            tracing::debug!("Wake-up connection to {} failed: {}", self.wake_addr, e);
        }
    }
}

/// Decrements the active connection count when the handler finishes
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Answer `ERR server busy` without reading the request
///
/// The unread request is drained after our half-close so that closing the
/// socket does not reset the connection before the client reads the reply.
fn reject_busy(mut stream: TcpStream) {
    let _ = stream.set_write_timeout(Some(WAKE_TIMEOUT));
    let _ = stream.set_read_timeout(Some(WAKE_TIMEOUT));

    if let Err(e) = write_frame(&mut stream, &Frame::error("server busy")) {
        tracing::debug!("Failed to send busy response: {}", e);
        return;
    }

    let _ = stream.shutdown(Shutdown::Write);
    let _ = io::copy(&mut stream, &mut io::sink());
}
