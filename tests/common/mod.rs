//! Shared helpers for tests that need a live server

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clipd::{Client, ClientConfig, Clipboard, ClipboardStore, Config, Server, ShutdownHandle};

/// A server running on an ephemeral loopback port
pub struct TestServer {
    pub addr: SocketAddr,
    pub server: Arc<Server>,
    handle: ShutdownHandle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Default config on 127.0.0.1:0 with a fresh store
    pub fn start() -> Self {
        Self::start_with(Config::builder(), Arc::new(ClipboardStore::new()))
    }

    pub fn start_with(builder: clipd::config::ConfigBuilder, store: Arc<dyn Clipboard>) -> Self {
        let config = builder.listen_addr("127.0.0.1:0").build();
        let server = Arc::new(Server::bind(config, store).unwrap());
        let addr = server.local_addr().unwrap();
        let handle = server.shutdown_handle().unwrap();

        let runner = Arc::clone(&server);
        let thread = thread::spawn(move || runner.run().unwrap());

        Self {
            addr,
            server,
            handle,
            thread: Some(thread),
        }
    }

    pub fn client(&self) -> Client {
        Client::new(ClientConfig {
            server: "127.0.0.1".to_string(),
            port: self.addr.port(),
            timeout_ms: 5_000,
            ..ClientConfig::default()
        })
    }

    /// Send raw bytes, half-close, and collect everything the server sends back
    pub fn exchange(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = self.connect();
        stream.write_all(request).unwrap();
        stream.shutdown(Shutdown::Write).unwrap();
        read_all(&mut stream)
    }

    /// Send raw bytes without closing our side, then collect the response
    pub fn exchange_open(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = self.connect();
        stream.write_all(request).unwrap();
        read_all(&mut stream)
    }

    pub fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        stream
    }

    /// Poll until the server reports `count` active connections
    pub fn wait_for_active(&self, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.server.active_connections() != count {
            assert!(Instant::now() < deadline, "timed out waiting for {} active connections", count);
            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.handle.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}
