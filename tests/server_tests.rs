//! Server and Connection Handler Tests
//!
//! Raw-socket tests against a live server on an ephemeral port.

mod common;

use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use clipd::protocol::{decode, Frame, Token};
use clipd::{Clipboard, ClipboardStore, Config};
use common::TestServer;

/// Decode a response and assert it is an ERR mentioning `needle`
fn assert_err_response(response: &[u8], needle: &str) {
    let frame = decode(response).unwrap();
    assert_eq!(frame.token, Token::Err);
    let message = String::from_utf8_lossy(&frame.payload);
    assert!(message.contains(needle), "unexpected message {:?}", message);
}

// =============================================================================
// Request Dispatch Tests
// =============================================================================

#[test]
fn test_pull_on_fresh_server_is_empty_ok() {
    let server = TestServer::start();
    assert_eq!(server.exchange(b"4PULL"), b"2OK".to_vec());
}

#[test]
fn test_push_then_pull() {
    let server = TestServer::start();
    assert_eq!(server.exchange(b"9PUSHhello"), b"2OK".to_vec());
    assert_eq!(server.exchange(b"4PULL"), b"7OKhello".to_vec());
}

#[test]
fn test_request_split_across_writes() {
    let server = TestServer::start();
    let mut stream = server.connect();

    for piece in [&b"1"[..], b"0PU", b"SH", b"abc", b"123"] {
        stream.write_all(piece).unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    assert_eq!(response, b"2OK".to_vec());

    assert_eq!(server.exchange(b"4PULL"), b"8OKabc123".to_vec());
}

#[test]
fn test_response_sent_without_waiting_for_eof() {
    let server = TestServer::start();
    // Our write side stays open; the server must still answer
    assert_eq!(server.exchange_open(b"4PULL"), b"2OK".to_vec());
}

#[test]
fn test_response_token_as_request_is_unsupported() {
    let server = TestServer::start();
    assert_err_response(&server.exchange(b"2OK"), "Unsupported request type");
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_unknown_token_gets_err() {
    let server = TestServer::start();
    assert_err_response(&server.exchange(b"3XYZ"), "unknown token");
}

#[test]
fn test_non_digit_first_byte_gets_err() {
    let server = TestServer::start();
    assert_err_response(&server.exchange_open(b"PULL"), "invalid length prefix");
}

#[test]
fn test_trailing_bytes_get_err() {
    let server = TestServer::start();
    assert_err_response(&server.exchange(b"4PULLextra"), "length mismatch");
}

#[test]
fn test_truncated_request_gets_no_response() {
    let server = TestServer::start();
    assert!(server.exchange(b"10PUSHab").is_empty());

    // Nothing was stored
    assert_eq!(server.exchange(b"4PULL"), b"2OK".to_vec());
}

#[test]
fn test_oversized_request_rejected_from_prefix() {
    let server = TestServer::start_with(
        Config::builder().max_message_size(16),
        Arc::new(ClipboardStore::new()),
    );
    assert_err_response(&server.exchange_open(b"100PUSH"), "too large");
}

#[test]
fn test_read_timeout_gets_err() {
    let server = TestServer::start_with(
        Config::builder().read_timeout_ms(200),
        Arc::new(ClipboardStore::new()),
    );
    assert_err_response(&server.exchange_open(b"9PU"), "timed out");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_pushes_leave_one_whole_value() {
    let server = TestServer::start();
    let texts: Vec<String> = (0..16)
        .map(|i| format!("{:02}", i).repeat(2000))
        .collect();

    let handles: Vec<_> = texts
        .iter()
        .cloned()
        .map(|text| {
            let client = server.client();
            thread::spawn(move || client.push(&text).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let pulled = server.client().pull().unwrap();
    assert!(texts.contains(&pulled), "pulled a mixed or truncated value");
}

#[test]
fn test_connection_limit_rejects_excess() {
    let server = TestServer::start_with(
        Config::builder().max_connections(Some(1)),
        Arc::new(ClipboardStore::new()),
    );

    let idle = server.connect();
    server.wait_for_active(1);

    let err = server.client().pull().unwrap_err();
    assert_eq!(err.to_string(), "server busy");

    drop(idle);
    server.wait_for_active(0);
    assert_eq!(server.client().pull().unwrap(), "");
}

// =============================================================================
// Store Seam Tests
// =============================================================================

/// Clipboard double that counts calls
#[derive(Default)]
struct CountingClipboard {
    inner: ClipboardStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl Clipboard for CountingClipboard {
    fn get(&self) -> Bytes {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get()
    }

    fn set(&self, value: Bytes) {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(value)
    }
}

#[test]
fn test_handlers_use_injected_store() {
    let store = Arc::new(CountingClipboard::default());
    let server = TestServer::start_with(Config::builder(), store.clone());

    server.client().push("x").unwrap();
    server.client().pull().unwrap();
    server.exchange(b"3XYZ");

    assert_eq!(store.sets.load(Ordering::SeqCst), 1);
    assert_eq!(store.gets.load(Ordering::SeqCst), 1);
}

#[test]
fn test_independent_servers_do_not_share_state() {
    let a = TestServer::start();
    let b = TestServer::start();

    a.client().push("only in a").unwrap();
    assert_eq!(a.client().pull().unwrap(), "only in a");
    assert_eq!(b.client().pull().unwrap(), "");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_shutdown_stops_accept_loop() {
    let server = TestServer::start();
    let addr = server.addr;
    server.stop();

    // Listener is gone once run() returned and the server was dropped
    thread::sleep(Duration::from_millis(50));
    assert!(std::net::TcpStream::connect(addr).is_err());
}

#[test]
fn test_frame_helpers_match_wire() {
    assert_eq!(Frame::pull().encode(), b"4PULL".to_vec());
    assert_eq!(Frame::ok(Vec::new()).encode(), b"2OK".to_vec());
}
