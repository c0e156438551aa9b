//! Network Module
//!
//! TCP server, connection handling and the client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, one request per connection
//! - Handlers share nothing but the clipboard

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
