//! clipd Server Binary
//!
//! Starts the shared clipboard server.

use std::sync::Arc;

use clap::Parser;
use clipd::{ClipboardStore, Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// clipd Server
#[derive(Parser, Debug)]
#[command(name = "clipd-server")]
#[command(about = "Shared clipboard server")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:3399")]
    listen: String,

    /// Port to listen on (overrides the port in --listen)
    #[arg(short, long)]
    port: Option<u16>,

    /// Read timeout per connection in milliseconds (0 = none)
    #[arg(long, default_value_t = clipd::config::DEFAULT_TIMEOUT_MS)]
    read_timeout_ms: u64,

    /// Largest accepted message in bytes
    #[arg(long, default_value_t = clipd::config::DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,

    /// Maximum concurrent connections (unbounded if omitted)
    #[arg(short, long)]
    max_connections: Option<usize>,
}

impl Args {
    fn listen_addr(&self) -> String {
        match self.port {
            Some(port) => {
                let host = self
                    .listen
                    .rsplit_once(':')
                    .map(|(host, _)| host)
                    .unwrap_or(&self.listen);
                format!("{}:{}", host, port)
            }
            None => self.listen.clone(),
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clipd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("clipd server v{}", clipd::VERSION);

    let config = Config::builder()
        .listen_addr(args.listen_addr())
        .read_timeout_ms(args.read_timeout_ms)
        .max_message_size(args.max_message_size)
        .max_connections(args.max_connections)
        .build();

    let server = match Server::bind(config, Arc::new(ClipboardStore::new())) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    match server.shutdown_handle() {
        Ok(handle) => {
            let result = ctrlc::set_handler(move || {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
                handle.shutdown();
            });
            if let Err(e) = result {
                tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            }
        }
        Err(e) => tracing::warn!("Shutdown handle unavailable: {}", e),
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
