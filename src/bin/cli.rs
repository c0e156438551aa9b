//! clipd CLI Client
//!
//! Pushes stdin to the shared clipboard, or pulls it to stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use clipd::{Client, ClientConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// clipd CLI
#[derive(Parser, Debug)]
#[command(name = "clipd")]
#[command(about = "Push stdin to the shared clipboard, or pull it with --pull")]
#[command(version)]
struct Args {
    /// Pull clipboard contents from the server
    #[arg(short, long)]
    pull: bool,

    /// Client config file (default: ~/.config/clipd/client.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host (overrides the config file)
    #[arg(short, long)]
    server: Option<String>,

    /// Server port (overrides the config file)
    #[arg(long)]
    port: Option<u16>,
}

fn main() {
    // Logs go to stderr; stdout carries only clipboard text
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> clipd::Result<()> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::load_default()?,
    };
    if let Some(server) = args.server {
        config.server = server;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let client = Client::new(config);

    if args.pull {
        let text = client.pull()?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    } else {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        client.push(&input)?;
    }

    Ok(())
}
