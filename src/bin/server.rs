//! colldb Server Binary
//!
//! Starts the TCP server for colldb.

use std::sync::Arc;

use clap::Parser;
use colldb::network::Server;
use colldb::{Config, CorruptPolicy, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// colldb Server
#[derive(Parser, Debug)]
#[command(name = "colldb-server")]
#[command(about = "Networked key-value store with file-backed collections")]
#[command(version)]
struct Args {
    /// Directory holding collection files
    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7777")]
    listen: String,

    /// Maximum concurrent client sessions
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Close sessions idle for this many milliseconds (0 = never)
    #[arg(long, default_value = "10000000")]
    idle_timeout_ms: u64,

    /// Fail operations on corrupt collection files instead of starting empty
    #[arg(long)]
    strict_decode: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,colldb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("colldb Server v{}", colldb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    let policy = if args.strict_decode {
        CorruptPolicy::Fail
    } else {
        CorruptPolicy::Recover
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .idle_timeout_ms(args.idle_timeout_ms)
        .corrupt_policy(policy)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
