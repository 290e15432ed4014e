//! caskkv Server Binary
//!
//! Loads a profile (or the defaults) and serves the command table over TCP.

use std::path::PathBuf;
use std::sync::Arc;

use caskkv::{Config, MemStore, Server};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// caskkv Server
#[derive(Parser, Debug)]
#[command(name = "caskkv-server")]
#[command(about = "Key-value server speaking the caskkv binary protocol")]
#[command(version)]
struct Args {
    /// Profile path (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caskkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("caskkv Server v{}", caskkv::VERSION);

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => {
                tracing::info!("Loaded profile {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!("Failed to load profile: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing::info!("Listen address: {}", config.listen_addr());
    // Only the key/value limits apply to MemStore; the rest is logged for reference
    tracing::info!(
        "Storage: dir={} max_key={}B max_value={}B segment={}B merge_every={}s sync={}",
        config.storage_dir.display(),
        config.max_key_size,
        config.max_value_size,
        config.max_segment_size,
        config.merge_interval_secs,
        config.write_sync
    );

    let store = Arc::new(MemStore::from_config(&config));

    let server = match Server::new(config, store) {
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
