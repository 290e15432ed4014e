//! caskkv CLI Client
//!
//! Interactive prompt for a caskkv server.

use std::time::Duration;

use caskkv::client::{shell, Client};
use caskkv::config::{DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// caskkv CLI
#[derive(Parser, Debug)]
#[command(name = "caskkv-cli")]
#[command(about = "Interactive CLI for the caskkv key-value server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds between heartbeats
    #[arg(long, default_value_t = 30)]
    heartbeat_secs: u64,

    /// Reply deadline in milliseconds (0 waits forever)
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    // An empty host or a zero port falls back to the defaults
    let host = if args.host.is_empty() {
        DEFAULT_HOST.to_string()
    } else {
        args.host
    };
    let port = if args.port == 0 { DEFAULT_PORT } else { args.port };
    let addr = format!("{}:{}", host, port);

    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let mut client = match Client::connect(addr.as_str(), timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    let heartbeat = if args.heartbeat_secs > 0 {
        match client.start_heartbeat(Duration::from_secs(args.heartbeat_secs)) {
            Ok(h) => Some(h),
            Err(e) => {
                eprintln!("Could not start heartbeat: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    let prompt = format!("{}>", addr);
    let result = shell::run(&mut client, &prompt, &shell::history_path());

    drop(heartbeat);
    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
