//! Configuration for the caskkv server
//!
//! Centralized configuration with sensible defaults. A server profile is a
//! flat TOML table; every key is optional and the key spellings of older
//! profiles are accepted as aliases.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{CaskError, Result};

/// Default TCP port shared by server and client
pub const DEFAULT_PORT: u16 = 4519;

/// Default bind/connect host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Main configuration for a caskkv server
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Max concurrent client connections
    #[serde(alias = "max_conn_size")]
    pub max_connections: usize,

    /// Largest accepted payload in bytes
    #[serde(alias = "max_package_size")]
    pub max_frame_size: u32,

    // -------------------------------------------------------------------------
    // Worker Pool Configuration
    // -------------------------------------------------------------------------
    /// Number of dispatch workers
    #[serde(alias = "work_pool_size")]
    pub worker_pool_size: usize,

    /// Queued frames per worker before readers block
    #[serde(alias = "max_worker_task")]
    pub max_worker_tasks: usize,

    // -------------------------------------------------------------------------
    // Heartbeat Configuration
    // -------------------------------------------------------------------------
    /// Expected client heartbeat period (seconds)
    #[serde(alias = "heart_rate_in_sec")]
    pub heartbeat_interval_secs: u64,

    /// Missed heartbeat periods before a connection is considered dead.
    /// Zero disables idle detection.
    #[serde(alias = "heart_fresh_level")]
    pub heartbeat_staleness: u32,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    // `storage_dir`, `max_segment_size`, `merge_interval_secs` and `write_sync`
    // are carried for a persistent engine; `MemStore` ignores them.

    /// Root directory for engine files. Unused by `MemStore`.
    #[serde(alias = "db_dir")]
    pub storage_dir: PathBuf,

    /// Max key size in bytes
    pub max_key_size: usize,

    /// Max value size in bytes
    #[serde(alias = "max_val_size")]
    pub max_value_size: usize,

    /// Max size of one segment file in bytes. Unused by `MemStore`.
    #[serde(alias = "max_file_size")]
    pub max_segment_size: u64,

    /// Interval between merges (seconds). Unused by `MemStore`.
    #[serde(alias = "gc_interval")]
    pub merge_interval_secs: u64,

    /// fsync after every write. Unused by `MemStore`.
    #[serde(alias = "sync_now")]
    pub write_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_connections: 1024,
            max_frame_size: 1024 * 1024, // 1 MB
            worker_pool_size: 4,
            max_worker_tasks: 100,
            heartbeat_interval_secs: 30,
            heartbeat_staleness: 5,
            storage_dir: std::env::temp_dir().join("caskkv"),
            max_key_size: 1024,       // 1 KB
            max_value_size: 8 * 1024, // 8 KB
            max_segment_size: 1024 * 1024,
            merge_interval_secs: 24 * 60 * 60,
            write_sync: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a profile from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CaskError::Config(format!("cannot read profile {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse a profile from TOML text and validate it
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| CaskError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(CaskError::Config("max_connections must be > 0".into()));
        }
        if self.max_frame_size == 0 {
            return Err(CaskError::Config("max_frame_size must be > 0".into()));
        }
        if self.worker_pool_size == 0 {
            return Err(CaskError::Config("worker_pool_size must be > 0".into()));
        }
        if self.max_worker_tasks == 0 {
            return Err(CaskError::Config("max_worker_tasks must be > 0".into()));
        }
        Ok(())
    }

    /// `host:port` string to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long a connection may stay silent before it is dropped
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.heartbeat_staleness == 0 || self.heartbeat_interval_secs == 0 {
            return None;
        }
        Some(Duration::from_secs(
            self.heartbeat_interval_secs * u64::from(self.heartbeat_staleness),
        ))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the bind port (0 picks a free port)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the largest accepted payload
    pub fn max_frame_size(mut self, bytes: u32) -> Self {
        self.config.max_frame_size = bytes;
        self
    }

    /// Set the number of dispatch workers
    pub fn worker_pool_size(mut self, workers: usize) -> Self {
        self.config.worker_pool_size = workers;
        self
    }

    /// Set the per-worker queue depth
    pub fn max_worker_tasks(mut self, tasks: usize) -> Self {
        self.config.max_worker_tasks = tasks;
        self
    }

    /// Set the heartbeat period (seconds)
    pub fn heartbeat_interval_secs(mut self, secs: u64) -> Self {
        self.config.heartbeat_interval_secs = secs;
        self
    }

    /// Set the missed-heartbeat threshold
    pub fn heartbeat_staleness(mut self, level: u32) -> Self {
        self.config.heartbeat_staleness = level;
        self
    }

    /// Set the storage directory
    pub fn storage_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = path.into();
        self
    }

    /// Set the max key size (bytes)
    pub fn max_key_size(mut self, bytes: usize) -> Self {
        self.config.max_key_size = bytes;
        self
    }

    /// Set the max value size (bytes)
    pub fn max_value_size(mut self, bytes: usize) -> Self {
        self.config.max_value_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
