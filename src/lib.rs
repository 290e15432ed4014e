//! # caskkv
//!
//! A key-value server and interactive client sharing one compact binary
//! protocol:
//! - Length-prefixed little-endian frames over a persistent TCP connection
//! - Static command registry (name ↔ id ↔ arity) shared by both ends
//! - Table-driven dispatch onto a pluggable storage engine
//! - Client keep-alive with a serialized write path
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐                 ┌──────────────────────────────┐
//! │   Interactive Shell  │                 │          TCP Server          │
//! │ parse → validate     │                 │  acceptor + reader threads   │
//! └──────────┬───────────┘                 └──────────────┬───────────────┘
//!            │                                            │
//! ┌──────────▼───────────┐    frames       ┌──────────────▼───────────────┐
//! │ Request/Reply Cycle  │ ──────────────▶ │         Worker Pool          │
//! │  + Heartbeat timer   │ ◀────────────── │  (one worker per connection) │
//! └──────────────────────┘                 └──────────────┬───────────────┘
//!                                                         │
//!                                          ┌──────────────▼───────────────┐
//!                                          │          Dispatcher          │
//!                                          │  id → handler → Outcome      │
//!                                          └──────────────┬───────────────┘
//!                                                         │
//!                                          ┌──────────────▼───────────────┐
//!                                          │            Store             │
//!                                          └──────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::Config;
pub use client::Client;
pub use network::{Dispatcher, Server};
pub use store::{MemStore, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of caskkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
