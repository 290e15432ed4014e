//! Error types for caskkv
//!
//! Provides a unified error type for the codec, the connection layer and
//! both binaries. Application failures reported by the store live in
//! [`crate::store::StoreError`] and only ever travel as reply payload text.

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for caskkv operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Errors
    // -------------------------------------------------------------------------
    #[error("Malformed header: expected {expected} bytes, got {got}")]
    MalformedHeader { expected: usize, got: usize },

    #[error("Truncated frame: expected {expected} bytes, got {got}")]
    TruncatedFrame { expected: usize, got: usize },

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: u32, max: u32 },

    #[error("Payload too large to frame: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{name}' ({count} tokens)")]
    WrongArity { name: String, count: usize },

    #[error("No handler registered for command id {0}")]
    UnregisteredCommand(u32),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaskError {
    /// Whether the error happened on the transport and leaves the connection
    /// unusable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CaskError::Io(_)
                | CaskError::MalformedHeader { .. }
                | CaskError::TruncatedFrame { .. }
                | CaskError::FrameTooLarge { .. }
                | CaskError::ConnectionClosed
        )
    }

    /// Whether the error is a read deadline expiring.
    pub fn is_timeout(&self) -> bool {
        match self {
            CaskError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
