//! Request and reply messages
//!
//! The wire frame carries a single leading integer whose meaning depends on
//! direction: a command id on requests, a status code on replies. These types
//! keep the two apart; they meet only in `into_frame` / `from_frame`.

use bytes::Bytes;

use super::codec::Frame;
use super::command::{CommandId, HEARTBEAT_ID};

/// Reply status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status {
    Ok = 200,
    Error = 400,
}

impl Status {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            200 => Some(Status::Ok),
            400 => Some(Status::Error),
            _ => None,
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// A client → server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Command id (or [`HEARTBEAT_ID`])
    pub command: u32,

    /// Arguments joined by single spaces
    pub payload: Bytes,
}

impl Request {
    /// Build a request from the arguments that follow the command name
    pub fn new<S: AsRef<str>>(command: CommandId, args: &[S]) -> Self {
        let joined = args
            .iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            command: command.wire(),
            payload: Bytes::from(joined),
        }
    }

    /// The argument-less keep-alive request
    pub fn heartbeat() -> Self {
        Self {
            command: HEARTBEAT_ID,
            payload: Bytes::new(),
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        self.command == HEARTBEAT_ID
    }

    /// Split the payload back into arguments.
    ///
    /// Splits on every single space with no escaping, so an argument can
    /// never contain a space. An empty payload has no arguments.
    pub fn args(&self) -> Vec<&[u8]> {
        if self.payload.is_empty() {
            return Vec::new();
        }
        self.payload.split(|b| *b == b' ').collect()
    }

    pub fn into_frame(self) -> Frame {
        Frame {
            selector: self.command,
            payload: self.payload,
        }
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self {
            command: frame.selector,
            payload: frame.payload,
        }
    }
}

// =============================================================================
// Reply
// =============================================================================

/// A server → client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Raw status code; see [`Reply::status`]
    pub code: u32,

    /// Printable result or error text
    pub payload: Bytes,
}

impl Reply {
    pub fn new(status: Status, payload: impl Into<Bytes>) -> Self {
        Self {
            code: status.code(),
            payload: payload.into(),
        }
    }

    /// Create a 200 reply
    pub fn ok(payload: impl Into<Bytes>) -> Self {
        Self::new(Status::Ok, payload)
    }

    /// Create a 400 reply carrying an error message
    pub fn error(message: &str) -> Self {
        Self::new(Status::Error, Bytes::copy_from_slice(message.as_bytes()))
    }

    /// Known status, if the code is one this build understands
    pub fn status(&self) -> Option<Status> {
        Status::from_code(self.code)
    }

    pub fn is_ok(&self) -> bool {
        self.status() == Some(Status::Ok)
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn into_frame(self) -> Frame {
        Frame {
            selector: self.code,
            payload: self.payload,
        }
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self {
            code: frame.selector,
            payload: frame.payload,
        }
    }
}

// =============================================================================
// Result Formatting
// =============================================================================

/// Literal sent for a successful write
pub const OK_TEXT: &str = "\"OK\"";

/// Literal sent for an absent value
pub const NIL_TEXT: &str = "(nil)";

/// Literal sent for an empty multi-valued result
pub const EMPTY_LIST_TEXT: &str = "(empty list)";

/// What a store operation produced, before formatting
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write succeeded with nothing to return
    Done,
    /// Single value, possibly absent
    Value(Option<Vec<u8>>),
    /// Ordered values, each possibly absent
    Values(Vec<Option<Vec<u8>>>),
    /// (member, score) pairs
    Scored(Vec<(Vec<u8>, f64)>),
    /// Count or length
    Count(usize),
    /// Existence check
    Flag(bool),
}

impl Outcome {
    /// Render into the payload text of a 200 reply
    pub fn render(&self) -> Vec<u8> {
        match self {
            Outcome::Done => OK_TEXT.as_bytes().to_vec(),
            Outcome::Value(value) => scalar(value.as_deref()).to_vec(),
            Outcome::Values(values) => {
                if values.is_empty() {
                    return EMPTY_LIST_TEXT.as_bytes().to_vec();
                }
                let lines: Vec<Vec<u8>> = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| numbered(i, scalar(v.as_deref())))
                    .collect();
                lines.join(&b'\n')
            }
            Outcome::Scored(pairs) => {
                if pairs.is_empty() {
                    return EMPTY_LIST_TEXT.as_bytes().to_vec();
                }
                let mut lines = Vec::with_capacity(pairs.len() * 2);
                for (k, (member, score)) in pairs.iter().enumerate() {
                    lines.push(numbered(2 * k, member));
                    lines.push(numbered(2 * k + 1, format_score(*score).as_bytes()));
                }
                lines.join(&b'\n')
            }
            Outcome::Count(n) => n.to_string().into_bytes(),
            Outcome::Flag(b) => b.to_string().into_bytes(),
        }
    }

    pub fn into_reply(self) -> Reply {
        Reply::ok(self.render())
    }
}

/// Fixed-point score text, six decimals
pub fn format_score(score: f64) -> String {
    format!("{:.6}", score)
}

fn scalar(value: Option<&[u8]>) -> &[u8] {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NIL_TEXT.as_bytes(),
    }
}

fn numbered(index: usize, value: &[u8]) -> Vec<u8> {
    let mut line = format!("{}) ", index).into_bytes();
    line.extend_from_slice(value);
    line
}
