//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────┐
//! │ Selector (4) │  Length (4)  │        Payload              │
//! └──────────────┴──────────────┴─────────────────────────────┘
//! ```
//!
//! ### Selector
//! - Client → server: command id (0..=42), or 100 for a heartbeat
//! - Server → client: status code
//!
//! ### Status Codes
//! - 200: OK
//! - 400: ERROR (payload is the error text)
//!
//! ### Payload
//! - Requests: arguments joined by a single space
//! - Replies: printable result text

mod codec;
mod command;
mod response;

pub use codec::{
    decode_header, encode, frame_length, read_frame, write_frame, Frame, FrameHeader, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use command::{lookup, lookup_id, validate, Arity, CommandId, CommandSpec, COMMANDS, HEARTBEAT_ID};
pub use response::{
    format_score, Outcome, Reply, Request, Status, EMPTY_LIST_TEXT, NIL_TEXT, OK_TEXT,
};
