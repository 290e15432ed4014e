//! Protocol codec
//!
//! Encoding and decoding of the fixed frame used by every message.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────────────┐
//! │ Selector (4) │  Length (4)  │        Payload              │
//! └──────────────┴──────────────┴─────────────────────────────┘
//! ```
//! Both integers are little-endian. `Length` is the exact payload size; no
//! padding and no delimiter follow.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};

/// Header size: 4 bytes selector + 4 bytes length
pub const HEADER_SIZE: usize = 8;

/// Conventional payload cap for readers that want a fixed bound (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub selector: u32,
    pub length: u32,
}

/// One complete frame as it appears on the wire.
///
/// `selector` is a command id on client → server frames and a status code on
/// server → client frames. Use [`super::Request`] and [`super::Reply`] above
/// this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub selector: u32,
    pub payload: Bytes,
}

// =============================================================================
// Byte Layout
// =============================================================================

/// Length field for a payload, if it fits in 32 bits
pub fn frame_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CaskError::PayloadTooLarge(len))
}

/// Encode a frame to bytes
///
/// The payload must be shorter than 4 GiB; [`write_frame`] checks this
/// before encoding.
pub fn encode(selector: u32, payload: &[u8]) -> Bytes {
    debug_assert!(payload.len() <= u32::MAX as usize);
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u32_le(selector);
    buf.put_u32_le(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

/// Parse the fixed 8-byte header
///
/// Only the first [`HEADER_SIZE`] bytes are inspected.
pub fn decode_header(mut bytes: &[u8]) -> Result<FrameHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(CaskError::MalformedHeader {
            expected: HEADER_SIZE,
            got: bytes.len(),
        });
    }

    let selector = bytes.get_u32_le();
    let length = bytes.get_u32_le();
    Ok(FrameHeader { selector, length })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete frame from a stream
///
/// Blocks until 8 header bytes and then exactly `length` payload bytes have
/// arrived. A stream that ends before the first header byte yields
/// [`CaskError::ConnectionClosed`]; one that ends later yields
/// [`CaskError::TruncatedFrame`].
pub fn read_frame<R: Read>(reader: &mut R, max_payload: u32) -> Result<Frame> {
    let mut header = [0u8; HEADER_SIZE];
    let got = read_full(reader, &mut header)?;
    if got == 0 {
        return Err(CaskError::ConnectionClosed);
    }
    if got < HEADER_SIZE {
        return Err(CaskError::TruncatedFrame {
            expected: HEADER_SIZE,
            got,
        });
    }

    let FrameHeader { selector, length } = decode_header(&header)?;
    if length > max_payload {
        return Err(CaskError::FrameTooLarge {
            len: length,
            max: max_payload,
        });
    }

    let mut payload = vec![0u8; length as usize];
    let got = read_full(reader, &mut payload)?;
    if got < payload.len() {
        return Err(CaskError::TruncatedFrame {
            expected: payload.len(),
            got,
        });
    }

    Ok(Frame {
        selector,
        payload: Bytes::from(payload),
    })
}

/// Write a frame to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, selector: u32, payload: &[u8]) -> Result<()> {
    frame_length(payload.len())?;
    let bytes = encode(selector, payload);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Like `read_exact`, but reports how many bytes arrived before EOF
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
