//! Client Module
//!
//! One persistent connection to a server.
//!
//! ## Components
//! - [`Client`]: synchronous request/reply cycle
//! - [`FrameWriter`]: the only path that writes to the socket
//! - [`Heartbeat`]: background keep-alive sharing the writer
//! - [`shell`]: line parsing and validation for the interactive prompt
//!
//! Replies carry no correlation id: a reply belongs to the request most
//! recently written by [`Client::request`]. Heartbeats get no reply, so they
//! never disturb that pairing.

mod heartbeat;
pub mod shell;

pub use heartbeat::{Heartbeat, DEFAULT_HEARTBEAT_PERIOD};

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{CaskError, Result};
use crate::protocol::{lookup, read_frame, write_frame, Reply, Request};

/// Serialized write half of a connection
///
/// Cloning shares the same socket. Each frame is encoded, written and
/// flushed while holding the lock, so frames from different threads never
/// interleave on the wire.
#[derive(Clone)]
pub struct FrameWriter {
    inner: Arc<Mutex<BufWriter<TcpStream>>>,
}

impl FrameWriter {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BufWriter::new(stream))),
        }
    }

    /// Write one request frame atomically
    pub fn send(&self, request: Request) -> Result<()> {
        let frame = request.into_frame();
        let mut writer = self.inner.lock();
        write_frame(&mut *writer, frame.selector, &frame.payload)
    }
}

/// Connected client
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: FrameWriter,
    addr: String,
    /// Largest reply payload accepted; unbounded by default
    max_reply_size: u32,
}

impl Client {
    /// Connect to a server
    ///
    /// `read_timeout` bounds how long a request waits for its reply; `None`
    /// waits forever.
    pub fn connect<A: ToSocketAddrs>(addr: A, read_timeout: Option<Duration>) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        let addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_read_timeout(read_timeout)?;

        let read_stream = stream.try_clone()?;
        tracing::debug!("Connected to {}", addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: FrameWriter::new(stream),
            addr,
            max_reply_size: u32::MAX,
        })
    }

    /// Server address string
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Cap the reply payload size. A larger reply fails with
    /// [`CaskError::FrameTooLarge`].
    pub fn set_max_reply_size(&mut self, bytes: u32) {
        self.max_reply_size = bytes;
    }

    /// Handle on the serialized writer, for the heartbeat
    pub fn writer(&self) -> FrameWriter {
        self.writer.clone()
    }

    /// Start a keep-alive timer on this connection
    pub fn start_heartbeat(&self, period: Duration) -> Result<Heartbeat> {
        Heartbeat::spawn(self.writer(), period)
    }

    /// Run one request/reply cycle for a tokenized command line
    ///
    /// `tokens[0]` is the command name. Unknown names fail before anything
    /// is written. Arity is the caller's concern (see [`shell::classify`]).
    pub fn execute<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Reply> {
        let (name, args) = tokens
            .split_first()
            .ok_or_else(|| CaskError::UnknownCommand(String::new()))?;
        let spec = lookup(name.as_ref())
            .ok_or_else(|| CaskError::UnknownCommand(name.as_ref().to_string()))?;
        self.request(Request::new(spec.id, args))
    }

    /// Write one request and block for exactly one reply
    pub fn request(&mut self, request: Request) -> Result<Reply> {
        tracing::trace!(
            "Sending command {} ({} bytes)",
            request.command,
            request.payload.len()
        );
        self.writer.send(request)?;
        let frame = read_frame(&mut self.reader, self.max_reply_size)?;
        Ok(Reply::from_frame(frame))
    }
}
