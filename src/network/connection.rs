//! Connection Handler
//!
//! Handles individual client connections.
//!
//! Each accepted connection gets a reader thread running
//! [`Connection::handle`]. Heartbeats are consumed on the reader thread;
//! every other frame is queued on the worker pool, and the worker writes the
//! reply through the shared [`Session`].

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{CaskError, Result};
use crate::protocol::{read_frame, write_frame, Reply, Request};

use super::worker::{Task, WorkerPool};

/// Outbound side of one accepted connection
///
/// Shared between the reader thread and whichever worker owns the
/// connection. Replies are written whole under the lock.
pub struct Session {
    id: u64,
    peer_addr: String,
    writer: Mutex<BufWriter<TcpStream>>,
    control: TcpStream,
    closed: AtomicBool,
}

impl Session {
    /// Connection id assigned by the server
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Write exactly one reply frame
    pub fn send(&self, reply: Reply) -> Result<()> {
        let frame = reply.into_frame();
        let mut writer = self.writer.lock();
        write_frame(&mut *writer, frame.selector, &frame.payload)
    }

    /// Shut the socket down in both directions; the reader thread sees EOF
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.control.shutdown(Shutdown::Both);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Reader side of one accepted connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// Shared writer handed to workers
    session: Arc<Session>,

    /// Largest accepted payload
    max_frame_size: u32,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and the idle deadline
    pub fn new(
        id: u64,
        stream: TcpStream,
        max_frame_size: u32,
        idle_timeout: Option<Duration>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(idle_timeout)?;

        let read_stream = stream.try_clone()?;
        let control = stream.try_clone()?;

        let session = Arc::new(Session {
            id,
            peer_addr,
            writer: Mutex::new(BufWriter::new(stream)),
            control,
            closed: AtomicBool::new(false),
        });

        Ok(Self {
            reader: BufReader::new(read_stream),
            session,
            max_frame_size,
        })
    }

    /// Shared session handle
    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads frames in a loop and hands them to the pool. Returns when the
    /// client disconnects, goes silent past the idle deadline, or breaks
    /// framing.
    pub fn handle(&mut self, pool: &WorkerPool) -> Result<()> {
        let peer = self.session.peer_addr().to_string();
        tracing::debug!("Connection {} established from {}", self.session.id(), peer);

        let result = loop {
            let frame = match read_frame(&mut self.reader, self.max_frame_size) {
                Ok(frame) => frame,
                Err(CaskError::ConnectionClosed) => {
                    tracing::debug!("Client {} disconnected", peer);
                    break Ok(());
                }
                Err(e) if e.is_timeout() => {
                    tracing::info!("Client {} missed its heartbeats, closing", peer);
                    break Ok(());
                }
                Err(CaskError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection reset by client {}", peer);
                    break Ok(());
                }
                Err(e) if self.session.is_closed() => {
                    tracing::debug!("Connection {} closed locally: {}", self.session.id(), e);
                    break Ok(());
                }
                Err(e) => {
                    tracing::warn!("Protocol error from {}: {}", peer, e);
                    break Err(e);
                }
            };

            let request = Request::from_frame(frame);
            if request.is_heartbeat() {
                tracing::trace!("Heartbeat from {}", peer);
                continue;
            }

            tracing::trace!(
                "Received command {} from {} ({} bytes)",
                request.command,
                peer,
                request.payload.len()
            );

            if let Err(e) = pool.submit(Task {
                session: self.session(),
                request,
            }) {
                break Err(e);
            }
        };

        self.session.close();
        result
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
