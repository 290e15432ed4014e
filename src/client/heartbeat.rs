//! Keep-alive timer
//!
//! Writes an argument-less heartbeat frame on a fixed period. No reply is
//! expected; the server only uses the traffic to tell live peers from dead
//! ones.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Sender};

use crate::error::Result;
use crate::protocol::Request;

use super::FrameWriter;

/// Default heartbeat period
pub const DEFAULT_HEARTBEAT_PERIOD: Duration = Duration::from_secs(30);

/// Running keep-alive timer. Stops when dropped.
pub struct Heartbeat {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Spawn the timer thread
    pub fn spawn(writer: FrameWriter, period: Duration) -> Result<Self> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(period);

        let handle = thread::Builder::new()
            .name("caskkv-heartbeat".to_string())
            .spawn(move || loop {
                select! {
                    recv(ticker) -> _ => {
                        if let Err(e) = writer.send(Request::heartbeat()) {
                            tracing::warn!("Heartbeat failed, stopping: {}", e);
                            break;
                        }
                        tracing::trace!("Heartbeat sent");
                    }
                    recv(stop_rx) -> _ => break,
                }
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the timer and wait for its thread
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        // Dropping the sender disconnects the stop channel
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.halt();
    }
}
