//! Worker Pool
//!
//! Fixed set of dispatch threads, each draining its own bounded queue.
//!
//! A connection is pinned to one worker (`id % workers`), so its requests
//! run one at a time and in arrival order while different connections run
//! in parallel. A full queue blocks the submitting reader thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::error::{CaskError, Result};
use crate::protocol::Request;

use super::connection::Session;
use super::dispatcher::Dispatcher;

/// One request waiting for a worker
pub struct Task {
    pub session: Arc<Session>,
    pub request: Request,
}

/// Pool of dispatch workers
pub struct WorkerPool {
    queues: Vec<Sender<Task>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers sharing one dispatcher
    pub fn new(size: usize, queue_depth: usize, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let mut queues = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);

        for index in 0..size {
            let (tx, rx) = bounded(queue_depth);
            let dispatcher = Arc::clone(&dispatcher);
            let handle = thread::Builder::new()
                .name(format!("caskkv-worker-{}", index))
                .spawn(move || run_worker(index, rx, dispatcher))?;
            queues.push(tx);
            handles.push(handle);
        }

        tracing::debug!("Started {} workers (queue depth {})", size, queue_depth);
        Ok(Self { queues, handles })
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.queues.len()
    }

    /// Queue a task on the worker that owns its connection
    pub fn submit(&self, task: Task) -> Result<()> {
        let index = (task.session.id() % self.queues.len() as u64) as usize;
        self.queues[index].send(task).map_err(|_| {
            CaskError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("worker {} has stopped", index),
            ))
        })
    }
}

impl Drop for WorkerPool {
    /// Close every queue and wait for the workers to drain
    fn drop(&mut self) {
        self.queues.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run_worker(index: usize, tasks: Receiver<Task>, dispatcher: Arc<Dispatcher>) {
    for Task { session, request } in tasks {
        if session.is_closed() {
            continue;
        }

        match dispatcher.dispatch(&request) {
            Ok(reply) => {
                if let Err(e) = session.send(reply) {
                    tracing::debug!(
                        "Reply to {} failed on worker {}: {}",
                        session.peer_addr(),
                        index,
                        e
                    );
                    session.close();
                }
            }
            Err(e) => {
                tracing::error!(
                    "Closing {}: {} (client and server command tables differ)",
                    session.peer_addr(),
                    e
                );
                session.close();
            }
        }
    }
    tracing::debug!("Worker {} stopped", index);
}
