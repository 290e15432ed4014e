//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::store::Store;

use super::connection::{Connection, Session};
use super::dispatcher::Dispatcher;
use super::worker::WorkerPool;

/// How often the accept loop checks the shutdown flag
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

type SessionTable = Arc<Mutex<HashMap<u64, Arc<Session>>>>;

/// TCP server for caskkv
pub struct Server {
    config: Config,
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    sessions: SessionTable,
    shutdown: AtomicBool,
    next_id: AtomicU64,
}

impl Server {
    /// Create a new server with the given config and store
    ///
    /// Binds the listener immediately so the local address is known before
    /// [`Server::run`] is called.
    pub fn new(config: Config, store: Arc<dyn Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.listen_addr()).map_err(|e| {
            CaskError::Config(format!("cannot bind {}: {}", config.listen_addr(), e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            listener,
            dispatcher: Arc::new(Dispatcher::new(store)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            shutdown: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Start the server (blocking until [`Server::shutdown`])
    pub fn run(&self) -> Result<()> {
        let pool = Arc::new(WorkerPool::new(
            self.config.worker_pool_size,
            self.config.max_worker_tasks,
            Arc::clone(&self.dispatcher),
        )?);

        tracing::info!(
            "Listening on {} ({} workers, max {} connections)",
            self.local_addr()?,
            pool.size(),
            self.config.max_connections
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = self.accept(stream, addr, &pool) {
                        tracing::warn!("Failed to set up connection from {}: {}", addr, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Shutting down, closing {} connections", self.connection_count());
        for session in self.sessions.lock().values() {
            session.close();
        }
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn accept(&self, stream: TcpStream, addr: SocketAddr, pool: &Arc<WorkerPool>) -> Result<()> {
        stream.set_nonblocking(false)?;

        if self.connection_count() >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: connection limit {} reached",
                addr,
                self.config.max_connections
            );
            return Ok(());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut connection = Connection::new(
            id,
            stream,
            self.config.max_frame_size,
            self.config.idle_timeout(),
        )?;
        self.sessions.lock().insert(id, connection.session());

        let sessions = Arc::clone(&self.sessions);
        let pool = Arc::clone(pool);
        let spawned = thread::Builder::new()
            .name(format!("caskkv-conn-{}", id))
            .spawn(move || {
                if let Err(e) = connection.handle(&pool) {
                    tracing::debug!("Connection {} ended with error: {}", id, e);
                }
                sessions.lock().remove(&id);
            });

        if let Err(e) = spawned {
            self.sessions.lock().remove(&id);
            return Err(e.into());
        }
        Ok(())
    }
}
