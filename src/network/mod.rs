//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One reader thread per connection (consumes heartbeats, enforces the
//!   idle deadline)
//! - Worker thread pool; a connection is pinned to one worker
//! - Commands routed through the Dispatcher

mod connection;
mod dispatcher;
mod server;
mod worker;

pub use connection::{Connection, Session};
pub use dispatcher::{Args, Dispatcher, Handler, Route};
pub use server::Server;
pub use worker::{Task, WorkerPool};
