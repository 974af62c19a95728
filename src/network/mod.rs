//! Network Module
//!
//! TCP server and client session handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One named thread per session, capped by `max_connections`
//! - Each session reads lines and writes responses on its own stream

mod connection;
mod server;

pub use connection::Connection;
pub use server::{Server, ShutdownHandle, TOO_MANY_CONNECTIONS};
