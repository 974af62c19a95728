//! TCP Server
//!
//! Accepts connections and runs each one as its own session thread.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{CollError, Result};

use super::Connection;

/// Reply sent to a connection refused because the server is full
pub const TOO_MANY_CONNECTIONS: &str = "Error: too many connections";

/// TCP server for colldb
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    /// Sessions currently running
    active: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
}

/// Stops a running server from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

/// Releases a session slot when the session thread ends
struct SessionSlot(Arc<AtomicUsize>);

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(CollError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;

        tracing::info!(
            "Listening on {} (max {} sessions)",
            listener.local_addr()?,
            config.max_connections
        );

        Ok(Self {
            config,
            engine,
            listener,
            active: Arc::new(AtomicUsize::new(0)),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping `run` from elsewhere
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr()?,
        })
    }

    /// Accept connections until shut down (blocking)
    ///
    /// Sessions already running are left to finish on their own.
    pub fn run(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => tracing::error!("Failed to accept connection: {}", e),
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    fn dispatch(&self, mut stream: TcpStream) {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        let slot = SessionSlot(Arc::clone(&self.active));

        if previous >= self.config.max_connections {
            tracing::warn!(
                "Refusing connection, {} sessions already open",
                previous
            );
            let _ = writeln!(stream, "{}", TOO_MANY_CONNECTIONS);
            return;
        }

        let engine = Arc::clone(&self.engine);
        let idle_ms = self.config.idle_timeout_ms;
        let write_ms = self.config.write_timeout_ms;
        let max_line = self.config.max_line_bytes;
        let name = format!(
            "colldb-session-{}",
            stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".to_string())
        );

        let spawned = thread::Builder::new().name(name).spawn(move || {
            let _slot = slot;
            let result = Connection::new(stream, engine, max_line).and_then(|mut conn| {
                conn.set_timeouts(idle_ms, write_ms)?;
                conn.handle()
            });
            if let Err(e) = result {
                tracing::warn!("Session ended with error: {}", e);
            }
        });

        // On failure the closure (stream and slot) is dropped, closing the
        // connection and releasing the slot.
        if let Err(e) = spawned {
            tracing::error!("Failed to spawn session thread: {}", e);
        }
    }
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);

        // Wake the blocking accept so the flag is observed
        let _ = TcpStream::connect(self.addr);
    }
}
