//! Connection Handler
//!
//! Handles individual client sessions. Each session owns its reader and
//! writer, so a response always goes back to the connection that asked.

use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{handle_line, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,

    /// Longest request line accepted, excluding the line terminator
    max_line: usize,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>, max_line: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            peer_addr,
            max_line,
        })
    }

    /// Configure idle (read) and write timeouts; 0 leaves a timeout unset
    pub fn set_timeouts(&mut self, idle_ms: u64, write_ms: u64) -> Result<()> {
        if idle_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(idle_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Serve the session until the client goes away (blocking)
    ///
    /// Disconnects and idle timeouts end the session quietly. A line longer
    /// than `max_line` is discarded and answered with an error reply. Other I/O
    /// errors end only this session and are returned to the caller.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        // Room for a trailing "\r\n"
        let limit = self.max_line as u64 + 2;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.by_ref().take(limit).read_until(b'\n', &mut buf) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) if is_idle_timeout(e.kind()) => {
                    tracing::debug!("Closing idle session {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} lost: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            }

            if buf.len() as u64 == limit && buf.last() != Some(&b'\n') {
                tracing::warn!(
                    "Rejecting request from {}: line over {} bytes",
                    self.peer_addr,
                    self.max_line
                );
                self.skip_rest_of_line(&mut buf, limit)?;
                let response = Response::Failure(format!(
                    "request line longer than {} bytes",
                    self.max_line
                ));
                if let Err(e) = self.send_response(&response) {
                    tracing::debug!("Could not reject request from {}: {}", self.peer_addr, e);
                    return Ok(());
                }
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            tracing::trace!("Received from {}: {:?}", self.peer_addr, line.trim_end());

            let Some(response) = handle_line(&self.engine, &line) else {
                continue;
            };

            if let Err(e) = self.send_response(&response) {
                if is_disconnect(e.kind()) {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e.into());
            }
        }
    }

    /// Discard input up to and including the next newline, `limit` bytes
    /// at a time
    fn skip_rest_of_line(&mut self, buf: &mut Vec<u8>, limit: u64) -> Result<()> {
        loop {
            buf.clear();
            let n = self.reader.by_ref().take(limit).read_until(b'\n', buf)?;
            if n == 0 || buf.last() == Some(&b'\n') {
                return Ok(());
            }
        }
    }

    /// Send one response line to the client
    fn send_response(&mut self, response: &Response) -> std::io::Result<()> {
        writeln!(self.writer, "{}", response)?;
        self.writer.flush()
    }
}

fn is_idle_timeout(kind: ErrorKind) -> bool {
    // Unix reports WouldBlock for a read timeout, Windows reports TimedOut
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}
