//! Blocking line client
//!
//! Sends one request line and reads back one response line.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{CollError, Result};

/// Client for a colldb server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let tcp_reader = TcpStream::connect(addr)?;
        let tcp_writer = tcp_reader.try_clone()?;
        Ok(Self {
            reader: BufReader::new(tcp_reader),
            writer: BufWriter::new(tcp_writer),
        })
    }

    /// Send `request` and wait for its response line
    ///
    /// The returned string has its trailing newline removed. Blank
    /// requests are refused locally since the server never answers them.
    pub fn send(&mut self, request: &str) -> Result<String> {
        let request = request.trim();
        if request.is_empty() {
            return Err(CollError::Protocol("empty request".to_string()));
        }
        if request.contains('\n') {
            return Err(CollError::Protocol(
                "request must be a single line".to_string(),
            ));
        }

        writeln!(self.writer, "{}", request)?;
        self.writer.flush()?;

        let mut response = String::new();
        if self.reader.read_line(&mut response)? == 0 {
            return Err(CollError::Protocol(
                "connection closed before response".to_string(),
            ));
        }

        Ok(response.trim_end_matches(['\r', '\n']).to_string())
    }
}
