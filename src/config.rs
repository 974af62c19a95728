//! Configuration for colldb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a colldb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding one snapshot file per collection:
    ///   {data_dir}/
    ///     ├── orders.json
    ///     └── users.json
    pub data_dir: PathBuf,

    /// Extension appended to the collection name (without the dot)
    pub file_extension: String,

    /// What to do when a snapshot file cannot be decoded
    pub corrupt_policy: CorruptPolicy,

    /// fsync the snapshot after every rewrite
    pub sync_writes: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client sessions; extra connections are refused
    pub max_connections: usize,

    /// Longest accepted request line in bytes (without the newline)
    pub max_line_bytes: usize,

    /// Session idle timeout (milliseconds, 0 = never)
    pub idle_timeout_ms: u64,

    /// Response write timeout (milliseconds, 0 = never)
    pub write_timeout_ms: u64,
}

/// Handling of snapshot files that fail to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Treat the file as an empty collection (lossy, logged)
    Recover,

    /// Fail the operation with `CollError::Decode`
    Fail,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_extension: "json".to_string(),
            corrupt_policy: CorruptPolicy::Recover,
            sync_writes: true,
            listen_addr: "127.0.0.1:7777".to_string(),
            max_connections: 1024,
            max_line_bytes: 64 * 1024,
            idle_timeout_ms: 10_000_000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn file_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.file_extension = ext.into();
        self
    }

    pub fn corrupt_policy(mut self, policy: CorruptPolicy) -> Self {
        self.config.corrupt_policy = policy;
        self
    }

    pub fn sync_writes(mut self, sync: bool) -> Self {
        self.config.sync_writes = sync;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent sessions
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the request line length limit (in bytes)
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Set the idle timeout (in milliseconds)
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.idle_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
