//! Error types for colldb
//!
//! Argument-shape problems and missing keys are not errors here: they are
//! ordinary protocol responses. This type covers the failures that must be
//! reported to the caller as an explicit failure.

use thiserror::Error;

/// Result type alias using CollError
pub type Result<T> = std::result::Result<T, CollError>;

/// Unified error type for colldb operations
#[derive(Debug, Error)]
pub enum CollError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// Persisted snapshot could not be decoded (strict policy only)
    #[error("Corrupt collection file: {0}")]
    Decode(String),

    /// Collection could not be serialized; the file is left untouched
    #[error("Failed to encode collection: {0}")]
    Encode(String),

    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
