//! Response definitions
//!
//! Every response renders to a single line of text (without the newline).

use std::fmt;

use crate::error::CollError;

/// A response to send to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    // -------------------------------------------------------------------------
    // Success
    // -------------------------------------------------------------------------
    KeyAdded { collection: String, key: String },
    Value(String),
    KeyRemoved { collection: String, key: String },
    Dropped { collection: String },

    // -------------------------------------------------------------------------
    // Not found (informational)
    // -------------------------------------------------------------------------
    NoKey { collection: String, key: String },
    KeyNotRemoved { collection: String, key: String },

    // -------------------------------------------------------------------------
    // Malformed requests
    // -------------------------------------------------------------------------
    SetIncorrect,
    GetIncorrect,
    DeleteIncorrect,
    DropIncorrect,
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Storage failure
    // -------------------------------------------------------------------------
    Failure(String),
}

impl Response {
    /// Build a failure response from a storage error
    pub fn failure(err: &CollError) -> Self {
        Response::Failure(err.to_string())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failure(_))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::KeyAdded { collection, key } => {
                write!(f, "Key {} added to {}", key, collection)
            }
            Response::Value(value) => write!(f, "Value: {}", value),
            Response::KeyRemoved { collection, key } => {
                write!(f, "Key '{}' was removed from '{}'", key, collection)
            }
            Response::Dropped { collection } => write!(f, "Drop collection '{}'", collection),
            Response::NoKey { collection, key } => {
                write!(f, "No key '{}' in '{}'", key, collection)
            }
            Response::KeyNotRemoved { collection, key } => {
                write!(f, "Key '{}' wasn't found in '{}'", key, collection)
            }
            Response::SetIncorrect => f.write_str("Your 'set' query is incorrect."),
            Response::GetIncorrect => f.write_str("Your 'get' query is incorrect."),
            Response::DeleteIncorrect => f.write_str("DELETE query incorrect."),
            Response::DropIncorrect => f.write_str("Drop query incorrect."),
            Response::UnknownCommand(name) => write!(f, "Unknown command '{}'.", name),
            Response::Failure(message) => write!(f, "Error: {}", message),
        }
    }
}
