//! Command definitions
//!
//! Parses one request line into a command.

use super::Response;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert or overwrite a key; `value` may contain spaces
    Set {
        collection: String,
        key: String,
        value: String,
    },

    /// Look up a key
    Get { collection: String, key: String },

    /// Remove a key
    Delete { collection: String, key: String },

    /// Delete a whole collection
    Drop { collection: String },
}

impl Command {
    /// Command name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "set",
            Command::Get { .. } => "get",
            Command::Delete { .. } => "delete",
            Command::Drop { .. } => "drop",
        }
    }

    /// Collection the command targets
    pub fn collection(&self) -> &str {
        match self {
            Command::Set { collection, .. }
            | Command::Get { collection, .. }
            | Command::Delete { collection, .. }
            | Command::Drop { collection } => collection,
        }
    }
}

/// Outcome of parsing a line: a command to run, or a response to send
/// back without touching storage
pub type Parsed = std::result::Result<Command, Response>;

/// Parse a request line
///
/// Tokens are separated by runs of whitespace. Returns `None` for a blank
/// line. Malformed shapes and unknown names come back as `Err(response)`.
pub fn parse_line(line: &str) -> Option<Parsed> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&name, args) = tokens.split_first()?;

    let parsed = match name {
        "set" => match args {
            [collection, key, value @ ..] if !value.is_empty() => Ok(Command::Set {
                collection: collection.to_string(),
                key: key.to_string(),
                value: value.join(" "),
            }),
            _ => Err(Response::SetIncorrect),
        },
        "get" => match args {
            [collection, key] => Ok(Command::Get {
                collection: collection.to_string(),
                key: key.to_string(),
            }),
            _ => Err(Response::GetIncorrect),
        },
        "delete" => match args {
            [collection, key] => Ok(Command::Delete {
                collection: collection.to_string(),
                key: key.to_string(),
            }),
            _ => Err(Response::DeleteIncorrect),
        },
        "drop" => match args {
            [collection] => Ok(Command::Drop {
                collection: collection.to_string(),
            }),
            _ => Err(Response::DropIncorrect),
        },
        other => Err(Response::UnknownCommand(other.to_string())),
    };

    Some(parsed)
}
