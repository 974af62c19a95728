//! Protocol Module
//!
//! Line-oriented text protocol between clients and the server.
//!
//! ## Request Grammar
//! ```text
//! command    := set-cmd | get-cmd | delete-cmd | drop-cmd
//! set-cmd    := "set" collection key value-token+
//! get-cmd    := "get" collection key
//! delete-cmd := "delete" collection key
//! drop-cmd   := "drop" collection
//! ```
//!
//! Tokens are separated by whitespace; there is no quoting or escaping.
//! Only `set` keeps spaces, by joining its value tokens with one space.
//!
//! ## Responses
//! One line of text per non-blank request, terminated by `\n`.

mod command;
mod response;

pub use command::{parse_line, Command, Parsed};
pub use response::Response;

use crate::engine::Engine;

/// Handle one request line against the engine
///
/// Returns `None` for a blank line, which gets no reply.
pub fn handle_line(engine: &Engine, line: &str) -> Option<Response> {
    let response = match parse_line(line)? {
        Ok(command) => engine.execute(command),
        Err(rejected) => rejected,
    };
    Some(response)
}
