//! Storage Module
//!
//! Durable representation of a single collection.
//!
//! ## Responsibilities
//! - In-memory collection model (ordered, unique keys)
//! - Encode/decode a collection to its snapshot file
//! - Rewrite the whole snapshot on every mutation
//!
//! ## File Format (JSON)
//! ```text
//! {
//!   "collection": "orders",
//!   "element": [
//!     { "key": "id1", "value": "shipped" },
//!     { "key": "id2", "value": "multi word value" }
//!   ]
//! }
//! ```
//!
//! Snapshots are never appended to. A crash in the middle of a rewrite can
//! leave a truncated file, which decodes as corrupt.

mod codec;
mod collection;

pub use codec::{decode, encode, persist, try_decode};
pub use collection::{Collection, Element};
