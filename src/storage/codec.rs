//! Snapshot codec
//!
//! Converts a collection to and from its on-disk JSON form.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use bytes::Bytes;

use crate::error::{CollError, Result};

use super::Collection;

/// Encode a collection as pretty-printed JSON
///
/// Element order matches the in-memory order. Key uniqueness is not
/// re-checked here.
pub fn encode(collection: &Collection) -> Result<Bytes> {
    let mut buf =
        serde_json::to_vec_pretty(collection).map_err(|e| CollError::Encode(e.to_string()))?;
    buf.push(b'\n');
    Ok(Bytes::from(buf))
}

/// Decode a snapshot, reporting malformed input as an error
pub fn try_decode(bytes: &[u8]) -> Result<Collection> {
    serde_json::from_slice(bytes).map_err(|e| CollError::Decode(e.to_string()))
}

/// Decode a snapshot, falling back to an empty collection
///
/// A missing snapshot and a corrupted one look the same to the caller.
pub fn decode(bytes: &[u8]) -> Collection {
    try_decode(bytes).unwrap_or_default()
}

/// Replace the file contents with a full snapshot of `collection`
///
/// Encodes before touching the file, then truncates and writes the whole
/// encoding from offset zero.
pub fn persist(collection: &Collection, file: &mut File, sync: bool) -> Result<()> {
    let encoded = encode(collection)?;

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(&encoded)?;

    if sync {
        file.sync_all()?;
    }

    Ok(())
}
