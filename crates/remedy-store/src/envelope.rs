//! Versioned binary envelope encoding.
//!
//! An envelope is a `u32` format version followed directly by the
//! bincode-encoded payload. The version is checked on decode so that a
//! file written by an incompatible build is rejected before any of the
//! payload is interpreted.

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Cursor;

/// Encode `value` into a versioned envelope.
pub fn encode<T: Serialize>(version: u32, value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    bincode::serialize_into(&mut buf, &version)?;
    bincode::serialize_into(&mut buf, value)?;
    Ok(buf)
}

/// Decode a versioned envelope, checking the format version first.
///
/// # Errors
///
/// Returns [`Error::VersionMismatch`] if the header does not match
/// `expected`, or [`Error::Encoding`] if either the header or the
/// payload fails to decode.
pub fn decode<T: DeserializeOwned>(expected: u32, bytes: &[u8]) -> Result<T> {
    let mut cursor = Cursor::new(bytes);
    let found: u32 = bincode::deserialize_from(&mut cursor)?;
    if found != expected {
        return Err(Error::VersionMismatch { found, expected });
    }
    Ok(bincode::deserialize_from(&mut cursor)?)
}
