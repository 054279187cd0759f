//! Error types for remedy-store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for remedy-store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading or writing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Bincode encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] Box<bincode::ErrorKind>),

    /// The file carries a different format version than expected.
    #[error("file version mismatch: {found}, want {expected}")]
    VersionMismatch {
        /// Version found in the file header.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// Exclusive creation failed because the file already exists.
    #[error("{0:?} already exists")]
    AlreadyExists(PathBuf),
}

/// A specialized Result type for remedy-store operations.
pub type Result<T> = std::result::Result<T, Error>;
