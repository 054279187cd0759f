//! Versioned binary snapshot-file storage for remedy.
//!
//! Remedy persists three kinds of state as whole files: the dependency
//! graph cache, per-repository cabinet files, and the global checkpoint
//! file. All three share the same on-disk shape — a small format-version
//! header followed by a bincode-encoded payload — and the same write
//! disciplines: atomic replace for files that are rewritten wholesale,
//! and exclusive creation for files that must never be overwritten.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod file;

pub use envelope::{decode, encode};
pub use error::{Error, Result};
pub use file::{create_new, load, save, try_load};
