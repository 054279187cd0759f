//! Error types for remedy operations.
//!
//! Internal components return errors to their caller; only the CLI
//! layer converts an error into process termination. Best-effort
//! operations (cabinet open, checkpoint apply) attempt every unit
//! independently and report an aggregate [`Error::PartialFailure`]
//! instead of halting on the first bad pin.

use crate::toolchain::Action;
use crate::vcs::VcsKind;
use std::io;
use thiserror::Error;

/// The error type for remedy operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot-file storage error.
    #[error(transparent)]
    Store(#[from] remedy_store::Error),

    /// A filter or VCS output pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// No repository root matches the given specifier.
    #[error("unknown repository {0:?}")]
    UnknownRepository(String),

    /// More than one repository root matches the given specifier.
    #[error("non-unique repository specifier {0:?}")]
    AmbiguousRepository(String),

    /// A repository's package list names an import path the graph
    /// does not know.
    #[error("unknown package {0:?}")]
    UnknownPackage(String),

    /// A version-control command failed.
    #[error("{kind}: {op}: {detail}")]
    Vcs {
        /// Which VCS the command belonged to.
        kind: VcsKind,
        /// The operation being performed.
        op: &'static str,
        /// The underlying command's error text.
        detail: String,
    },

    /// The package lister failed or produced unusable output.
    #[error("catalog: {0}")]
    Catalog(String),

    /// The external build tool reported failure.
    #[error("{action} {import_path:?} failed: {detail}")]
    Build {
        /// The action that was running.
        action: Action,
        /// The package it ran on.
        import_path: String,
        /// Exit status or spawn error text.
        detail: String,
    },

    /// None of a version pin's candidate packages resolved to a
    /// known repository.
    #[error("apply({pattern:?}@{revision:?}): unable to locate repository")]
    LocateFailed {
        /// The pin's rescan pattern.
        pattern: String,
        /// The revision that was to be pinned.
        revision: String,
    },

    /// The located repository's current revision could not be read,
    /// so there is nothing to fall back to.
    #[error("apply({pattern:?}@{revision:?}): unable to determine fallback revision")]
    NoFallback {
        /// The pin's rescan pattern.
        pattern: String,
        /// The revision that was to be pinned.
        revision: String,
    },

    /// Pinning failed but the fallback revision was restored.
    #[error("apply({pattern:?}@{revision:?}): pin failed: {detail}")]
    PinFailed {
        /// The pin's rescan pattern.
        pattern: String,
        /// The revision that failed to pin.
        revision: String,
        /// The underlying switch error text.
        detail: String,
    },

    /// Pinning failed and so did the switch back to the fallback.
    #[error(
        "apply({pattern:?}): pin({revision:?}) [{pin_detail}] and fallback({fallback:?}) [{fallback_detail}] failed"
    )]
    PinUnrecoverable {
        /// The pin's rescan pattern.
        pattern: String,
        /// The revision that failed to pin.
        revision: String,
        /// The fallback revision that also failed.
        fallback: String,
        /// Error text from the pin attempt.
        pin_detail: String,
        /// Error text from the fallback attempt.
        fallback_detail: String,
    },

    /// No cabinet file matches the identifier pattern.
    #[error("no matching cabinet files found")]
    NoMatchingCabinets,

    /// The identifier pattern matches more than one cabinet file.
    #[error("non-unique id pattern {pattern:?} (matched {count} cabinets)")]
    NonUniqueCabinetId {
        /// The identifier substring that was given.
        pattern: String,
        /// How many cabinet files it matched.
        count: usize,
    },

    /// The checkpoint id is not present in the checkpoint file.
    #[error("checkpoint {0} does not exist")]
    CheckpointNotFound(u64),

    /// Aggregate failure from a best-effort pin sweep.
    #[error("failed to pin {failed} repositories")]
    PartialFailure {
        /// How many pins could not be applied.
        failed: usize,
    },
}

/// A specialized Result type for remedy operations.
pub type Result<T> = std::result::Result<T, Error>;
