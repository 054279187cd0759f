//! Remedy - cross-repository source dependency management.
//!
//! Remedy discovers which source packages exist across a workspace of
//! independently version-controlled repositories, which repository
//! each lives in, and which packages import which. The resulting
//! graph drives two workflows: moving a repository to a new revision
//! with cascading rebuilds of everything that depends on it (with
//! automatic rollback on failure), and capturing or restoring
//! pinned-revision snapshots of a dependency subtree (cabinets) or of
//! every known repository (checkpoints).

#![forbid(unsafe_code)]

pub mod app;
pub mod cabinet;
pub mod catalog;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod output;
pub mod persist;
pub mod pin;
pub mod release;
pub mod toolchain;
pub mod vcs;

pub use error::{Error, Result};
