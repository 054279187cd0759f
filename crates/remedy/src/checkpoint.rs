//! Checkpoints: global repository version snapshots.
//!
//! Unlike cabinets, checkpoints have global scope: one file per
//! installation holds every checkpoint, each a filtered set of version
//! pins across all known repositories. Identifiers are sequential and
//! never reused, even after deletion, so they stay meaningful between
//! developers sharing a state directory.

use crate::catalog::PackageCatalog;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::pin::VersionPin;
use crate::vcs::VcsAdapter;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info};

/// File name of the checkpoint store within the state directory.
pub const FILE_NAME: &str = "checkpoints";

const FORMAT_VERSION: u32 = 1;

/// The checkpoint store: all checkpoints ever taken, indexed by id.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CheckpointFile {
    /// The most recently assigned identifier. Never decremented.
    pub last_id: u64,

    /// Checkpoint data indexed by identifier.
    pub checkpoints: BTreeMap<u64, Checkpoint>,
}

/// One saved checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Free-text comment supplied at save time.
    pub comment: String,

    /// Who created the checkpoint (`user@host`).
    pub creator: String,

    /// When the checkpoint was created.
    pub created: DateTime<Utc>,

    /// Pinned versions of the repositories that passed the filters.
    pub pins: Vec<VersionPin>,
}

impl CheckpointFile {
    /// Load the store from `path`. A missing file is an empty store.
    pub async fn load(path: &Path) -> Result<Self> {
        Ok(remedy_store::try_load(path, FORMAT_VERSION)
            .await?
            .unwrap_or_default())
    }

    /// Rewrite the store at `path` wholesale.
    pub async fn store(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        remedy_store::save(path, FORMAT_VERSION, self).await?;
        Ok(())
    }

    /// Save a new checkpoint covering every known repository whose
    /// pattern matches `filter` and does not match `exclude`.
    /// Returns the assigned identifier.
    pub async fn save(
        &mut self,
        graph: &Graph,
        adapter: &dyn VcsAdapter,
        comment: &str,
        filter: &Regex,
        exclude: &Regex,
    ) -> Result<u64> {
        let mut pins = Vec::new();
        for repo in graph.repositories() {
            let pin = VersionPin::capture(repo, adapter).await?;
            if !filter.is_match(&pin.pattern) || exclude.is_match(&pin.pattern) {
                continue;
            }
            pins.push(pin);
        }

        self.last_id += 1;
        let id = self.last_id;
        info!(id, repositories = pins.len(), "created checkpoint");
        self.checkpoints.insert(
            id,
            Checkpoint {
                comment: comment.to_string(),
                creator: creator(),
                created: Utc::now(),
                pins,
            },
        );
        Ok(id)
    }

    /// Apply the checkpoint with the given id, pinning every recorded
    /// repository whose pattern passes the filters given *now* (not
    /// necessarily those used at save time).
    ///
    /// Pins are attempted independently; failures are counted and
    /// reported as one aggregate error.
    pub async fn apply(
        &self,
        graph: &mut Graph,
        catalog: &dyn PackageCatalog,
        adapter: &dyn VcsAdapter,
        id: u64,
        filter: &Regex,
        exclude: &Regex,
    ) -> Result<()> {
        let checkpoint = self
            .checkpoints
            .get(&id)
            .ok_or(Error::CheckpointNotFound(id))?;

        info!(id, comment = %checkpoint.comment, "restoring checkpoint");
        info!(creator = %checkpoint.creator, created = %checkpoint.created, "checkpoint origin");

        let mut failed = 0;
        for pin in &checkpoint.pins {
            if !filter.is_match(&pin.pattern) || exclude.is_match(&pin.pattern) {
                info!(pattern = %pin.pattern, "skip");
                continue;
            }
            if let Err(err) = pin.apply(graph, catalog, adapter).await {
                error!(error = %err, "apply");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(Error::PartialFailure { failed });
        }
        Ok(())
    }

    /// Delete the checkpoint with the given id. The identifier is not
    /// reused by later saves.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        if self.checkpoints.remove(&id).is_none() {
            return Err(Error::CheckpointNotFound(id));
        }
        Ok(())
    }

    /// The most recent `max` checkpoints (all of them when `max` is
    /// zero), newest first.
    pub fn recent(&self, max: usize) -> Vec<(u64, &Checkpoint)> {
        let iter = self.checkpoints.iter().rev().map(|(id, cp)| (*id, cp));
        if max == 0 {
            iter.collect()
        } else {
            iter.take(max).collect()
        }
    }
}

fn creator() -> String {
    let host = whoami::fallible::hostname().unwrap_or_else(|_| "unknown_host".to_string());
    format!("{}@{host}", whoami::username())
}
