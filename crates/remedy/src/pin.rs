//! Version pins: the unit of snapshot data.
//!
//! A pin records a repository's display pattern, the candidate import
//! paths through which the repository can be relocated later, and the
//! revision to restore. Cabinets and checkpoints are lists of pins.

use crate::catalog::PackageCatalog;
use crate::domain::Repository;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph::scan::Scanner;
use crate::vcs::{VcsAdapter, VcsKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A pinned repository revision. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPin {
    /// Pattern used to rescan for the repository when applying.
    pub pattern: String,

    /// Candidate import paths to relocate the repository through, in
    /// order.
    pub packages: Vec<String>,

    /// The revision to pin the repository to.
    pub revision: String,
}

impl VersionPin {
    /// Record the repository's current revision as a pin.
    pub async fn capture(repo: &Repository, adapter: &dyn VcsAdapter) -> Result<Self> {
        let revision = repo.head(adapter).await?;
        Ok(Self {
            pattern: repo.pattern(),
            packages: repo.packages.clone(),
            revision,
        })
    }

    /// Locate the pinned repository and move it to the recorded
    /// revision.
    ///
    /// Each candidate package is tried in order: fetch it if missing,
    /// rescan the pin's pattern, and check that the graph now knows
    /// the package and its owning repository. The first candidate
    /// that resolves wins. Pinning captures the repository's current
    /// revision as a fallback; if the switch fails the fallback is
    /// restored, and if that also fails both errors are reported
    /// together.
    pub async fn apply(
        &self,
        graph: &mut Graph,
        catalog: &dyn PackageCatalog,
        adapter: &dyn VcsAdapter,
    ) -> Result<()> {
        let mut located: Option<(String, VcsKind)> = None;
        for candidate in &self.packages {
            if let Err(err) = catalog.fetch(candidate).await {
                debug!(candidate, error = %err, "fetch failed");
                continue;
            }
            if let Err(err) = Scanner::new(graph, catalog, adapter).scan(&self.pattern).await {
                debug!(pattern = %self.pattern, error = %err, "rescan failed");
                continue;
            }
            let Some(pkg) = graph.package(candidate) else {
                continue;
            };
            let Some(repo) = graph.repository(&pkg.repo_root) else {
                continue;
            };
            located = Some((repo.root.clone(), repo.vcs));
            break;
        }
        let Some((root, kind)) = located else {
            return Err(Error::LocateFailed {
                pattern: self.pattern.clone(),
                revision: self.revision.clone(),
            });
        };

        let fallback =
            adapter
                .current_revision(kind, &root)
                .await
                .map_err(|_| Error::NoFallback {
                    pattern: self.pattern.clone(),
                    revision: self.revision.clone(),
                })?;

        if let Err(pin_err) = adapter.switch_to(kind, &root, &self.revision).await {
            if let Err(fallback_err) = adapter.switch_to(kind, &root, &fallback).await {
                return Err(Error::PinUnrecoverable {
                    pattern: self.pattern.clone(),
                    revision: self.revision.clone(),
                    fallback,
                    pin_detail: pin_err.to_string(),
                    fallback_detail: fallback_err.to_string(),
                });
            }
            return Err(Error::PinFailed {
                pattern: self.pattern.clone(),
                revision: self.revision.clone(),
                detail: pin_err.to_string(),
            });
        }

        info!(pattern = %self.pattern, revision = %self.revision, "pinned");
        Ok(())
    }
}
