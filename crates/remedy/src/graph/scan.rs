//! Scanning packages into the dependency graph.
//!
//! Classification (the Keep predicate plus VCS root detection, which
//! costs one subprocess probe per configured VCS) runs concurrently
//! with a bounded number of records in flight. Graph mutation is
//! strictly single-threaded: the merge starts only after every
//! classification has completed.

use super::Graph;
use crate::catalog::{PackageCatalog, RawPackage};
use crate::domain::Package;
use crate::error::Result;
use crate::vcs::{VcsAdapter, VcsKind};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// The scan target covering every known package.
pub const SCAN_ALL: &str = "all";

/// How many package classifications may be in flight at once.
const SCAN_CONCURRENCY: usize = 32;

/// Scans catalog records into a [`Graph`].
pub struct Scanner<'a> {
    graph: &'a mut Graph,
    catalog: &'a dyn PackageCatalog,
    vcs: &'a dyn VcsAdapter,
}

impl<'a> Scanner<'a> {
    /// Create a scanner mutating `graph`.
    pub fn new(
        graph: &'a mut Graph,
        catalog: &'a dyn PackageCatalog,
        vcs: &'a dyn VcsAdapter,
    ) -> Self {
        Self { graph, catalog, vcs }
    }

    /// Scan the packages matching `target` and update their records
    /// in the graph.
    ///
    /// Every repository observed in this pass is replaced wholesale,
    /// so its package list afterwards reflects only the current pass.
    /// The graph's `last_scan` is set to the scan *start* time, so a
    /// repository touched mid-scan is not considered already scanned.
    pub async fn scan(&mut self, target: &str) -> Result<()> {
        let start = Utc::now();
        info!(pattern = target, "scanning packages");

        let records = self.catalog.list(target).await?;
        let total = records.len();

        let vcs = self.vcs;
        let classified: Vec<(Package, VcsKind)> = stream::iter(records)
            .map(|record| classify(record, vcs))
            .buffer_unordered(SCAN_CONCURRENCY)
            .filter_map(|found| async move { found })
            .collect()
            .await;

        let mut seen = BTreeSet::new();
        for (pkg, kind) in classified {
            let root = pkg.repo_root.clone();
            if seen.insert(root.clone()) {
                self.graph.del_repository(&root);
                self.graph.add_repository(root, kind);
            }
            self.graph.add_package(pkg);
        }
        for root in &seen {
            self.graph.sort_packages(root);
        }

        self.graph.last_scan = Some(start);
        let elapsed = Utc::now() - start;
        info!(
            records = total,
            repositories = seen.len(),
            %elapsed,
            "scan finished"
        );
        Ok(())
    }
}

/// Classify one catalog record: apply the Keep predicate and detect
/// the owning repository. Returns `None` for records that should not
/// enter the graph.
async fn classify(record: RawPackage, vcs: &dyn VcsAdapter) -> Option<(Package, VcsKind)> {
    let mut pkg = record.into_package();
    if !pkg.keep() {
        debug!(import_path = %pkg.import_path, "skipping");
        return None;
    }

    let (kind, root) = detect_vcs(&pkg.dir, vcs).await?;
    debug!(import_path = %pkg.import_path, root = %root, "adding");
    pkg.repo_root = root;
    Some((pkg, kind))
}

/// Probe every VCS kind for a repository containing `dir`. When more
/// than one claims it, the longer root path wins; identical-length
/// claims are not disambiguated.
async fn detect_vcs(dir: &Path, vcs: &dyn VcsAdapter) -> Option<(VcsKind, String)> {
    let mut found: Option<(VcsKind, String)> = None;
    for kind in VcsKind::ALL {
        if let Some(root) = vcs.root_of(kind, dir).await {
            if found.as_ref().is_none_or(|(_, best)| root.len() > best.len()) {
                found = Some((kind, root));
            }
        }
    }
    found
}
