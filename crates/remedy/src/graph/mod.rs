//! The dependency graph of packages and repositories.
//!
//! The graph owns every [`Package`] and [`Repository`] and maintains
//! two adjacency maps — `depends_on` and `used_by` — that are exact
//! inverses of one another. Edges may name packages that were never
//! scanned (standard library, ignored); such edges simply do not
//! resolve to a repository.

pub mod query;
pub mod scan;

use crate::domain::{Package, Repository};
use crate::error::{Error, Result};
use crate::vcs::VcsKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::error;

/// Dependency graph of packages, repositories and import edges.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Graph {
    // If "a" imports "b", depends_on["a"] contains "b" and
    // used_by["b"] contains "a".
    depends_on: BTreeMap<String, BTreeSet<String>>,
    used_by: BTreeMap<String, BTreeSet<String>>,

    packages: BTreeMap<String, Package>,
    repositories: BTreeMap<String, Repository>,

    /// When the graph was last scanned (scan start time).
    pub last_scan: Option<DateTime<Utc>>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the graph knows no repositories.
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Look up a package by import path.
    pub fn package(&self, import_path: &str) -> Option<&Package> {
        self.packages.get(import_path)
    }

    /// Look up a repository by root directory.
    pub fn repository(&self, root: &str) -> Option<&Repository> {
        self.repositories.get(root)
    }

    /// All known repositories, ordered by root.
    pub fn repositories(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.values()
    }

    /// Import paths the named package depends on.
    pub fn depends_on(&self, import_path: &str) -> Option<&BTreeSet<String>> {
        self.depends_on.get(import_path)
    }

    /// Import paths that depend on the named package.
    pub fn used_by(&self, import_path: &str) -> Option<&BTreeSet<String>> {
        self.used_by.get(import_path)
    }

    /// Add a repository. A no-op if the root is already present.
    /// Call this before adding its packages.
    pub fn add_repository(&mut self, root: impl Into<String>, vcs: VcsKind) {
        let root = root.into();
        self.repositories.entry(root.clone()).or_insert(Repository {
            root,
            vcs,
            packages: Vec::new(),
        });
    }

    /// Add a package and link up its import edges.
    ///
    /// The package's repository must already exist in the graph; the
    /// scanner guarantees this ordering.
    pub fn add_package(&mut self, pkg: Package) {
        let Some(repo) = self.repositories.get_mut(&pkg.repo_root) else {
            error!(
                import_path = %pkg.import_path,
                repo_root = %pkg.repo_root,
                "dropping package with unknown repository"
            );
            return;
        };
        repo.packages.push(pkg.import_path.clone());

        for dep in pkg.imports.iter().chain(pkg.test_imports.iter()) {
            self.depends_on
                .entry(pkg.import_path.clone())
                .or_default()
                .insert(dep.clone());
            self.used_by
                .entry(dep.clone())
                .or_default()
                .insert(pkg.import_path.clone());
        }

        self.packages.insert(pkg.import_path.clone(), pkg);
    }

    /// Remove a repository and every package it owned.
    ///
    /// Used when a repository is about to be replaced wholesale by a
    /// rescan, or is no longer observed at all.
    pub fn del_repository(&mut self, root: &str) {
        let Some(repo) = self.repositories.remove(root) else {
            return;
        };
        for import_path in &repo.packages {
            self.del_package(import_path);
        }
    }

    fn del_package(&mut self, import_path: &str) {
        if let Some(deps) = self.depends_on.remove(import_path) {
            for dep in deps {
                if let Some(users) = self.used_by.get_mut(&dep) {
                    users.remove(import_path);
                    if users.is_empty() {
                        self.used_by.remove(&dep);
                    }
                }
            }
        }
        self.packages.remove(import_path);
    }

    /// Sort and deduplicate a repository's package list.
    pub(crate) fn sort_packages(&mut self, root: &str) {
        if let Some(repo) = self.repositories.get_mut(root) {
            repo.packages.sort();
            repo.packages.dedup();
        }
    }

    /// Resolve a user-supplied partial path to exactly one repository.
    ///
    /// Suffix matches are tried first; if none match, any root
    /// containing `key` as a substring is accepted. Either tier fails
    /// if it matches more than one root.
    pub fn find_repo(&self, key: &str) -> Result<&Repository> {
        let mut found = None;
        for (root, repo) in &self.repositories {
            if root.ends_with(key) {
                if found.is_some() {
                    return Err(Error::AmbiguousRepository(key.to_string()));
                }
                found = Some(repo);
            }
        }
        if let Some(repo) = found {
            return Ok(repo);
        }

        for (root, repo) in &self.repositories {
            if root.contains(key) {
                if found.is_some() {
                    return Err(Error::AmbiguousRepository(key.to_string()));
                }
                found = Some(repo);
            }
        }
        found.ok_or_else(|| Error::UnknownRepository(key.to_string()))
    }

    /// Repositories containing packages that packages in `repo`
    /// depend on. A repository is never a member of its own set.
    pub fn repo_deps(&self, repo: &Repository) -> Result<Vec<&Repository>> {
        self.trace(repo, EdgeDir::DependsOn)
    }

    /// Repositories containing packages that depend on packages in
    /// `repo`. A repository is never a member of its own set.
    pub fn repo_users(&self, repo: &Repository) -> Result<Vec<&Repository>> {
        self.trace(repo, EdgeDir::UsedBy)
    }

    fn trace(&self, repo: &Repository, dir: EdgeDir) -> Result<Vec<&Repository>> {
        let through = match dir {
            EdgeDir::DependsOn => &self.depends_on,
            EdgeDir::UsedBy => &self.used_by,
        };
        let mut roots = BTreeSet::new();
        for import_path in &repo.packages {
            let Some(edges) = through.get(import_path) else {
                continue;
            };
            for other in edges {
                if let Some(pkg) = self.packages.get(other) {
                    if pkg.repo_root != repo.root {
                        roots.insert(pkg.repo_root.as_str());
                    }
                }
            }
        }
        roots
            .into_iter()
            .map(|root| {
                self.repositories
                    .get(root)
                    .ok_or_else(|| Error::UnknownRepository(root.to_string()))
            })
            .collect()
    }
}

#[derive(Clone, Copy)]
enum EdgeDir {
    DependsOn,
    UsedBy,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    pub(crate) fn package(import_path: &str, repo_root: &str, imports: &[&str]) -> Package {
        Package {
            import_path: import_path.to_string(),
            dir: PathBuf::from(format!("/src/{import_path}")),
            name: import_path.rsplit('/').next().unwrap_or(import_path).to_string(),
            repo_root: repo_root.to_string(),
            imports: imports.iter().map(|i| (*i).to_string()).collect(),
            test_imports: vec![],
            test_files: vec![],
            standard: false,
            incomplete: false,
        }
    }

    /// Three repositories: b depends on a, c depends on b.
    pub(crate) fn chain_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_repository("/repo/a", VcsKind::Git);
        graph.add_package(package("a/pkg", "/repo/a", &[]));
        graph.add_repository("/repo/b", VcsKind::Git);
        graph.add_package(package("b/pkg", "/repo/b", &["a/pkg"]));
        graph.add_repository("/repo/c", VcsKind::Hg);
        graph.add_package(package("c/pkg", "/repo/c", &["b/pkg"]));
        graph
    }

    #[test]
    fn adjacency_maps_are_inverses() {
        let mut graph = Graph::new();
        graph.add_repository("/repo/x", VcsKind::Git);
        graph.add_package(package("x/a", "/repo/x", &["x/b", "ext/dep"]));
        graph.add_repository("/repo/y", VcsKind::Git);
        graph.add_package(package("x/b", "/repo/y", &["ext/dep"]));

        for (importer, deps) in &graph.depends_on {
            for dep in deps {
                assert!(
                    graph.used_by[dep].contains(importer),
                    "used_by[{dep}] missing {importer}"
                );
            }
        }
        for (importee, users) in &graph.used_by {
            for user in users {
                assert!(
                    graph.depends_on[user].contains(importee),
                    "depends_on[{user}] missing {importee}"
                );
            }
        }
    }

    #[test]
    fn test_imports_create_edges() {
        let mut graph = Graph::new();
        graph.add_repository("/repo/x", VcsKind::Git);
        let mut pkg = package("x/a", "/repo/x", &[]);
        pkg.test_imports.push("x/check".to_string());
        graph.add_package(pkg);

        assert!(graph.depends_on("x/a").unwrap().contains("x/check"));
        assert!(graph.used_by("x/check").unwrap().contains("x/a"));
    }

    #[test]
    fn repo_deps_excludes_self() {
        let mut graph = Graph::new();
        graph.add_repository("/repo/x", VcsKind::Git);
        // x/a imports a sibling package in the same repository.
        graph.add_package(package("x/a", "/repo/x", &["x/b"]));
        graph.add_package(package("x/b", "/repo/x", &[]));

        let repo = graph.repository("/repo/x").unwrap();
        assert!(graph.repo_deps(repo).unwrap().is_empty());
        assert!(graph.repo_users(repo).unwrap().is_empty());
    }

    #[test]
    fn repo_deps_and_users_are_one_hop() {
        let graph = chain_graph();
        let a = graph.repository("/repo/a").unwrap();
        let b = graph.repository("/repo/b").unwrap();
        let c = graph.repository("/repo/c").unwrap();

        assert!(graph.repo_deps(a).unwrap().is_empty());
        let b_deps: Vec<&str> = graph.repo_deps(b).unwrap().iter().map(|r| r.root.as_str()).collect();
        assert_eq!(b_deps, vec!["/repo/a"]);

        let a_users: Vec<&str> = graph.repo_users(a).unwrap().iter().map(|r| r.root.as_str()).collect();
        assert_eq!(a_users, vec!["/repo/b"]);
        assert!(graph.repo_users(c).unwrap().is_empty());
    }

    #[test]
    fn edges_to_unscanned_packages_do_not_resolve() {
        let mut graph = Graph::new();
        graph.add_repository("/repo/x", VcsKind::Git);
        graph.add_package(package("x/a", "/repo/x", &["fmt", "ext/dep"]));

        let repo = graph.repository("/repo/x").unwrap();
        assert!(graph.repo_deps(repo).unwrap().is_empty());
    }

    #[test]
    fn find_repo_prefers_unique_suffix() {
        let mut graph = Graph::new();
        graph.add_repository("/src/x/a", VcsKind::Git);
        graph.add_repository("/src/x/ab", VcsKind::Git);

        // "a" is a suffix of "/src/x/a" only.
        assert_eq!(graph.find_repo("a").unwrap().root, "/src/x/a");
        // "ab" is a suffix of "/src/x/ab" only.
        assert_eq!(graph.find_repo("ab").unwrap().root, "/src/x/ab");
    }

    #[test]
    fn find_repo_falls_back_to_substring() {
        let mut graph = Graph::new();
        graph.add_repository("/src/x/alpha", VcsKind::Git);
        graph.add_repository("/src/y/beta", VcsKind::Git);

        assert_eq!(graph.find_repo("alph").unwrap().root, "/src/x/alpha");
    }

    #[test]
    fn find_repo_substring_tier_can_be_ambiguous() {
        let mut graph = Graph::new();
        graph.add_repository("/src/x/alpha", VcsKind::Git);
        graph.add_repository("/src/x/alpine", VcsKind::Git);

        let err = graph.find_repo("al").unwrap_err();
        assert!(matches!(err, Error::AmbiguousRepository(_)));
        assert!(err.to_string().contains("non-unique repository specifier"));
    }

    #[test]
    fn find_repo_unknown() {
        let graph = chain_graph();
        let err = graph.find_repo("nonesuch").unwrap_err();
        assert!(matches!(err, Error::UnknownRepository(_)));
    }

    #[test]
    fn del_repository_cascades_to_packages_and_edges() {
        let mut graph = chain_graph();
        graph.del_repository("/repo/b");

        assert!(graph.package("b/pkg").is_none());
        assert!(graph.repository("/repo/b").is_none());
        assert!(graph.depends_on("b/pkg").is_none());
        // a/pkg is no longer used by anything.
        assert!(graph.used_by("a/pkg").is_none());

        // c's forward edge to the now-unknown b/pkg remains but does
        // not resolve.
        let c = graph.repository("/repo/c").unwrap();
        assert!(graph.repo_deps(c).unwrap().is_empty());
    }

    #[test]
    fn add_repository_is_idempotent() {
        let mut graph = Graph::new();
        graph.add_repository("/repo/x", VcsKind::Git);
        graph.add_package(package("x/a", "/repo/x", &[]));
        graph.add_repository("/repo/x", VcsKind::Git);

        assert_eq!(graph.repository("/repo/x").unwrap().packages.len(), 1);
    }
}
