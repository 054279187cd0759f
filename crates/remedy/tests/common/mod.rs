//! Common test utilities shared across integration tests.
//!
//! Mock implementations of the three external adapters, plus graph
//! fixtures. The mocks record every call so tests can assert on
//! ordering and rollback behavior.

#![allow(dead_code)]

use async_trait::async_trait;
use remedy::catalog::{PackageCatalog, RawPackage};
use remedy::domain::Package;
use remedy::error::{Error, Result};
use remedy::graph::Graph;
use remedy::toolchain::{Action, BuildRunner};
use remedy::vcs::{Tag, VcsAdapter, VcsKind};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Scripted VCS adapter: probe answers, revision state, and a log of
/// every successful switch.
#[derive(Debug, Default)]
pub struct MockVcs {
    probes: BTreeMap<(VcsKind, PathBuf), String>,
    refuse: BTreeSet<(String, String)>,
    heads: Mutex<BTreeMap<String, String>>,
    switches: Mutex<Vec<(String, String)>>,
}

impl MockVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `root_of(kind, dir)` probes with `root`.
    pub fn with_probe(mut self, kind: VcsKind, dir: &str, root: &str) -> Self {
        self.probes
            .insert((kind, PathBuf::from(dir)), root.to_string());
        self
    }

    /// Set the current revision of the repository at `root`.
    pub fn with_head(self, root: &str, rev: &str) -> Self {
        self.heads
            .lock()
            .unwrap()
            .insert(root.to_string(), rev.to_string());
        self
    }

    /// Make `switch_to(root, rev)` fail.
    pub fn refuse_switch(mut self, root: &str, rev: &str) -> Self {
        self.refuse.insert((root.to_string(), rev.to_string()));
        self
    }

    /// The repository's current revision, as the mock sees it.
    pub fn head(&self, root: &str) -> Option<String> {
        self.heads.lock().unwrap().get(root).cloned()
    }

    /// Every successful `(root, rev)` switch, in order.
    pub fn switches(&self) -> Vec<(String, String)> {
        self.switches.lock().unwrap().clone()
    }

    /// Overwrite a head out-of-band, simulating repository drift.
    pub fn set_head(&self, root: &str, rev: &str) {
        self.heads
            .lock()
            .unwrap()
            .insert(root.to_string(), rev.to_string());
    }
}

#[async_trait]
impl VcsAdapter for MockVcs {
    async fn root_of(&self, kind: VcsKind, dir: &Path) -> Option<String> {
        self.probes.get(&(kind, dir.to_path_buf())).cloned()
    }

    async fn current_revision(&self, kind: VcsKind, root: &str) -> Result<String> {
        self.heads
            .lock()
            .unwrap()
            .get(root)
            .cloned()
            .ok_or_else(|| Error::Vcs {
                kind,
                op: "current revision",
                detail: format!("no head for {root:?}"),
            })
    }

    async fn switch_to(&self, kind: VcsKind, root: &str, rev: &str) -> Result<()> {
        if self.refuse.contains(&(root.to_string(), rev.to_string())) {
            return Err(Error::Vcs {
                kind,
                op: "switch revision",
                detail: format!("refusing to switch {root:?} to {rev:?}"),
            });
        }
        self.heads
            .lock()
            .unwrap()
            .insert(root.to_string(), rev.to_string());
        self.switches
            .lock()
            .unwrap()
            .push((root.to_string(), rev.to_string()));
        Ok(())
    }

    async fn ancestor_tags(&self, _kind: VcsKind, _root: &str, _rev: &str) -> Result<Vec<Tag>> {
        Ok(Vec::new())
    }

    async fn descendant_tags(&self, _kind: VcsKind, _root: &str, _rev: &str) -> Result<Vec<Tag>> {
        Ok(Vec::new())
    }
}

/// Scripted build runner recording every invocation.
#[derive(Debug, Default)]
pub struct MockRunner {
    failures: BTreeSet<(Action, String)>,
    invocations: Mutex<Vec<(Action, String)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `run(action, import_path)` fail.
    pub fn fail_on(mut self, action: Action, import_path: &str) -> Self {
        self.failures.insert((action, import_path.to_string()));
        self
    }

    /// Every `(action, import_path)` invocation, in order, including
    /// the failing one.
    pub fn invocations(&self) -> Vec<(Action, String)> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildRunner for MockRunner {
    async fn run(&self, action: Action, import_path: &str) -> Result<()> {
        self.invocations
            .lock()
            .unwrap()
            .push((action, import_path.to_string()));
        if self.failures.contains(&(action, import_path.to_string())) {
            return Err(Error::Build {
                action,
                import_path: import_path.to_string(),
                detail: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Scripted package catalog returning a fixed record set for every
/// target.
#[derive(Debug, Default)]
pub struct MockCatalog {
    records: Vec<RawPackage>,
    fail_fetch: BTreeSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new(records: Vec<RawPackage>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Make `fetch(import_path)` fail.
    pub fn fail_fetch(mut self, import_path: &str) -> Self {
        self.fail_fetch.insert(import_path.to_string());
        self
    }

    /// Every import path fetched, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageCatalog for MockCatalog {
    async fn list(&self, _target: &str) -> Result<Vec<RawPackage>> {
        Ok(self.records.clone())
    }

    async fn fetch(&self, import_path: &str) -> Result<()> {
        if self.fail_fetch.contains(import_path) {
            return Err(Error::Catalog(format!("cannot fetch {import_path:?}")));
        }
        self.fetched.lock().unwrap().push(import_path.to_string());
        Ok(())
    }
}

/// A raw catalog record with the usual defaults.
pub fn record(import_path: &str, dir: &str, imports: &[&str]) -> RawPackage {
    RawPackage {
        dir: PathBuf::from(dir),
        import_path: import_path.to_string(),
        name: import_path
            .rsplit('/')
            .next()
            .unwrap_or(import_path)
            .to_string(),
        standard: false,
        incomplete: false,
        test_files: Vec::new(),
        imports: imports.iter().map(|i| (*i).to_string()).collect(),
        test_imports: Vec::new(),
    }
}

/// A graph package with the usual defaults.
pub fn package(import_path: &str, repo_root: &str, imports: &[&str]) -> Package {
    Package {
        import_path: import_path.to_string(),
        dir: PathBuf::from(format!("/src/{import_path}")),
        name: import_path
            .rsplit('/')
            .next()
            .unwrap_or(import_path)
            .to_string(),
        repo_root: repo_root.to_string(),
        imports: imports.iter().map(|i| (*i).to_string()).collect(),
        test_imports: Vec::new(),
        test_files: vec!["pkg_test.src".to_string()],
        standard: false,
        incomplete: false,
    }
}

/// A binary (entry-point) package.
pub fn binary_package(import_path: &str, repo_root: &str, imports: &[&str]) -> Package {
    let mut pkg = package(import_path, repo_root, imports);
    pkg.name = "main".to_string();
    pkg
}

/// Three single-package repositories at the given roots: the second
/// depends on the first, the third on the second.
pub fn chain_graph_at(a: &str, b: &str, c: &str) -> Graph {
    let mut graph = Graph::new();
    graph.add_repository(a, VcsKind::Git);
    graph.add_package(package("a/pkg", a, &[]));
    graph.add_repository(b, VcsKind::Git);
    graph.add_package(package("b/pkg", b, &["a/pkg"]));
    graph.add_repository(c, VcsKind::Git);
    graph.add_package(package("c/pkg", c, &["b/pkg"]));
    graph
}

/// The chain fixture at its conventional roots.
pub fn chain_graph() -> Graph {
    chain_graph_at("/repo/a", "/repo/b", "/repo/c")
}
