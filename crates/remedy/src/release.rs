//! The cascading release orchestrator.
//!
//! Prescribing moves a repository to a target revision, rebuilds it,
//! and propagates the rebuild to every repository that transitively
//! depends on it. Work is intentionally serialized: a repository's
//! working directory is shared mutable state, and the external build
//! tool is awaited to completion one invocation at a time.
//!
//! Failure semantics: only the originally pinned repository is ever
//! rolled back. Repositories processed earlier in the cascade are
//! left at whatever state their own build/install produced.

use crate::domain::Repository;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::toolchain::{Action, BuildRunner};
use crate::vcs::VcsAdapter;
use std::collections::{BTreeSet, VecDeque};
use tracing::{error, info, warn};

/// Which steps to run, and how to react to failure.
#[derive(Debug, Clone)]
pub struct Prescription {
    /// Build all updated packages.
    pub build: bool,
    /// Test all updated packages.
    pub test: bool,
    /// Install all updated packages.
    pub install: bool,
    /// Also install binary packages.
    pub link: bool,
    /// Recursively process repositories that depend on the target.
    pub cascade: bool,
    /// Roll the target repository back if anything fails.
    pub rollback: bool,
}

impl Default for Prescription {
    fn default() -> Self {
        Self {
            build: true,
            test: true,
            install: true,
            link: false,
            cascade: true,
            rollback: true,
        }
    }
}

/// Pin the repository matching `repo_key` to `rev` and process it and
/// (if enabled) everything that depends on it.
///
/// If the initial switch fails the orchestration aborts with the
/// repository unmoved. After a successful switch, any processing
/// failure triggers a switch back to the pre-update revision (unless
/// rollback is disabled); a rollback failure is reported as a
/// follow-up and the original error is surfaced.
pub async fn prescribe(
    graph: &Graph,
    adapter: &dyn VcsAdapter,
    runner: &dyn BuildRunner,
    repo_key: &str,
    rev: &str,
    prescription: &Prescription,
) -> Result<()> {
    let repo = graph.find_repo(repo_key)?;

    let fallback = repo.head(adapter).await?;
    repo.switch_to(adapter, rev).await?;
    info!(repo = %repo.root, rev, "pinned");

    let outcome = cascade(graph, runner, &repo.root, prescription).await;
    if let Err(err) = &outcome {
        if prescription.rollback {
            warn!(%err, fallback = %fallback, "errors detected, rolling back");
            if let Err(rollback_err) = repo.switch_to(adapter, &fallback).await {
                error!(error = %rollback_err, "rollback failed");
            }
        }
    }
    outcome
}

/// Fixed-point worklist over the dependent set. Each repository enters
/// the set at most once, so the loop is bounded by the repository
/// count.
async fn cascade(
    graph: &Graph,
    runner: &dyn BuildRunner,
    origin: &str,
    prescription: &Prescription,
) -> Result<()> {
    let mut queue = VecDeque::from([origin.to_string()]);
    let mut seen = BTreeSet::from([origin.to_string()]);

    while let Some(root) = queue.pop_front() {
        let repo = graph
            .repository(&root)
            .ok_or_else(|| Error::UnknownRepository(root.clone()))?;
        process(graph, runner, repo, prescription).await?;

        if prescription.cascade {
            for user in graph.repo_users(repo)? {
                if seen.insert(user.root.clone()) {
                    info!(repo = %user.root, "cascade");
                    queue.push_back(user.root.clone());
                }
            }
        }
    }
    Ok(())
}

/// Run the enabled actions over every package the repository owns, in
/// package order.
async fn process(
    graph: &Graph,
    runner: &dyn BuildRunner,
    repo: &Repository,
    prescription: &Prescription,
) -> Result<()> {
    info!(repo = %repo.root, "processing {repo}");
    let steps = [
        (prescription.build, Action::Build),
        (prescription.test, Action::Test),
        (prescription.install, Action::Install),
    ];
    for (enabled, action) in steps {
        if !enabled {
            continue;
        }
        for import_path in &repo.packages {
            let pkg = graph
                .package(import_path)
                .ok_or_else(|| Error::UnknownPackage(import_path.clone()))?;
            match action {
                Action::Test if !pkg.is_testable() => continue,
                Action::Install if pkg.is_binary() && !prescription.link => continue,
                _ => {}
            }
            info!("   - {action} {import_path}");
            runner.run(action, import_path).await?;
        }
    }
    Ok(())
}
