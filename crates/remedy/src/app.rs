//! Application context for CLI command execution.
//!
//! `App` owns the configuration, the dependency graph, and the three
//! external adapters (package catalog, VCS, build tool) behind their
//! traits. It manages the graph cache lifecycle: load at startup,
//! scan when stale, save on exit.

use crate::catalog::{CommandCatalog, PackageCatalog};
use crate::config::Config;
use crate::error::Result;
use crate::graph::Graph;
use crate::graph::scan::{SCAN_ALL, Scanner};
use crate::persist;
use crate::toolchain::{BuildRunner, CommandRunner};
use crate::vcs::{SystemVcs, VcsAdapter};
use chrono::Utc;
use tracing::warn;

/// Application context for one remedy invocation.
pub struct App {
    pub(crate) config: Config,
    pub(crate) graph: Graph,
    pub(crate) catalog: Box<dyn PackageCatalog>,
    pub(crate) vcs: Box<dyn VcsAdapter>,
    pub(crate) runner: Box<dyn BuildRunner>,
}

impl App {
    /// Create the context, loading the graph cache unless a rescan
    /// was requested.
    pub async fn load(config: Config) -> Self {
        let graph = if config.rescan {
            Graph::new()
        } else {
            persist::load_graph(&config.graph_path()).await
        };
        let catalog = Box::new(CommandCatalog::new(&config.lister));
        let vcs = Box::new(SystemVcs);
        let runner = Box::new(CommandRunner::new(&config.toolchain));
        Self {
            config,
            graph,
            catalog,
            vcs,
            runner,
        }
    }

    /// The dependency graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Scan if the graph is stale, empty, or a rescan was forced.
    /// A no-op otherwise.
    pub async fn ensure_scanned(&mut self) -> Result<()> {
        let stale = match self.graph.last_scan {
            None => true,
            Some(last) => (Utc::now() - last)
                .to_std()
                .is_ok_and(|age| age > self.config.max_age),
        };
        if !stale && !self.graph.is_empty() && !self.config.rescan {
            return Ok(());
        }
        Scanner::new(&mut self.graph, self.catalog.as_ref(), self.vcs.as_ref())
            .scan(SCAN_ALL)
            .await
    }

    /// Save the graph cache if autosave is enabled. Failures are
    /// logged, not fatal.
    pub async fn save(&self) {
        if !self.config.autosave {
            return;
        }
        if let Err(err) = persist::save_graph(&self.config.graph_path(), &self.graph).await {
            warn!(error = %err, "unable to save graph cache");
        }
    }
}
