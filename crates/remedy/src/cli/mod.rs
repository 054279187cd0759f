//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `list`: list recognized repositories
//! - `tags`: list a repository's known tags
//! - `prescribe`: move a repository to a revision and rebuild its
//!   dependents
//! - `cabinet`: save, list, or restore per-repository dependency
//!   snapshots
//! - `checkpoint`: save, list, or restore global version snapshots
//!
//! # Global flags
//!
//! - `--verbose`: raise the log level
//! - `--rescan`: ignore the cached graph and rescan
//! - `--state-dir`: where to keep the graph cache and checkpoints
//! - `--no-autosave`: do not write the graph cache on exit
//! - `--max-age`: seconds before the cached graph goes stale

mod args;
mod execute;

pub use args::{CabinetArgs, CheckpointArgs, PrescribeArgs, TagsArgs};

use crate::app::App;
use crate::config::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Remedy - cross-repository dependency and revision management.
///
/// Remedy scans a workspace of version-controlled repositories into a
/// package dependency graph, and uses it to update repositories with
/// cascading rebuilds and to capture or restore pinned-revision
/// snapshots.
#[derive(Parser, Debug)]
#[command(name = "remedy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn on verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Force a rescan of repositories
    #[arg(long, global = true)]
    pub rescan: bool,

    /// Directory in which to save state (defaults to $REMEDY_DIR or
    /// ~/.remedy)
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Do not save the dependency graph on exit (for concurrent runs)
    #[arg(long, global = true)]
    pub no_autosave: bool,

    /// Seconds before the cached dependency graph is rescanned
    #[arg(long, global = true, value_name = "SECONDS", default_value_t = 3600)]
    pub max_age: u64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List recognized repositories
    ///
    /// Shows every repository in the dependency graph with its import
    /// pattern and the repositories it depends on.
    List,

    /// List known repository tags
    ///
    /// Shows tags reachable from the repository's current revision,
    /// split into upgrades (descendants) and downgrades (ancestors).
    Tags(TagsArgs),

    /// Update a repository to a tag/revision and rebuild dependents
    ///
    /// Pins the repository to the given revision, then builds, tests
    /// and installs each of its packages and (by default) cascades to
    /// every repository that depends on it. A failure rolls the
    /// repository back to its previous revision.
    Prescribe(PrescribeArgs),

    /// Save, list, or restore dependency snapshots
    ///
    /// A cabinet records the pinned revisions of everything a
    /// repository depends on, stored inside the repository itself.
    Cabinet(CabinetArgs),

    /// Save, list, or restore global version snapshots
    ///
    /// Checkpoints cover all known repositories and live in the state
    /// directory, with sequential ids that are never reused.
    Checkpoint(CheckpointArgs),
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the invocation configuration from the global flags.
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        config.autosave = !self.no_autosave;
        config.rescan = self.rescan;
        config.max_age = Duration::from_secs(self.max_age);
        config
    }

    /// Execute the selected command.
    pub async fn execute(self) -> Result<()> {
        let mut app = App::load(self.config()).await;
        app.ensure_scanned().await?;

        let result = match &self.command {
            Commands::List => execute::list(&app),
            Commands::Tags(args) => execute::tags(&app, args).await,
            Commands::Prescribe(args) => execute::prescribe(&app, args).await,
            Commands::Cabinet(args) => execute::cabinet(&mut app, args).await,
            Commands::Checkpoint(args) => execute::checkpoint(&mut app, args).await,
        };

        // Save even when the command failed: a partially applied
        // restore still updated the graph.
        app.save().await;
        result
    }
}
