//! CLI argument structs for all commands.

use clap::{ArgAction, Parser};

/// Arguments for the `tags` command
#[derive(Parser, Debug, Clone)]
pub struct TagsArgs {
    /// Repository specifier (any unique piece of its root path)
    pub repo: String,

    /// Only show upgrades (overrides --down)
    #[arg(long)]
    pub up: bool,

    /// Only show downgrades
    #[arg(long)]
    pub down: bool,
}

/// Arguments for the `prescribe` command
#[derive(Parser, Debug, Clone)]
pub struct PrescribeArgs {
    /// Repository specifier (any unique piece of its root path)
    pub repo: String,

    /// Target revision: anything the underlying VCS understands as a
    /// commit, usually a tag, branch, or commit id
    pub rev: String,

    /// Build all updated packages
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub build: bool,

    /// Test all updated packages
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub test: bool,

    /// Install all updated packages
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub install: bool,

    /// Link and install all updated binaries
    #[arg(long)]
    pub link: bool,

    /// Recursively process depending repositories too
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub cascade: bool,

    /// Automatically roll back a failed upgrade
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub rollback: bool,
}

/// Arguments for the `cabinet` command
#[derive(Parser, Debug, Clone)]
pub struct CabinetArgs {
    /// Repository specifier (any unique piece of its root path)
    pub repo: String,

    /// Cabinet identifier: overrides the date-based id for --build,
    /// selects the cabinet (by unique substring) for --open/--dump
    pub id: Option<String>,

    /// Create a new cabinet
    #[arg(long, conflicts_with_all = ["open", "dump"])]
    pub build: bool,

    /// Open the selected cabinet and pin its dependencies
    #[arg(long, conflicts_with = "dump")]
    pub open: bool,

    /// Show the contents of the selected cabinet
    #[arg(long)]
    pub dump: bool,

    /// List matching cabinet files (the default)
    #[arg(long)]
    pub list: bool,

    /// Test the repository's packages before saving a cabinet
    #[arg(long, action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub test: bool,
}

/// Arguments for the `checkpoint` command
#[derive(Parser, Debug, Clone)]
pub struct CheckpointArgs {
    /// Save a new checkpoint with the given comment
    #[arg(long, value_name = "COMMENT", conflicts_with_all = ["apply", "delete"])]
    pub save: Option<String>,

    /// Apply the checkpoint with the given id
    #[arg(long, value_name = "ID", conflicts_with = "delete")]
    pub apply: Option<u64>,

    /// Delete the checkpoint with the given id
    #[arg(long, value_name = "ID")]
    pub delete: Option<u64>,

    /// List checkpoints (the default)
    #[arg(long)]
    pub list: bool,

    /// Number of checkpoints to list (0 for all)
    #[arg(short = 'n', long = "count", default_value_t = 15)]
    pub count: usize,

    /// Regular expression selecting repositories to save/restore
    #[arg(long, default_value = ".*", value_name = "REGEX")]
    pub filter: String,

    /// Regular expression excluding repositories from save/restore
    #[arg(long, default_value = "^$", value_name = "REGEX")]
    pub exclude: String,
}
