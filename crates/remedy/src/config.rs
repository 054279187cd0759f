//! Process configuration.
//!
//! All configuration comes from flags and the environment; there is no
//! config file. The state directory holds the graph cache and the
//! checkpoint store.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one remedy invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory in which to save state.
    pub state_dir: PathBuf,

    /// Automatically save the dependency graph on exit. Disable for
    /// concurrent runs sharing a state directory.
    pub autosave: bool,

    /// Force a rescan of repositories.
    pub rescan: bool,

    /// Nominal amount of time before a cached graph is rescanned.
    pub max_age: Duration,

    /// External command used to list and fetch packages.
    pub lister: String,

    /// External command used to build, test and install packages.
    pub toolchain: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            autosave: true,
            rescan: false,
            max_age: Duration::from_secs(3600),
            lister: "go".to_string(),
            toolchain: "go".to_string(),
        }
    }
}

impl Config {
    /// Path of the graph cache file.
    pub fn graph_path(&self) -> PathBuf {
        self.state_dir.join("graph")
    }

    /// Path of the checkpoint store file.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.state_dir.join(crate::checkpoint::FILE_NAME)
    }
}

/// The default state directory: `$REMEDY_DIR`, or `~/.remedy`.
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = env::var_os("REMEDY_DIR") {
        return PathBuf::from(dir);
    }
    match env::var_os("HOME") {
        Some(home) => Path::new(&home).join(".remedy"),
        None => PathBuf::from(".remedy"),
    }
}
