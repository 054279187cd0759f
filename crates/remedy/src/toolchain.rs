//! External build tool invocation.
//!
//! The core only decides which packages to act on and in what order;
//! building, testing and installing are delegated to an external tool
//! run as a subprocess, one invocation at a time, with its output
//! passed through for operator visibility.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// An action the build tool can perform on a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Compile the package.
    Build,
    /// Run the package's tests.
    Test,
    /// Install the package.
    Install,
}

impl Action {
    /// The subcommand verb passed to the build tool.
    pub fn verb(self) -> &'static str {
        match self {
            Action::Build => "build",
            Action::Test => "test",
            Action::Install => "install",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verb())
    }
}

/// Runs build-tool actions against packages.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    /// Run `action` on the package at `import_path`, waiting for
    /// completion.
    async fn run(&self, action: Action, import_path: &str) -> Result<()>;
}

/// [`BuildRunner`] invoking an external command (`<tool> <verb>
/// <import path>`).
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: String,
}

impl CommandRunner {
    /// Create a runner driving the named build tool.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl BuildRunner for CommandRunner {
    async fn run(&self, action: Action, import_path: &str) -> Result<()> {
        debug!(%action, import_path, "running build tool");
        // Run outside any repository so the tool resolves the package
        // by import path rather than working directory.
        let status = Command::new(&self.command)
            .arg(action.verb())
            .arg(import_path)
            .current_dir(std::env::temp_dir())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|err| Error::Build {
                action,
                import_path: import_path.to_string(),
                detail: err.to_string(),
            })?;
        if !status.success() {
            return Err(Error::Build {
                action,
                import_path: import_path.to_string(),
                detail: status.to_string(),
            });
        }
        Ok(())
    }
}
