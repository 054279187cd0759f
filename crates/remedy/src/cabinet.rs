//! Cabinets: repository-local dependency snapshots.
//!
//! A cabinet records, at a point in time, the covering repository's
//! own revision plus a version pin for every repository in its
//! transitive dependency closure. Cabinets are stored inside the
//! covering repository under `.remedy/cabinet-<id>` and are
//! write-once: an existing file is never overwritten.

use crate::catalog::PackageCatalog;
use crate::domain::Repository;
use crate::error::{Error, Result};
use crate::graph::{Graph, query};
use crate::pin::VersionPin;
use crate::toolchain::{Action, BuildRunner};
use crate::vcs::VcsAdapter;
use chrono::{DateTime, Local, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Subdirectory of the covering repository holding its cabinets.
pub const SNAPSHOT_DIR: &str = ".remedy";

/// Filename prefix of cabinet files.
pub const FILE_PREFIX: &str = "cabinet-";

const FORMAT_VERSION: u32 = 1;

/// `chrono` format for date-based cabinet identifiers.
const ID_FORMAT: &str = "%Y%m%d-%H%M%S";

/// The data structure stored in a cabinet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cabinet {
    /// The import pattern covered by this cabinet.
    pub pattern: String,

    /// When the cabinet was created.
    pub created: DateTime<Utc>,

    /// The covering repository's revision at creation.
    pub revision: String,

    /// Pins for the covering repository's transitive dependencies.
    pub pins: Vec<VersionPin>,
}

/// Build a cabinet for `repo` and write it exclusively.
///
/// When `test` is set the covering repository's packages are tested
/// first and a test failure aborts creation. Returns the path of the
/// new cabinet file.
pub async fn build(
    graph: &Graph,
    adapter: &dyn VcsAdapter,
    runner: &dyn BuildRunner,
    repo: &Repository,
    id: Option<&str>,
    test: bool,
) -> Result<PathBuf> {
    let revision = repo.head(adapter).await?;
    let mut pins = Vec::new();
    for dep in query::repo_dep_tree(graph, repo)? {
        pins.push(VersionPin::capture(dep, adapter).await?);
    }
    let data = Cabinet {
        pattern: repo.pattern(),
        created: Utc::now(),
        revision,
        pins,
    };

    if test {
        runner.run(Action::Test, &repo.pattern()).await?;
    }

    let dir = Path::new(&repo.root).join(SNAPSHOT_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let id = match id {
        Some(id) => id.to_string(),
        None => Local::now().format(ID_FORMAT).to_string(),
    };
    let path = dir.join(format!("{FILE_PREFIX}{id}"));
    remedy_store::create_new(&path, FORMAT_VERSION, &data).await?;

    info!(path = %path.display(), "cabinet written");
    Ok(path)
}

/// List cabinet files under `repo_root`, optionally filtered by a
/// regular expression over the file name.
pub async fn list_files(repo_root: &str, id: Option<&str>) -> Result<Vec<PathBuf>> {
    let dir = Path::new(repo_root).join(SNAPSHOT_DIR);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(FILE_PREFIX) {
            files.push((name, entry.path()));
        }
    }
    files.sort();

    if let Some(filter) = id {
        let re = Regex::new(filter)?;
        files.retain(|(name, _)| re.is_match(name));
    }
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Load the single cabinet matching the identifier pattern.
///
/// # Errors
///
/// Fails if the pattern matches no cabinet file, or more than one.
pub async fn load_unique(repo_root: &str, id: Option<&str>) -> Result<(PathBuf, Cabinet)> {
    let mut files = list_files(repo_root, id).await?;
    if files.is_empty() {
        return Err(Error::NoMatchingCabinets);
    }
    if files.len() > 1 {
        return Err(Error::NonUniqueCabinetId {
            pattern: id.unwrap_or_default().to_string(),
            count: files.len(),
        });
    }
    let path = files.remove(0);
    let data = remedy_store::load(&path, FORMAT_VERSION).await?;
    Ok((path, data))
}

/// Open a cabinet: apply every recorded pin, best effort.
///
/// Each pin is attempted independently; failures are counted and
/// reported as one aggregate error, and pins applied before a failure
/// are not undone.
pub async fn open(
    graph: &mut Graph,
    catalog: &dyn PackageCatalog,
    adapter: &dyn VcsAdapter,
    repo_root: &str,
    id: Option<&str>,
) -> Result<()> {
    let (path, data) = load_unique(repo_root, id).await?;

    let mut failed = 0;
    for pin in &data.pins {
        if let Err(err) = pin.apply(graph, catalog, adapter).await {
            error!(error = %err, "open");
            failed += 1;
        }
    }
    if failed > 0 {
        return Err(Error::PartialFailure { failed });
    }

    info!(path = %path.display(), "opened cabinet");
    Ok(())
}
