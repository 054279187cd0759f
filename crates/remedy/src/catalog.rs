//! Package catalog adapter.
//!
//! The catalog is an external tool that, given a target pattern, emits
//! a stream of JSON package records (`go list -e -json` style). The
//! [`PackageCatalog`] trait is the seam the scanner and version pins
//! talk to; [`CommandCatalog`] is the subprocess-backed implementation.

use crate::domain::Package;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// A raw package record as emitted by the lister.
///
/// Field names follow the lister's wire format; unknown fields are
/// ignored and missing fields default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RawPackage {
    /// Directory containing the package sources.
    pub dir: PathBuf,
    /// Import path of the package.
    pub import_path: String,
    /// Declared package name.
    pub name: String,
    /// The package is part of the standard library.
    pub standard: bool,
    /// The package or a dependency had an error.
    pub incomplete: bool,
    /// Test files in the package.
    #[serde(rename = "TestGoFiles")]
    pub test_files: Vec<String>,
    /// Import paths used by the package.
    pub imports: Vec<String>,
    /// Import paths used by the package's tests.
    pub test_imports: Vec<String>,
}

impl RawPackage {
    /// Convert the record into a graph [`Package`]. The owning
    /// repository root is left empty for the scanner to fill in.
    pub fn into_package(self) -> Package {
        Package {
            import_path: self.import_path,
            dir: self.dir,
            name: self.name,
            repo_root: String::new(),
            imports: self.imports,
            test_imports: self.test_imports,
            test_files: self.test_files,
            standard: self.standard,
            incomplete: self.incomplete,
        }
    }
}

/// External package lister and fetcher.
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    /// List the package records matching `target`.
    async fn list(&self, target: &str) -> Result<Vec<RawPackage>>;

    /// Make the package available locally (fetch-if-missing,
    /// sources only).
    async fn fetch(&self, import_path: &str) -> Result<()>;
}

/// [`PackageCatalog`] backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    command: String,
}

impl CommandCatalog {
    /// Create a catalog driving the named lister command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl PackageCatalog for CommandCatalog {
    async fn list(&self, target: &str) -> Result<Vec<RawPackage>> {
        debug!(pattern = target, "listing packages");
        let output = Command::new(&self.command)
            .args(["list", "-e", "-json"])
            .arg(target)
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|err| Error::Catalog(format!("{} list: {err}", self.command)))?;
        if !output.status.success() {
            return Err(Error::Catalog(format!(
                "{} list {target:?}: {}",
                self.command, output.status
            )));
        }
        Ok(decode_records(&output.stdout))
    }

    async fn fetch(&self, import_path: &str) -> Result<()> {
        debug!(import_path, "fetching package");
        let status = Command::new(&self.command)
            .args(["get", "-d"])
            .arg(import_path)
            .current_dir(std::env::temp_dir())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|err| Error::Catalog(format!("{} get: {err}", self.command)))?;
        if !status.success() {
            return Err(Error::Catalog(format!(
                "{} get {import_path:?}: {status}",
                self.command
            )));
        }
        Ok(())
    }
}

/// Decode a stream of concatenated JSON records.
///
/// A malformed record is logged and decoding stops there; records
/// decoded up to that point are still returned, so one bad entry does
/// not fail the whole scan.
fn decode_records(bytes: &[u8]) -> Vec<RawPackage> {
    let mut records = Vec::new();
    for result in serde_json::Deserializer::from_slice(bytes).into_iter::<RawPackage>() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(error = %err, "error parsing package record");
                break;
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
{
    "Dir": "/src/example.net/kit/dev",
    "ImportPath": "example.net/kit/dev",
    "Name": "dev",
    "Imports": ["example.net/base/log"],
    "TestImports": ["example.net/base/check"],
    "TestGoFiles": ["dev_test.src"]
}
{
    "Dir": "/usr/lib/lang/src/fmt",
    "ImportPath": "fmt",
    "Name": "fmt",
    "Standard": true
}
"#;

    #[test]
    fn decodes_concatenated_records() {
        let records = decode_records(SAMPLE.as_bytes());
        assert_eq!(records.len(), 2);

        let dev = &records[0];
        assert_eq!(dev.import_path, "example.net/kit/dev");
        assert_eq!(dev.imports, vec!["example.net/base/log".to_string()]);
        assert_eq!(dev.test_imports, vec!["example.net/base/check".to_string()]);
        assert!(!dev.standard);

        assert!(records[1].standard);
    }

    #[test]
    fn stops_at_malformed_record_keeping_earlier_ones() {
        let input = format!("{SAMPLE}{{\"ImportPath\": 42}}\n{{\"ImportPath\": \"later\"}}");
        let records = decode_records(input.as_bytes());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn into_package_leaves_repo_root_empty() {
        let records = decode_records(SAMPLE.as_bytes());
        let pkg = records[0].clone().into_package();
        assert!(pkg.repo_root.is_empty());
        assert!(pkg.keep());
        assert!(pkg.is_testable());
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(decode_records(b"").is_empty());
    }
}
