//! Domain types for dependency tracking.
//!
//! A [`Package`] is an individually importable source unit identified
//! by its import path; a [`Repository`] is a version-controlled
//! directory owning one or more packages. Both are created by the
//! scanner and never mutated afterwards — a rescan supersedes them
//! wholesale.

use crate::error::Result;
use crate::vcs::{Tag, VcsAdapter, VcsKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A source package as recorded by the package catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Import path of the package (unique key).
    pub import_path: String,

    /// Directory containing the package sources.
    pub dir: PathBuf,

    /// Declared package name.
    pub name: String,

    /// Root of the owning repository. Empty until the scanner has
    /// detected it.
    pub repo_root: String,

    /// Import paths used by the package sources.
    pub imports: Vec<String>,

    /// Import paths used only by the package's tests.
    pub test_imports: Vec<String>,

    /// Test files in the package.
    pub test_files: Vec<String>,

    /// The package belongs to the language's standard library.
    pub standard: bool,

    /// The package (or one of its dependencies) failed to parse.
    pub incomplete: bool,
}

impl Package {
    /// Whether the package should be tracked at all.
    ///
    /// Standard-library and parse-incomplete packages are dropped;
    /// binary packages are kept.
    pub fn keep(&self) -> bool {
        !self.standard && !self.incomplete
    }

    /// A package is a binary iff its declared name is "main".
    pub fn is_binary(&self) -> bool {
        self.name == "main"
    }

    /// A package is testable iff it has one or more test files.
    pub fn is_testable(&self) -> bool {
        !self.test_files.is_empty()
    }
}

/// A version-controlled directory containing one or more packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Directory containing the repository.
    pub root: String,

    /// Version control system hosting the repository.
    pub vcs: VcsKind,

    /// Import paths of the packages it contains, sorted and
    /// deduplicated after each scan.
    pub packages: Vec<String>,
}

impl Repository {
    /// The import pattern matching all packages in the repository.
    ///
    /// With more than one package this is the character-wise longest
    /// common prefix followed by `...`; note that the prefix may end
    /// mid path segment (`x/ab` + `x/ac` gives `x/a...`). Stored
    /// snapshots embed this pattern, so it is kept stable.
    pub fn pattern(&self) -> String {
        match self.packages.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, rest @ ..] => {
                let mut prefix = first.len();
                for imp in rest {
                    let common = first
                        .bytes()
                        .zip(imp.bytes())
                        .take_while(|(a, b)| a == b)
                        .count();
                    prefix = prefix.min(common);
                }
                format!("{}...", &first[..prefix])
            }
        }
    }

    /// Report the repository's current revision.
    pub async fn head(&self, adapter: &dyn VcsAdapter) -> Result<String> {
        adapter.current_revision(self.vcs, &self.root).await
    }

    /// Switch the repository's working directory to `rev`.
    pub async fn switch_to(&self, adapter: &dyn VcsAdapter, rev: &str) -> Result<()> {
        adapter.switch_to(self.vcs, &self.root, rev).await
    }

    /// All known tags: upgrades first, then downgrades.
    pub async fn tags(&self, adapter: &dyn VcsAdapter) -> Result<Vec<Tag>> {
        let mut tags = self.upgrades(adapter).await?;
        tags.extend(self.downgrades(adapter).await?);
        Ok(tags)
    }

    /// Tags on revisions descending from the current head.
    pub async fn upgrades(&self, adapter: &dyn VcsAdapter) -> Result<Vec<Tag>> {
        adapter
            .descendant_tags(self.vcs, &self.root, self.vcs.head_rev())
            .await
    }

    /// Tags on ancestors of the current head.
    pub async fn downgrades(&self, adapter: &dyn VcsAdapter) -> Result<Vec<Tag>> {
        adapter
            .ancestor_tags(self.vcs, &self.root, self.vcs.head_rev())
            .await
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn package(name: &str, standard: bool, incomplete: bool) -> Package {
        Package {
            import_path: "example.net/kit/dev".to_string(),
            dir: PathBuf::from("/src/example.net/kit/dev"),
            name: name.to_string(),
            repo_root: String::new(),
            imports: vec![],
            test_imports: vec![],
            test_files: vec![],
            standard,
            incomplete,
        }
    }

    fn repo(packages: &[&str]) -> Repository {
        Repository {
            root: "/src/example.net/kit".to_string(),
            vcs: VcsKind::Git,
            packages: packages.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    #[test]
    fn keep_drops_standard_and_incomplete() {
        assert!(package("dev", false, false).keep());
        assert!(!package("dev", true, false).keep());
        assert!(!package("dev", false, true).keep());
        // Binaries are kept.
        assert!(package("main", false, false).keep());
    }

    #[test]
    fn binary_and_testable_predicates() {
        assert!(package("main", false, false).is_binary());
        assert!(!package("dev", false, false).is_binary());

        let mut pkg = package("dev", false, false);
        assert!(!pkg.is_testable());
        pkg.test_files.push("dev_test.src".to_string());
        assert!(pkg.is_testable());
    }

    #[rstest]
    #[case::empty(&[], "")]
    #[case::single(&["x/a"], "x/a")]
    #[case::common_prefix(&["x/a", "x/b"], "x/...")]
    #[case::prefix_splits_segment(&["foo/bar", "foo/baz"], "foo/ba...")]
    #[case::shorter_first(&["x/a", "x/a/b", "x/a/c"], "x/a...")]
    fn pattern_cases(#[case] packages: &[&str], #[case] expected: &str) {
        assert_eq!(repo(packages).pattern(), expected);
    }

    #[test]
    fn display_matches_pattern() {
        assert_eq!(repo(&["x/a", "x/b"]).to_string(), "x/...");
    }
}
