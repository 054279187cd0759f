//! Version control adapters.
//!
//! Each supported VCS is described by a table of command templates
//! (after the fashion of a `$PATH` tool, not a library binding); the
//! [`VcsAdapter`] trait exposes the operations the rest of the system
//! needs, and [`SystemVcs`] implements them by running the templated
//! commands as subprocesses.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tracing::debug;

/// A version control system remedy knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// Git.
    Git,
    /// Mercurial.
    Hg,
}

impl VcsKind {
    /// Every supported kind, in probe order.
    pub const ALL: [VcsKind; 2] = [VcsKind::Git, VcsKind::Hg];

    /// The symbolic name of the current revision for this VCS.
    pub fn head_rev(self) -> &'static str {
        self.tool().head_rev
    }

    fn tool(self) -> &'static Tool {
        match self {
            VcsKind::Git => &GIT,
            VcsKind::Hg => &HG,
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Hg => write!(f, "hg"),
        }
    }
}

/// A named revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Revision the tag points at.
    pub rev: String,
}

/// Command templates for one VCS.
///
/// `{rev}` in an argument is replaced with the revision operand. The
/// tag-listing commands must emit one revision per line; `tag_regex`
/// captures the revision in group 1 and a comma/space separated tag
/// list in group 2.
struct Tool {
    command: &'static str,
    head_rev: &'static str,
    root_dir: &'static [&'static str],
    current: &'static [&'static str],
    to_rev: &'static [&'static str],
    ancestors: &'static [&'static str],
    descendants: &'static [&'static str],
    tag_regex: &'static str,
}

static GIT: Tool = Tool {
    command: "git",
    head_rev: "HEAD",
    root_dir: &["rev-parse", "--show-toplevel"],
    current: &["rev-parse", "HEAD"],
    to_rev: &["checkout", "{rev}"],
    ancestors: &["log", "--pretty=format:%H%d", "{rev}"],
    descendants: &["log", "--pretty=format:%H%d", "--ancestry-path", "{rev}..HEAD"],
    tag_regex: r"^([0-9a-f]+) \((.*)\)",
};

static HG: Tool = Tool {
    command: "hg",
    head_rev: ".",
    root_dir: &["root"],
    current: &["log", "--rev=.", "--template={node}"],
    to_rev: &["update", "--rev={rev}"],
    ancestors: &[
        "log",
        "--rev=ancestors({rev}) and tag()",
        "--template={node} {tags}\n",
    ],
    descendants: &[
        "log",
        "--rev=descendants({rev}) and tag()",
        "--template={node} {tags}\n",
    ],
    tag_regex: r"^([a-z0-9]+) (.*)",
};

/// Operations remedy needs from a version control system.
#[async_trait]
pub trait VcsAdapter: Send + Sync {
    /// Report the repository root containing `dir`, or `None` if this
    /// VCS does not claim the directory.
    async fn root_of(&self, kind: VcsKind, dir: &Path) -> Option<String>;

    /// Report the current revision of the repository at `root`.
    async fn current_revision(&self, kind: VcsKind, root: &str) -> Result<String>;

    /// Switch the repository at `root` to `rev`.
    async fn switch_to(&self, kind: VcsKind, root: &str, rev: &str) -> Result<()>;

    /// List tags on ancestors of `rev`, most recent first.
    async fn ancestor_tags(&self, kind: VcsKind, root: &str, rev: &str) -> Result<Vec<Tag>>;

    /// List tags on descendants of `rev`, most recent first.
    async fn descendant_tags(&self, kind: VcsKind, root: &str, rev: &str) -> Result<Vec<Tag>>;
}

/// [`VcsAdapter`] backed by the system `git`/`hg` binaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemVcs;

impl SystemVcs {
    async fn run(
        &self,
        kind: VcsKind,
        dir: &Path,
        op: &'static str,
        args: Vec<String>,
    ) -> Result<Output> {
        let tool = kind.tool();
        debug!(%kind, ?args, dir = %dir.display(), "running vcs command");
        let output = Command::new(tool.command)
            .args(&args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|err| Error::Vcs {
                kind,
                op,
                detail: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(Error::Vcs {
                kind,
                op,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    async fn tags(
        &self,
        kind: VcsKind,
        root: &str,
        op: &'static str,
        template: &'static [&'static str],
        rev: &str,
    ) -> Result<Vec<Tag>> {
        let output = self
            .run(kind, Path::new(root), op, subst(template, rev))
            .await?;
        parse_tags(
            &String::from_utf8_lossy(&output.stdout),
            kind.tool().tag_regex,
        )
    }
}

#[async_trait]
impl VcsAdapter for SystemVcs {
    async fn root_of(&self, kind: VcsKind, dir: &Path) -> Option<String> {
        let tool = kind.tool();
        let args: Vec<String> = tool.root_dir.iter().map(|a| (*a).to_string()).collect();
        let output = self.run(kind, dir, "detect root", args).await.ok()?;
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() { None } else { Some(root) }
    }

    async fn current_revision(&self, kind: VcsKind, root: &str) -> Result<String> {
        let tool = kind.tool();
        let args: Vec<String> = tool.current.iter().map(|a| (*a).to_string()).collect();
        let output = self.run(kind, Path::new(root), "current revision", args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn switch_to(&self, kind: VcsKind, root: &str, rev: &str) -> Result<()> {
        let args = subst(kind.tool().to_rev, rev);
        self.run(kind, Path::new(root), "switch revision", args).await?;
        Ok(())
    }

    async fn ancestor_tags(&self, kind: VcsKind, root: &str, rev: &str) -> Result<Vec<Tag>> {
        self.tags(kind, root, "list ancestor tags", kind.tool().ancestors, rev)
            .await
    }

    async fn descendant_tags(&self, kind: VcsKind, root: &str, rev: &str) -> Result<Vec<Tag>> {
        self.tags(kind, root, "list descendant tags", kind.tool().descendants, rev)
            .await
    }
}

fn subst(template: &[&str], rev: &str) -> Vec<String> {
    template.iter().map(|arg| arg.replace("{rev}", rev)).collect()
}

/// Parse tag-listing output: one candidate per line, revision in
/// capture group 1, comma/space separated tag names in group 2.
fn parse_tags(stdout: &str, pattern: &str) -> Result<Vec<Tag>> {
    let line_re = Regex::new(pattern)?;
    let word_re = Regex::new(r"[^, ]+")?;
    let mut tags = Vec::new();
    for line in stdout.lines() {
        if line.is_empty() {
            continue;
        }
        let Some(captures) = line_re.captures(line) else {
            continue;
        };
        let rev = &captures[1];
        for word in word_re.find_iter(&captures[2]) {
            tags.push(Tag {
                name: word.as_str().to_string(),
                rev: rev.to_string(),
            });
        }
    }
    Ok(tags)
}
