//! Plain-text output rendering.

use crate::cabinet::Cabinet;
use crate::checkpoint::CheckpointFile;
use crate::graph::Graph;
use crate::vcs::Tag;
use colored::Colorize;

/// Render every known repository with its pattern and one-hop
/// repository dependencies.
pub fn print_repositories(graph: &Graph) {
    for repo in graph.repositories() {
        println!("{} [{}]", repo.root.bold(), repo.vcs);
        let pattern = repo.pattern();
        if !pattern.is_empty() {
            println!("    {pattern}");
        }
        for import_path in &repo.packages {
            println!("      {import_path}");
        }
        if let Ok(deps) = graph.repo_deps(repo) {
            for dep in deps {
                println!("    -> {}", dep.root);
            }
        }
    }
}

/// Render tags, one `revision name` pair per line.
pub fn print_tags(tags: &[Tag]) {
    for tag in tags {
        println!("{} {}", tag.rev, tag.name);
    }
}

/// Render a cabinet's contents.
pub fn print_cabinet(cabinet: &Cabinet) {
    println!("Repository:    {}", cabinet.pattern.bold());
    println!("Created:       {} @ {}", cabinet.created, cabinet.revision);
    println!("Dependencies:");
    for pin in &cabinet.pins {
        println!("  {} {}", pin.revision, pin.pattern);
    }
}

/// Render the most recent `max` checkpoints (all when zero), newest
/// first.
pub fn print_checkpoints(file: &CheckpointFile, max: usize) {
    for (id, checkpoint) in file.recent(max) {
        println!(
            "{:>4}  {}  {}  {:>3} repos  {}",
            id.to_string().bold(),
            checkpoint.created.format("%Y/%m/%d %H:%M:%S"),
            checkpoint.creator,
            checkpoint.pins.len(),
            checkpoint.comment
        );
    }
}
