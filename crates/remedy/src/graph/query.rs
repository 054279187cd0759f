//! Repository-level transitive dependency queries.
//!
//! The graph's adjacency maps answer one-hop questions; cabinet
//! building needs the full transitive dependency closure of a
//! repository. The closure is computed by lifting the package edges
//! to a repository-level digraph and walking it breadth-first.

use super::Graph;
use crate::domain::Repository;
use crate::error::Result;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::BTreeMap;

/// Every repository reachable from `start` through dependency edges,
/// excluding `start` itself, ordered by root.
pub fn repo_dep_tree<'g>(graph: &'g Graph, start: &Repository) -> Result<Vec<&'g Repository>> {
    let mut dag = DiGraph::<&str, ()>::new();
    let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();
    for repo in graph.repositories() {
        nodes.insert(repo.root.as_str(), dag.add_node(repo.root.as_str()));
    }
    for repo in graph.repositories() {
        let from = nodes[repo.root.as_str()];
        for dep in graph.repo_deps(repo)? {
            dag.add_edge(from, nodes[dep.root.as_str()], ());
        }
    }

    let Some(&start_node) = nodes.get(start.root.as_str()) else {
        return Ok(Vec::new());
    };

    let mut roots = Vec::new();
    let mut bfs = Bfs::new(&dag, start_node);
    while let Some(node) = bfs.next(&dag) {
        let root: &str = dag[node];
        if root == start.root {
            continue;
        }
        if let Some(repo) = graph.repository(root) {
            roots.push(repo);
        }
    }
    roots.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(roots)
}
