//! Graph cache persistence.
//!
//! The dependency graph is cached between invocations so most
//! commands start without a full rescan. The cache is advisory: any
//! problem reading it — missing file aside, that is normal — removes
//! the file and falls back to an empty graph, forcing a fresh scan.
//! It is never a fatal error.

use crate::error::Result;
use crate::graph::Graph;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Format version of the on-disk graph cache.
pub const GRAPH_FILE_VERSION: u32 = 1;

/// Load the graph cache, falling back to an empty graph.
pub async fn load_graph(path: &Path) -> Graph {
    match remedy_store::load(path, GRAPH_FILE_VERSION).await {
        Ok(graph) => {
            debug!(path = %path.display(), "loaded graph cache");
            graph
        }
        Err(remedy_store::Error::Io(err)) if err.kind() == ErrorKind::NotFound => Graph::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "discarding unusable graph cache");
            let _ = tokio::fs::remove_file(path).await;
            Graph::new()
        }
    }
}

/// Save the graph cache, creating the state directory if needed.
pub async fn save_graph(path: &Path, graph: &Graph) -> Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    remedy_store::save(path, GRAPH_FILE_VERSION, graph).await?;
    debug!(path = %path.display(), "saved graph cache");
    Ok(())
}
