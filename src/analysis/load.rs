use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::parse::parse_graph_document;
use crate::graph::Graph;

pub fn load_graph(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let graph = parse_graph_document(&raw)
        .with_context(|| format!("failed to parse graph file {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        links = graph.links().len(),
        "loaded graph"
    );
    Ok(graph)
}
