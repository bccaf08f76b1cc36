use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub description: String,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: f32,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f32) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// Immutable node/link description handed to a simulation.
///
/// Node ids are unique. Links are kept as given: endpoints that do not name
/// a node are tolerated here and skipped by the force passes.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> LayoutResult<Self> {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if !node.weight.is_finite() || node.weight < 0.0 {
                return Err(LayoutError::InvalidGraph(format!(
                    "node {:?} has weight {}, expected a finite value >= 0",
                    node.id, node.weight
                )));
            }
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(LayoutError::InvalidGraph(format!(
                    "duplicate node id {:?}",
                    node.id
                )));
            }
        }

        if let Some(link) = links
            .iter()
            .find(|link| !link.weight.is_finite() || link.weight < 0.0)
        {
            return Err(LayoutError::InvalidGraph(format!(
                "link {:?} -> {:?} has weight {}, expected a finite value >= 0",
                link.source, link.target, link.weight
            )));
        }

        Ok(Self {
            nodes,
            links,
            index_by_id,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Index pair for a link, or `None` when either endpoint is unknown.
    pub fn resolve(&self, link: &Link) -> Option<(usize, usize)> {
        Some((self.index_of(&link.source)?, self.index_of(&link.target)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_indexes_nodes() {
        let graph = Graph::new(
            vec![Node::new("a", "Alice", 3.0), Node::new("b", "Bob", 1.0)],
            vec![Link::new("a", "b", 2.0)],
        )
        .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.index_of("b"), Some(1));
        assert_eq!(graph.node("a").map(|node| node.name.as_str()), Some("Alice"));
        assert_eq!(graph.resolve(&graph.links()[0]), Some((0, 1)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Graph::new(
            vec![Node::new("a", "Alice", 1.0), Node::new("a", "Alicia", 2.0)],
            Vec::new(),
        );
        assert!(matches!(result, Err(LayoutError::InvalidGraph(_))));
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let graph = Graph::new(
            vec![Node::new("a", "Sam", 1.0), Node::new("b", "Sam", 1.0)],
            Vec::new(),
        );
        assert!(graph.is_ok());
    }

    #[test]
    fn test_dangling_link_tolerated() {
        let graph = Graph::new(
            vec![Node::new("a", "Alice", 1.0)],
            vec![Link::new("a", "ghost", 4.0)],
        )
        .unwrap();

        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.resolve(&graph.links()[0]), None);
    }

    #[test]
    fn test_bad_weights_rejected() {
        let negative = Graph::new(vec![Node::new("a", "Alice", -1.0)], Vec::new());
        assert!(matches!(negative, Err(LayoutError::InvalidGraph(_))));

        let nan_link = Graph::new(
            vec![Node::new("a", "Alice", 1.0), Node::new("b", "Bob", 1.0)],
            vec![Link::new("a", "b", f32::NAN)],
        );
        assert!(matches!(nan_link, Err(LayoutError::InvalidGraph(_))));
    }
}
