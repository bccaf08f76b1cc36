use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::graph::{Graph, Link, Node};

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawCharacter {
    pub(super) name: String,
    #[serde(default)]
    pub(super) mentions: u32,
    #[serde(default)]
    pub(super) description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawInteraction {
    pub(super) character1: String,
    pub(super) character2: String,
    #[serde(default)]
    pub(super) interaction_count: u32,
}

/// Book analysis document as delivered by the analysis service.
#[derive(Clone, Debug, Deserialize)]
pub struct BookAnalysis {
    #[serde(default)]
    pub book_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    characters: Vec<RawCharacter>,
    #[serde(default)]
    interactions: Vec<RawInteraction>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BookAnalysis {
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Character graph: one node per character keyed by name, one link per
    /// interacting pair.
    pub fn to_graph(&self) -> Result<Graph> {
        let nodes = self
            .characters
            .iter()
            .map(|character| {
                let description = character.description.clone().unwrap_or_else(|| {
                    format!("Mentioned {} times in the book.", character.mentions)
                });
                Node::new(&character.name, &character.name, character.mentions as f32)
                    .with_description(description)
            })
            .collect();

        let links = self
            .interactions
            .iter()
            .map(|interaction| {
                Link::new(
                    &interaction.character1,
                    &interaction.character2,
                    interaction.interaction_count as f32,
                )
            })
            .collect();

        Graph::new(nodes, links).context("book analysis does not form a valid character graph")
    }
}

#[derive(Clone, Debug, Deserialize)]
struct RawGraph {
    nodes: Vec<Node>,
    #[serde(default)]
    links: Vec<Link>,
}

/// Accepts either a book analysis document or a plain `{nodes, links}` graph.
pub(super) fn parse_graph_document(raw: &str) -> Result<Graph> {
    let parsed: Value = serde_json::from_str(raw).context("invalid graph JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("expected a JSON object at the top level"))?;

    if object.contains_key("characters") {
        let analysis =
            BookAnalysis::deserialize(&parsed).context("invalid book analysis document")?;
        if analysis.character_count() == 0 {
            return Err(anyhow!(
                "book analysis {} ({}) contains no characters",
                analysis.book_id,
                analysis.status
            ));
        }
        return analysis.to_graph();
    }

    if object.contains_key("nodes") {
        let graph = RawGraph::deserialize(&parsed).context("invalid graph document")?;
        return Graph::new(graph.nodes, graph.links).context("graph document is not valid");
    }

    Err(anyhow!(
        "unrecognized document: expected `characters` or `nodes` at the top level"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANALYSIS: &str = r#"{
        "book_id": 1342,
        "status": "completed",
        "title": "Pride and Prejudice",
        "characters": [
            { "name": "Elizabeth", "mentions": 634, "description": "Second Bennet daughter" },
            { "name": "Darcy", "mentions": 418 },
            { "name": "Jane", "mentions": 292 }
        ],
        "interactions": [
            { "character1": "Elizabeth", "character2": "Darcy", "interaction_count": 87 },
            { "character1": "Elizabeth", "character2": "Jane", "interaction_count": 54 },
            { "character1": "Jane", "character2": "Bingley", "interaction_count": 31 }
        ]
    }"#;

    #[test]
    fn test_analysis_to_graph() {
        let analysis: BookAnalysis = serde_json::from_str(ANALYSIS).unwrap();
        assert_eq!(analysis.character_count(), 3);
        assert_eq!(analysis.title.as_deref(), Some("Pride and Prejudice"));

        let graph = parse_graph_document(ANALYSIS).unwrap();

        assert_eq!(graph.node_count(), 3);
        let darcy = graph.node("Darcy").unwrap();
        assert_eq!(darcy.name, "Darcy");
        assert_eq!(darcy.weight, 418.0);
        assert_eq!(darcy.description, "Mentioned 418 times in the book.");
        assert_eq!(
            graph.node("Elizabeth").unwrap().description,
            "Second Bennet daughter"
        );

        assert_eq!(graph.links().len(), 3);
        assert_eq!(graph.links()[0].weight, 87.0);
        // Bingley never appears as a character; the link is kept but unresolved.
        assert_eq!(graph.resolve(&graph.links()[2]), None);
    }

    #[test]
    fn test_plain_graph_document() {
        let raw = r#"{
            "nodes": [
                { "id": "a", "name": "Alpha", "weight": 2.0 },
                { "id": "b", "name": "Beta" }
            ],
            "links": [ { "source": "a", "target": "b", "weight": 1.5 } ]
        }"#;
        let graph = parse_graph_document(raw).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("b").unwrap().weight, 0.0);
        assert_eq!(graph.resolve(&graph.links()[0]), Some((0, 1)));
    }

    #[test]
    fn test_duplicate_character_rejected() {
        let raw = r#"{
            "book_id": 7,
            "status": "completed",
            "characters": [
                { "name": "Pip", "mentions": 3 },
                { "name": "Pip", "mentions": 5 }
            ]
        }"#;
        let error = parse_graph_document(raw).unwrap_err();
        assert!(format!("{error:#}").contains("duplicate node id"));
    }

    #[test]
    fn test_empty_analysis_rejected() {
        let raw = r#"{ "book_id": 9, "status": "processing", "characters": [] }"#;
        assert!(parse_graph_document(raw).is_err());
    }

    #[test]
    fn test_unrecognized_document() {
        assert!(parse_graph_document("[1, 2, 3]").is_err());
        assert!(parse_graph_document(r#"{ "books": [] }"#).is_err());
        assert!(parse_graph_document("not json").is_err());
    }
}
