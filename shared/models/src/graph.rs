use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Edge label used when a relationship type sanitizes down to nothing
pub const FALLBACK_RELATIONSHIP_TYPE: &str = "RELATES_TO";

/// A named node extracted from chunk text.
/// Names are unique keys within one ingestion batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
}

impl Entity {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Directed edge between two entities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub source: Uuid,
    pub target: Uuid,
    /// Relationship type exactly as the LLM produced it
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub source_file: Option<String>,
}

impl Relationship {
    pub fn new(
        source: Uuid,
        target: Uuid,
        relationship_type: impl Into<String>,
        source_file: Option<String>,
    ) -> Self {
        Self {
            source,
            target,
            relationship_type: relationship_type.into(),
            source_file,
        }
    }

    /// Label used for the graph edge itself
    pub fn edge_label(&self) -> String {
        sanitize_relationship_type(&self.relationship_type)
    }
}

/// Turn a free-form relationship description into a valid edge label.
///
/// Spaces, hyphens and dots become underscores, anything else that is not
/// alphanumeric or an underscore is dropped.
pub fn sanitize_relationship_type(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            other => other,
        })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if sanitized.is_empty() {
        FALLBACK_RELATIONSHIP_TYPE.to_string()
    } else {
        sanitized
    }
}

/// One `{node, relationship, target_node}` triple from the extraction LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphTriple {
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub target_node: Option<String>,
}

impl GraphTriple {
    pub fn new(node: &str, relationship: &str, target_node: &str) -> Self {
        Self {
            node: Some(node.to_string()),
            relationship: Some(relationship.to_string()),
            target_node: Some(target_node.to_string()),
        }
    }

    pub fn node_name(&self) -> Option<&str> {
        non_blank(&self.node)
    }

    pub fn target_name(&self) -> Option<&str> {
        non_blank(&self.target_node)
    }

    pub fn relationship_type(&self) -> Option<&str> {
        non_blank(&self.relationship)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Structured output expected from the extraction LLM
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GraphComponents {
    pub graph: Vec<GraphTriple>,
}

/// One row of graph context: an entity, an edge label, and its neighbour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphFact {
    pub entity: String,
    pub relationship: String,
    pub related: String,
}

impl fmt::Display for GraphFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -[{}]-> ({})", self.entity, self.relationship, self.related)
    }
}
