use async_trait::async_trait;
use hybridrag_models::{Chunk, Entity, GraphFact, Relationship};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::GraphResult;

pub mod cypher;
pub mod neo4j_client;

pub use neo4j_client::Neo4jGraphStore;

/// What one `ingest` call wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphIngestSummary {
    pub entities: usize,
    pub chunks: usize,
    pub mentions: usize,
    pub relationships: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub entity_nodes: i64,
    pub chunk_nodes: i64,
    pub total_relationships: i64,
    pub mentions_relationships: i64,
}

/// Storage seam for the knowledge graph
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Write entities, chunk nodes, MENTIONS edges and entity relationships
    async fn ingest(
        &self,
        entities: &[Entity],
        chunks: &[Chunk],
        relationships: &[Relationship],
    ) -> GraphResult<GraphIngestSummary>;

    /// One-hop facts around the entities mentioned by the given chunks
    async fn neighborhood(&self, chunk_ids: &[Uuid], limit: usize) -> GraphResult<Vec<GraphFact>>;

    async fn stats(&self) -> GraphResult<GraphStats>;

    /// Delete every node and relationship
    async fn clear(&self) -> GraphResult<()>;
}
