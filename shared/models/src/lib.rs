//! Shared data model for the hybrid RAG workspace.
//!
//! Types in here cross crate boundaries: chunks flow from ingestion into both
//! stores, graph types flow from the extractor into Neo4j, and the agent
//! response types are what the CLI prints.

pub mod agent;
pub mod chunking;
pub mod graph;
pub mod ingestion;

pub use agent::{AgentResponse, ChatAnswer};
pub use chunking::{Chunk, ChunkIdAssigner, ChunkIdStrategy, ChunkedFile, UnknownChunkIdStrategy};
pub use graph::{
    sanitize_relationship_type, Entity, GraphComponents, GraphFact, GraphTriple, Relationship,
    FALLBACK_RELATIONSHIP_TYPE,
};
pub use ingestion::IngestReport;
