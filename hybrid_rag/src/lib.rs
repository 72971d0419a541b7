//! Hybrid RAG: ingest plain-text documents into a Qdrant collection and a
//! Neo4j knowledge graph that share chunk ids, then answer questions from
//! vector hits joined to their graph neighborhoods.

pub mod admin;
pub mod agent;
pub mod errors;
pub mod ingestion;
pub mod retrieval;
pub mod services;

pub use admin::{AdminService, SystemStats, WipeReport};
pub use agent::{parse_agent_response, run_chat, AnsweringAgent, AGENT_SYSTEM_PROMPT};
pub use errors::{PipelineError, PipelineResult};
pub use ingestion::{Chunker, ChunkerSet, IngestionPipeline, MarkdownChunker, TextChunker};
pub use retrieval::{ChunkHit, HybridContext, HybridContextBuilder};
pub use services::Services;
