//! Knowledge-graph half of the hybrid RAG pipeline: LLM-driven entity and
//! relationship extraction, and the Neo4j store those results land in.

pub mod errors;
pub mod extraction;
pub mod graph_db;
pub mod llm;

pub use errors::{GraphError, GraphResult};
pub use extraction::{ExtractedGraph, GraphExtractor, GRAPH_EXTRACTION_PROMPT};
pub use graph_db::{GraphIngestSummary, GraphStats, GraphStore, Neo4jGraphStore};
pub use llm::{LlmGenerateRequest, LlmGenerateResponse, LlmGenerationClient, OpenAiChatClient, OutputFormat};
