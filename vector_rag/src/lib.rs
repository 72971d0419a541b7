//! Vector half of the hybrid RAG pipeline: the embedding client and the
//! Qdrant collection that chunk vectors are stored in.

pub mod errors;
pub mod models;
pub mod services;

pub use errors::{VectorError, VectorResult};
pub use models::{ChunkPayload, CollectionStats, Embedder, OpenAIEmbeddingClient, PointId, ScoredPoint, VectorPoint};
pub use services::{QdrantStore, VectorStore};
