use async_trait::async_trait;
use hybridrag_models::Chunk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

use crate::errors::{VectorError, VectorResult};

pub mod openai;

pub use openai::OpenAIEmbeddingClient;

/// Turns text into fixed-size vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text, returning vectors in input order
    async fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    async fn embed_query(&self, text: &str) -> VectorResult<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(VectorError::EmbeddingCountMismatch {
                expected: 1,
                actual: vectors.len(),
            });
        }
        Ok(vectors.remove(0))
    }
}

/// Payload stored next to every chunk vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    pub id: String,
    pub text: String,
    pub source_file: Option<String>,
    pub chunk_index: u32,
}

impl From<&Chunk> for ChunkPayload {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id.to_string(),
            text: chunk.text.clone(),
            source_file: chunk.provenance(),
            chunk_index: chunk.chunk_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Value,
}

impl VectorPoint {
    /// Point keyed by the chunk id, so graph lookups can join on it
    pub fn for_chunk(chunk: &Chunk, vector: Vec<f32>) -> VectorResult<Self> {
        Ok(Self {
            id: chunk.id.to_string(),
            vector,
            payload: serde_json::to_value(ChunkPayload::from(chunk))?,
        })
    }
}

/// Qdrant accepts both UUID strings and unsigned integers as point ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PointId {
    Uuid(String),
    Num(u64),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Uuid(id) => write!(f, "{}", id),
            PointId::Num(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

impl ScoredPoint {
    fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
    }

    /// Chunk id from the payload, falling back to the point id
    pub fn chunk_id(&self) -> Option<Uuid> {
        self.payload_str("id")
            .and_then(|id| Uuid::parse_str(id).ok())
            .or_else(|| match &self.id {
                PointId::Uuid(id) => Uuid::parse_str(id).ok(),
                PointId::Num(_) => None,
            })
    }

    pub fn text(&self) -> Option<&str> {
        self.payload_str("text").filter(|t| !t.is_empty())
    }

    pub fn source_file(&self) -> Option<&str> {
        self.payload_str("source_file")
    }

    pub fn chunk_index(&self) -> Option<u64> {
        self.payload
            .as_ref()
            .and_then(|p| p.get("chunk_index"))
            .and_then(Value::as_u64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub vectors_count: u64,
    pub points_count: u64,
    pub segments_count: u64,
}
