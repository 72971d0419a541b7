use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// How chunk ids are generated for an ingestion batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkIdStrategy {
    /// Fresh v4 id per chunk, every run
    #[default]
    Random,
    /// v5 id derived from source file, position and text
    Deterministic,
}

impl ChunkIdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkIdStrategy::Random => "random",
            ChunkIdStrategy::Deterministic => "deterministic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chunk id strategy '{0}' (expected 'random' or 'deterministic')")]
pub struct UnknownChunkIdStrategy(pub String);

impl FromStr for ChunkIdStrategy {
    type Err = UnknownChunkIdStrategy;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(ChunkIdStrategy::Random),
            "deterministic" => Ok(ChunkIdStrategy::Deterministic),
            _ => Err(UnknownChunkIdStrategy(s.to_string())),
        }
    }
}

/// A source file after splitting, before any ids are assigned.
/// This is what flows from the chunker into the identity assigner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkedFile {
    /// File name (not the full path) the chunks came from
    pub source_file: String,

    /// Chunk texts in document order
    pub chunks: Vec<String>,
}

impl ChunkedFile {
    pub fn new(source_file: impl Into<String>, chunks: Vec<String>) -> Self {
        Self {
            source_file: source_file.into(),
            chunks,
        }
    }
}

/// A text chunk with its store-wide identity.
///
/// `id` doubles as the vector point id and the `(:Chunk {id})` property in the
/// graph, which is what lets retrieval join the two stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: Uuid,
    pub text: String,
    pub source_file: String,
    /// Position of the chunk within its source file
    pub chunk_index: u32,
    /// Entities mentioned in this chunk, first mention first, no duplicates
    #[serde(default)]
    pub entity_ids: Vec<Uuid>,
}

impl Chunk {
    pub fn new(id: Uuid, text: impl Into<String>, source_file: impl Into<String>, chunk_index: u32) -> Self {
        Self {
            id,
            text: text.into(),
            source_file: source_file.into(),
            chunk_index,
            entity_ids: Vec::new(),
        }
    }

    /// Record that an entity is mentioned in this chunk
    pub fn mention(&mut self, entity_id: Uuid) {
        if !self.entity_ids.contains(&entity_id) {
            self.entity_ids.push(entity_id);
        }
    }

    /// Source file as relationship metadata; empty names carry no provenance
    pub fn provenance(&self) -> Option<String> {
        if self.source_file.is_empty() {
            None
        } else {
            Some(self.source_file.clone())
        }
    }
}

/// Assigns one id per chunk, once, before embedding or extraction runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkIdAssigner {
    strategy: ChunkIdStrategy,
}

impl ChunkIdAssigner {
    pub fn new(strategy: ChunkIdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ChunkIdStrategy {
        self.strategy
    }

    /// Generate the id for a single chunk
    pub fn chunk_id(&self, source_file: &str, chunk_index: u32, text: &str) -> Uuid {
        match self.strategy {
            ChunkIdStrategy::Random => Uuid::new_v4(),
            ChunkIdStrategy::Deterministic => {
                let mut name = Vec::with_capacity(source_file.len() + text.len() + 16);
                name.extend_from_slice(source_file.as_bytes());
                name.push(0);
                name.extend_from_slice(chunk_index.to_string().as_bytes());
                name.push(0);
                name.extend_from_slice(text.as_bytes());
                Uuid::new_v5(&Uuid::NAMESPACE_OID, &name)
            }
        }
    }

    /// Flatten chunked files into identified chunks, preserving file and chunk order
    pub fn assign(&self, files: Vec<ChunkedFile>) -> Vec<Chunk> {
        let total = files.iter().map(|f| f.chunks.len()).sum();
        let mut chunks = Vec::with_capacity(total);

        for file in files {
            for (idx, text) in file.chunks.into_iter().enumerate() {
                let chunk_index = idx as u32;
                let id = self.chunk_id(&file.source_file, chunk_index, &text);
                chunks.push(Chunk::new(id, text, file.source_file.clone(), chunk_index));
            }
        }

        chunks
    }
}
