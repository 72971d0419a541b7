use graph_rag::GraphStore;
use hybridrag_models::GraphFact;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use vector_rag::{Embedder, ScoredPoint, VectorStore};

use crate::errors::PipelineResult;

const SERVICE: &str = "retrieval";

/// A text chunk returned by vector search
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHit {
    pub id: Option<Uuid>,
    pub text: String,
    pub source_file: Option<String>,
    pub chunk_index: Option<u64>,
    pub score: f32,
}

impl ChunkHit {
    /// `None` for hits without text, which carry nothing to show the model
    pub fn from_point(point: &ScoredPoint) -> Option<Self> {
        Some(Self {
            id: point.chunk_id(),
            text: point.text()?.to_string(),
            source_file: point.source_file().map(str::to_string),
            chunk_index: point.chunk_index(),
            score: point.score,
        })
    }

    /// Citation in the `"file, Chunk N"` form the agent is asked to use
    pub fn citation(&self) -> Option<String> {
        let source = self.source_file.as_deref()?;
        Some(match self.chunk_index {
            Some(index) => format!("{}, Chunk {}", source, index),
            None => source.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HybridContext {
    pub chunks: Vec<ChunkHit>,
    pub facts: Vec<GraphFact>,
}

impl HybridContext {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.facts.len()
    }

    pub fn sources(&self) -> Vec<String> {
        self.chunks.iter().filter_map(ChunkHit::citation).collect()
    }

    /// Text block handed to the answering model
    pub fn render(&self) -> String {
        let mut out = String::from("=== RELEVANT TEXT CHUNKS ===\n");

        for (i, chunk) in self.chunks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match chunk.citation() {
                Some(citation) => {
                    let _ = writeln!(out, "Chunk {} [Source: {}]:", i + 1, citation);
                }
                None => {
                    let _ = writeln!(out, "Chunk {}:", i + 1);
                }
            }
            out.push_str(chunk.text.trim_end());
            out.push('\n');
        }

        out.push_str("\n=== KNOWLEDGE GRAPH CONTEXT ===\n");
        for fact in &self.facts {
            let _ = writeln!(out, "{}", fact);
        }

        out
    }
}

/// Joins vector hits to their graph neighborhoods
pub struct HybridContextBuilder {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    graph_store: Arc<dyn GraphStore>,
    top_k: usize,
    graph_limit: usize,
}

impl HybridContextBuilder {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        graph_store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            graph_store,
            top_k: 5,
            graph_limit: 50,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_graph_limit(mut self, limit: usize) -> Self {
        self.graph_limit = limit;
        self
    }

    pub async fn build(&self, query: &str) -> PipelineResult<HybridContext> {
        let start = Instant::now();

        let vector = self.embedder.embed_query(query).await?;
        let points = self.vector_store.search(&vector, self.top_k).await?;

        let chunks: Vec<ChunkHit> = points.iter().filter_map(ChunkHit::from_point).collect();

        let mut chunk_ids: Vec<Uuid> = Vec::with_capacity(chunks.len());
        for id in chunks.iter().filter_map(|c| c.id) {
            if !chunk_ids.contains(&id) {
                chunk_ids.push(id);
            }
        }

        let facts = if chunk_ids.is_empty() {
            Vec::new()
        } else {
            self.graph_store.neighborhood(&chunk_ids, self.graph_limit).await?
        };

        hybridrag_observability::log_search_executed(
            SERVICE,
            chunks.len(),
            facts.len(),
            start.elapsed().as_millis() as u64,
        );

        Ok(HybridContext { chunks, facts })
    }
}
