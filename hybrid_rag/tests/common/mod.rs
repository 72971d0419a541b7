//! In-memory stand-ins for the model servers and both stores.
#![allow(dead_code)]

use async_trait::async_trait;
use graph_rag::graph_db::cypher::collect_facts;
use graph_rag::{
    GraphError, GraphIngestSummary, GraphResult, GraphStats, GraphStore, LlmGenerateRequest, LlmGenerateResponse,
    LlmGenerationClient, GRAPH_EXTRACTION_PROMPT,
};
use hybrid_rag::{ChunkHit, ChunkerSet, HybridContextBuilder, IngestionPipeline};
use hybridrag_models::{Chunk, ChunkIdAssigner, ChunkIdStrategy, Entity, GraphFact, Relationship};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vector_rag::{
    CollectionStats, Embedder, PointId, ScoredPoint, VectorError, VectorPoint, VectorResult, VectorStore,
};

pub const DIMENSION: usize = 16;

// ============================================================================
// LLM
// ============================================================================

/// Extraction answers with every known triple whose two names appear in the
/// chunk; answering returns a fixed reply.
pub struct FakeLlm {
    triples: Vec<(String, String, String)>,
    answer: Mutex<String>,
    extraction_override: Mutex<Option<String>>,
    pub extraction_prompts: Mutex<Vec<String>>,
    pub answer_prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn new(triples: &[(&str, &str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            triples: triples
                .iter()
                .map(|(a, r, b)| (a.to_string(), r.to_string(), b.to_string()))
                .collect(),
            answer: Mutex::new(
                r#"{"answer": "Alice works at Acme.", "sources": ["people.txt, Chunk 0"], "chunks_retrieved": 1, "relationships_found": 1}"#
                    .to_string(),
            ),
            extraction_override: Mutex::new(None),
            extraction_prompts: Mutex::new(Vec::new()),
            answer_prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn set_answer(&self, answer: &str) {
        *self.answer.lock().unwrap() = answer.to_string();
    }

    /// Return this raw text for every extraction call
    pub fn set_extraction_output(&self, output: &str) {
        *self.extraction_override.lock().unwrap() = Some(output.to_string());
    }

    fn extraction_for(&self, prompt: &str) -> String {
        if let Some(output) = self.extraction_override.lock().unwrap().clone() {
            return output;
        }

        let graph: Vec<_> = self
            .triples
            .iter()
            .filter(|(a, _, b)| prompt.contains(a.as_str()) && prompt.contains(b.as_str()))
            .map(|(a, r, b)| serde_json::json!({"node": a, "relationship": r, "target_node": b}))
            .collect();
        serde_json::json!({ "graph": graph }).to_string()
    }
}

#[async_trait]
impl LlmGenerationClient for FakeLlm {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> GraphResult<LlmGenerateResponse> {
        let prompt = request.user_prompt.into_owned();
        let is_extraction = request.system_prompt.as_deref() == Some(GRAPH_EXTRACTION_PROMPT);

        let text = if is_extraction {
            let text = self.extraction_for(&prompt);
            self.extraction_prompts.lock().unwrap().push(prompt);
            text
        } else {
            self.answer_prompts.lock().unwrap().push(prompt);
            self.answer.lock().unwrap().clone()
        };

        Ok(LlmGenerateResponse { text })
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

// ============================================================================
// Embeddings
// ============================================================================

/// Hashed bag-of-words vectors, so texts sharing words land close together
pub struct FakeEmbedder;

pub fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMENSION];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hasher = DefaultHasher::new();
        word.to_lowercase().hash(&mut hasher);
        vector[(hasher.finish() % DIMENSION as u64) as usize] += 1.0;
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }
}

// ============================================================================
// Vector store
// ============================================================================

#[derive(Default)]
pub struct InMemoryVectorStore {
    /// `None` until the collection is created
    points: Mutex<Option<Vec<VectorPoint>>>,
    pub created_with_dimension: Mutex<Option<usize>>,
    pub fail_search: AtomicBool,
}

impl InMemoryVectorStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn points(&self) -> Vec<VectorPoint> {
        self.points.lock().unwrap().clone().unwrap_or_default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn collection_name(&self) -> &str {
        "TestCollection"
    }

    async fn ensure_collection(&self, dimension: usize) -> VectorResult<bool> {
        let mut points = self.points.lock().unwrap();
        if points.is_some() {
            return Ok(false);
        }
        *points = Some(Vec::new());
        *self.created_with_dimension.lock().unwrap() = Some(dimension);
        Ok(true)
    }

    async fn upsert(&self, new_points: Vec<VectorPoint>) -> VectorResult<usize> {
        let mut guard = self.points.lock().unwrap();
        let points = guard.as_mut().ok_or_else(|| VectorError::Api {
            status: 404,
            body: "collection missing".to_string(),
        })?;

        let count = new_points.len();
        for point in new_points {
            points.retain(|p| p.id != point.id);
            points.push(point);
        }
        Ok(count)
    }

    async fn search(&self, vector: &[f32], limit: usize) -> VectorResult<Vec<ScoredPoint>> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(VectorError::Api {
                status: 503,
                body: "qdrant unavailable".to_string(),
            });
        }

        let mut hits: Vec<ScoredPoint> = self
            .points()
            .into_iter()
            .map(|p| ScoredPoint {
                id: PointId::Uuid(p.id.clone()),
                score: cosine(vector, &p.vector),
                payload: p.payload.as_object().cloned(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn stats(&self) -> VectorResult<Option<CollectionStats>> {
        Ok(self.points.lock().unwrap().as_ref().map(|points| CollectionStats {
            vectors_count: points.len() as u64,
            points_count: points.len() as u64,
            segments_count: 1,
        }))
    }

    async fn drop_collection(&self) -> VectorResult<bool> {
        Ok(self.points.lock().unwrap().take().is_some())
    }
}

// ============================================================================
// Graph store
// ============================================================================

#[derive(Default)]
struct GraphState {
    entities: Vec<Entity>,
    chunks: Vec<Chunk>,
    relationships: Vec<Relationship>,
}

/// Mirrors the Neo4j store: MENTIONS from chunks, undirected one-hop lookups
#[derive(Default)]
pub struct InMemoryGraphStore {
    state: Mutex<GraphState>,
    pub neighborhood_calls: Mutex<Vec<Vec<Uuid>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn chunks(&self) -> Vec<Chunk> {
        self.state.lock().unwrap().chunks.clone()
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.state.lock().unwrap().entities.clone()
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        self.state.lock().unwrap().relationships.clone()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ingest(
        &self,
        entities: &[Entity],
        chunks: &[Chunk],
        relationships: &[Relationship],
    ) -> GraphResult<GraphIngestSummary> {
        let mut state = self.state.lock().unwrap();
        state.entities.extend_from_slice(entities);
        for chunk in chunks {
            state.chunks.retain(|c| c.id != chunk.id);
            state.chunks.push(chunk.clone());
        }
        state.relationships.extend_from_slice(relationships);

        Ok(GraphIngestSummary {
            entities: entities.len(),
            chunks: chunks.len(),
            mentions: chunks.iter().map(|c| c.entity_ids.len()).sum(),
            relationships: relationships.len(),
        })
    }

    async fn neighborhood(&self, chunk_ids: &[Uuid], limit: usize) -> GraphResult<Vec<GraphFact>> {
        self.neighborhood_calls.lock().unwrap().push(chunk_ids.to_vec());
        let state = self.state.lock().unwrap();

        let name_of = |id: Uuid| {
            state
                .entities
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.clone())
        };

        let mut rows = Vec::new();
        for chunk in state.chunks.iter().filter(|c| chunk_ids.contains(&c.id)) {
            for entity_id in &chunk.entity_ids {
                let Some(entity) = name_of(*entity_id) else {
                    continue;
                };
                let touching: Vec<_> = state
                    .relationships
                    .iter()
                    .filter(|r| r.source == *entity_id || r.target == *entity_id)
                    .collect();

                if touching.is_empty() {
                    rows.push((entity.clone(), None, None));
                }
                for rel in touching {
                    let other = if rel.source == *entity_id { rel.target } else { rel.source };
                    rows.push((entity.clone(), Some(rel.edge_label()), name_of(other)));
                }
            }
        }
        rows.truncate(limit);

        Ok(collect_facts(rows))
    }

    async fn stats(&self) -> GraphResult<GraphStats> {
        let state = self.state.lock().unwrap();
        let mentions: usize = state.chunks.iter().map(|c| c.entity_ids.len()).sum();
        Ok(GraphStats {
            entity_nodes: state.entities.len() as i64,
            chunk_nodes: state.chunks.len() as i64,
            total_relationships: (state.relationships.len() + mentions) as i64,
            mentions_relationships: mentions as i64,
        })
    }

    async fn clear(&self) -> GraphResult<()> {
        *self.state.lock().unwrap() = GraphState::default();
        Ok(())
    }
}

/// A graph store whose every call fails, for error paths
pub struct BrokenGraphStore;

#[async_trait]
impl GraphStore for BrokenGraphStore {
    async fn ingest(&self, _: &[Entity], _: &[Chunk], _: &[Relationship]) -> GraphResult<GraphIngestSummary> {
        Err(GraphError::Neo4j("connection refused".to_string()))
    }

    async fn neighborhood(&self, _: &[Uuid], _: usize) -> GraphResult<Vec<GraphFact>> {
        Err(GraphError::Neo4j("connection refused".to_string()))
    }

    async fn stats(&self) -> GraphResult<GraphStats> {
        Err(GraphError::Neo4j("connection refused".to_string()))
    }

    async fn clear(&self) -> GraphResult<()> {
        Err(GraphError::Neo4j("connection refused".to_string()))
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub llm: Arc<FakeLlm>,
    pub vectors: Arc<InMemoryVectorStore>,
    pub graph: Arc<InMemoryGraphStore>,
}

pub const PEOPLE_TRIPLES: &[(&str, &str, &str)] = &[
    ("Alice", "works at", "Acme"),
    ("Bob", "manages", "Alice"),
    ("Acme", "based in", "Berlin"),
];

impl Harness {
    pub fn new() -> Self {
        Self {
            llm: FakeLlm::new(PEOPLE_TRIPLES),
            vectors: InMemoryVectorStore::new(),
            graph: InMemoryGraphStore::new(),
        }
    }

    pub fn pipeline(&self, strategy: ChunkIdStrategy) -> IngestionPipeline {
        IngestionPipeline::new(
            ChunkerSet::with_limits(50, 10),
            ChunkIdAssigner::new(strategy),
            Arc::new(FakeEmbedder),
            graph_rag::GraphExtractor::new(self.llm.clone()),
            self.vectors.clone(),
            self.graph.clone(),
        )
    }

    pub fn context_builder(&self) -> HybridContextBuilder {
        HybridContextBuilder::new(Arc::new(FakeEmbedder), self.vectors.clone(), self.graph.clone())
    }
}

/// Chunk sources in retrieval order
pub fn citations(hits: &[ChunkHit]) -> Vec<String> {
    hits.iter().filter_map(ChunkHit::citation).collect()
}

/// Writes a small two-file corpus plus an unsupported file
pub fn write_corpus(dir: &std::path::Path) {
    std::fs::write(
        dir.join("people.txt"),
        "Alice works at Acme as an engineer.\n\nBob manages Alice on the platform team.",
    )
    .unwrap();
    std::fs::write(
        dir.join("company.md"),
        "# Acme\n\nAcme builds rockets.\n\n# Offices\n\nAcme is based in Berlin.",
    )
    .unwrap();
    std::fs::write(dir.join("scan.pdf"), b"%PDF-1.4").unwrap();
}
