use graph_rag::{GraphExtractor, GraphStore};
use hybridrag_models::{ChunkIdAssigner, ChunkedFile, IngestReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use vector_rag::{Embedder, VectorError, VectorPoint, VectorStore};

use crate::errors::{PipelineError, PipelineResult};
use crate::ingestion::chunker::ChunkerSet;
use crate::ingestion::file_reader::{display_name, FileReader};

const SERVICE: &str = "ingestion";

/// Reads a folder and loads its content into both stores
pub struct IngestionPipeline {
    chunkers: ChunkerSet,
    assigner: ChunkIdAssigner,
    embedder: Arc<dyn Embedder>,
    extractor: GraphExtractor,
    vector_store: Arc<dyn VectorStore>,
    graph_store: Arc<dyn GraphStore>,
}

impl IngestionPipeline {
    pub fn new(
        chunkers: ChunkerSet,
        assigner: ChunkIdAssigner,
        embedder: Arc<dyn Embedder>,
        extractor: GraphExtractor,
        vector_store: Arc<dyn VectorStore>,
        graph_store: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            chunkers,
            assigner,
            embedder,
            extractor,
            vector_store,
            graph_store,
        }
    }

    pub async fn run(&self, folder: &Path) -> PipelineResult<IngestReport> {
        let start = Instant::now();
        let result = self.ingest(folder).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(report) => hybridrag_observability::log_ingestion_completed(
                SERVICE,
                report.files_processed,
                report.chunks_embedded,
                report.nodes_created,
                report.relationships_created,
                duration_ms,
            ),
            Err(e) => hybridrag_observability::log_ingestion_failed(SERVICE, &e.to_string(), duration_ms),
        }

        result
    }

    async fn ingest(&self, folder: &Path) -> PipelineResult<IngestReport> {
        let files = FileReader::new(folder).read_files().await?;
        if files.is_empty() {
            return Err(PipelineError::NoFiles(folder.to_path_buf()));
        }

        for path in files.unsupported() {
            tracing::warn!(file = %path.display(), "Skipping file: only text and markdown are parsed");
        }

        let mut chunked_files = Vec::new();
        for (kind, path) in files.readable() {
            let Some(chunker) = self.chunkers.for_kind(kind) else {
                continue;
            };
            let text = tokio::fs::read_to_string(path).await?;
            let name = display_name(path);
            let chunks = chunker.chunk(&text);
            hybridrag_observability::log_document_chunked(SERVICE, &name, chunks.len());

            if chunks.is_empty() {
                tracing::warn!(file = %name, "File produced no chunks");
                continue;
            }
            chunked_files.push(ChunkedFile::new(name, chunks));
        }

        let mut chunks = self.assigner.assign(chunked_files);
        if chunks.is_empty() {
            tracing::warn!("No chunks to ingest");
            return Ok(IngestReport {
                success: true,
                files_processed: files.total(),
                ..Default::default()
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embed_start = Instant::now();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(VectorError::EmbeddingCountMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            }
            .into());
        }
        hybridrag_observability::log_chunks_embedded(
            SERVICE,
            vectors.len(),
            self.embedder.dimension(),
            embed_start.elapsed().as_millis() as u64,
        );

        let graph = hybridrag_observability::log_timed!("extract_graph", self.extractor.extract(&mut chunks).await)?;

        self.vector_store.ensure_collection(self.embedder.dimension()).await?;
        let points = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| VectorPoint::for_chunk(chunk, vector))
            .collect::<Result<Vec<_>, _>>()?;
        let chunks_embedded = self.vector_store.upsert(points).await?;

        let graph_start = Instant::now();
        let summary = self
            .graph_store
            .ingest(&graph.entities, &chunks, &graph.relationships)
            .await?;
        hybridrag_observability::log_graph_ingested(
            SERVICE,
            summary.entities,
            summary.chunks,
            summary.mentions,
            summary.relationships,
            graph_start.elapsed().as_millis() as u64,
        );

        Ok(IngestReport {
            success: true,
            files_processed: files.total(),
            nodes_created: summary.entities,
            relationships_created: summary.relationships,
            chunks_embedded,
        })
    }
}
