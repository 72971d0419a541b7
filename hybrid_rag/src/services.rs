use graph_rag::{GraphExtractor, GraphStore, LlmGenerationClient, Neo4jGraphStore, OpenAiChatClient};
use hybridrag_config::AppConfig;
use hybridrag_models::ChunkIdAssigner;
use std::sync::Arc;
use std::time::Duration;
use vector_rag::{Embedder, OpenAIEmbeddingClient, QdrantStore, VectorStore};

use crate::admin::AdminService;
use crate::agent::AnsweringAgent;
use crate::errors::PipelineResult;
use crate::ingestion::{ChunkerSet, IngestionPipeline};
use crate::retrieval::HybridContextBuilder;

/// Clients built from configuration, shared by every command
pub struct Services {
    pub config: AppConfig,
    pub llm: Arc<dyn LlmGenerationClient>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
}

impl Services {
    /// Builds the HTTP clients. Nothing is contacted yet.
    pub fn from_config(config: AppConfig) -> PipelineResult<Self> {
        let timeout = Duration::from_secs(config.llm.timeout_secs);

        let llm = OpenAiChatClient::new(
            config.llm.base_url.clone(),
            config.llm.api_key.clone(),
            config.llm.model.clone(),
            timeout,
        )?;

        let embedder = OpenAIEmbeddingClient::new(
            config.embedding.base_url.clone(),
            config.embedding.api_key.clone(),
            config.embedding.model.clone(),
            config.embedding.dimension,
            config.embedding.batch_size,
            timeout,
        )?;

        let vector_store = QdrantStore::new(
            config.qdrant.url.clone(),
            config.qdrant.api_key.clone(),
            config.qdrant.collection_name.clone(),
            Duration::from_secs(config.qdrant.timeout_secs),
        )?;

        Ok(Self {
            config,
            llm: Arc::new(llm),
            embedder: Arc::new(embedder),
            vector_store: Arc::new(vector_store),
        })
    }

    pub async fn connect_graph(&self) -> PipelineResult<Arc<dyn GraphStore>> {
        let neo4j = &self.config.neo4j;
        let store = Neo4jGraphStore::connect(&neo4j.uri, &neo4j.user, &neo4j.password, &neo4j.database).await?;
        Ok(Arc::new(store))
    }

    pub fn context_builder(&self, graph_store: Arc<dyn GraphStore>) -> HybridContextBuilder {
        HybridContextBuilder::new(self.embedder.clone(), self.vector_store.clone(), graph_store)
            .with_top_k(self.config.retrieval.top_k)
            .with_graph_limit(self.config.retrieval.graph_context_limit)
    }

    pub async fn ingestion_pipeline(&self) -> PipelineResult<IngestionPipeline> {
        let ingestion = &self.config.ingestion;

        Ok(IngestionPipeline::new(
            ChunkerSet::with_limits(ingestion.chunk_size, ingestion.chunk_overlap),
            ChunkIdAssigner::new(ingestion.chunk_id_strategy),
            self.embedder.clone(),
            GraphExtractor::new(self.llm.clone()),
            self.vector_store.clone(),
            self.connect_graph().await?,
        ))
    }

    pub async fn answering_agent(&self) -> PipelineResult<AnsweringAgent> {
        let graph_store = self.connect_graph().await?;
        Ok(AnsweringAgent::new(self.llm.clone(), self.context_builder(graph_store)))
    }

    /// Admin commands still run when Neo4j is down; they report it instead
    pub async fn admin(&self) -> AdminService {
        let graph_store = self.connect_graph().await.map_err(|e| e.to_string());
        AdminService::new(self.vector_store.clone(), graph_store, self.config.ollama_url.clone())
    }
}
