use hybridrag_models::{Chunk, Entity, GraphComponents, Relationship};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::GraphResult;
use crate::extraction::{extraction_user_prompt, GRAPH_EXTRACTION_PROMPT};
use crate::llm::{LlmGenerateRequest, LlmGenerationClient, OutputFormat};

const SERVICE: &str = "graph-extractor";

/// Entities and edges produced from one batch of chunks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedGraph {
    /// Unique by name, in first-seen order
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    /// Chunks whose model output could not be parsed
    pub skipped_chunks: usize,
}

/// Runs the extraction prompt over every chunk and merges the results
/// into a single name-keyed entity table.
pub struct GraphExtractor {
    llm: Arc<dyn LlmGenerationClient>,
    model: Option<String>,
}

impl GraphExtractor {
    pub fn new(llm: Arc<dyn LlmGenerationClient>) -> Self {
        Self { llm, model: None }
    }

    /// Use a different model than the client's default
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Extract entities and relationships, filling `entity_ids` on each chunk.
    ///
    /// Unparseable model output skips the chunk; transport errors abort.
    pub async fn extract(&self, chunks: &mut [Chunk]) -> GraphResult<ExtractedGraph> {
        let mut names: IndexMap<String, Uuid> = IndexMap::new();
        let mut relationships = Vec::new();
        let mut skipped_chunks = 0;

        for chunk in chunks.iter_mut() {
            let components = match self.extract_chunk(&chunk.text).await? {
                Some(components) => components,
                None => {
                    skipped_chunks += 1;
                    hybridrag_observability::log_extraction_skipped(
                        SERVICE,
                        &chunk.id.to_string(),
                        "model output was not valid graph JSON",
                    );
                    continue;
                }
            };

            let source_file = chunk.provenance();

            for triple in &components.graph {
                let source_id = triple.node_name().map(|name| entity_id(&mut names, name));
                if let Some(id) = source_id {
                    chunk.mention(id);
                }

                let target_id = triple.target_name().map(|name| entity_id(&mut names, name));
                if let Some(id) = target_id {
                    chunk.mention(id);
                }

                if let (Some(source), Some(target), Some(rel_type)) =
                    (source_id, target_id, triple.relationship_type())
                {
                    relationships.push(Relationship::new(source, target, rel_type, source_file.clone()));
                }
            }

            tracing::debug!(
                chunk_id = %chunk.id,
                triples = components.graph.len(),
                mentions = chunk.entity_ids.len(),
                "Extracted graph from chunk"
            );
        }

        let entities = names
            .into_iter()
            .map(|(name, id)| Entity::new(id, name))
            .collect::<Vec<_>>();

        tracing::info!(
            chunks = chunks.len(),
            entities = entities.len(),
            relationships = relationships.len(),
            skipped_chunks,
            "Graph extraction finished"
        );

        Ok(ExtractedGraph {
            entities,
            relationships,
            skipped_chunks,
        })
    }

    async fn extract_chunk(&self, text: &str) -> GraphResult<Option<GraphComponents>> {
        let model = self.model.as_deref().unwrap_or_else(|| self.llm.model());
        let request = LlmGenerateRequest {
            model,
            system_prompt: Some(Cow::Borrowed(GRAPH_EXTRACTION_PROMPT)),
            user_prompt: Cow::Owned(extraction_user_prompt(text)),
            output_format: Some(OutputFormat::JsonObject),
        };

        let response = self.llm.generate(request).await?;

        match serde_json::from_str::<GraphComponents>(strip_code_fences(&response.text)) {
            Ok(components) => Ok(Some(components)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unparseable extraction output");
                Ok(None)
            }
        }
    }
}

fn entity_id(names: &mut IndexMap<String, Uuid>, name: &str) -> Uuid {
    *names.entry(name.to_string()).or_insert_with(Uuid::new_v4)
}

/// Unwrap a ```json fenced block if the model added one
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim_start(),
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}
