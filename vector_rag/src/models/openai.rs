use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::{VectorError, VectorResult};
use crate::models::Embedder;

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIEmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIEmbeddingResponse {
    pub data: Vec<OpenAIEmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIEmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

/// Batch client for OpenAI-compatible `/embeddings` endpoints
pub struct OpenAIEmbeddingClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl OpenAIEmbeddingClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dimension: usize,
        batch_size: usize,
        timeout: Duration,
    ) -> VectorResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimension,
            batch_size: batch_size.max(1),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_embeddings(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        let endpoint = format!("{}/embeddings", self.base_url);
        let request = OpenAIEmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        hybridrag_observability::log_external_call!("embeddings", endpoint.as_str());
        let start = Instant::now();

        let mut builder = self.client.post(&endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        hybridrag_observability::log_external_call!(
            "embeddings",
            endpoint.as_str(),
            start.elapsed().as_millis() as u64,
            response.status().as_u16()
        );

        if !response.status().is_success() {
            return Err(VectorError::from_response(response).await);
        }

        let mut embedding_response: OpenAIEmbeddingResponse = response.json().await?;
        if embedding_response.data.len() != texts.len() {
            return Err(VectorError::EmbeddingCountMismatch {
                expected: texts.len(),
                actual: embedding_response.data.len(),
            });
        }

        embedding_response.data.sort_by_key(|data| data.index);

        embedding_response
            .data
            .into_iter()
            .map(|data| {
                if data.embedding.len() == self.dimension {
                    Ok(data.embedding)
                } else {
                    Err(VectorError::DimensionMismatch {
                        expected: self.dimension,
                        actual: data.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for OpenAIEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.generate_embeddings(batch).await?);
        }

        tracing::debug!(model = %self.model, count = vectors.len(), "Embedded texts");
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
