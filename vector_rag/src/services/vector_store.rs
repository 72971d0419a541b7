use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{VectorError, VectorResult};
use crate::models::{CollectionStats, ScoredPoint, VectorPoint};

/// Points sent per upsert request
const UPSERT_BATCH_SIZE: usize = 256;

/// Storage seam for chunk vectors
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn collection_name(&self) -> &str;

    /// Create the collection if missing. Returns `true` when it was created.
    async fn ensure_collection(&self, dimension: usize) -> VectorResult<bool>;

    async fn upsert(&self, points: Vec<VectorPoint>) -> VectorResult<usize>;

    async fn search(&self, vector: &[f32], limit: usize) -> VectorResult<Vec<ScoredPoint>>;

    /// `None` when the collection does not exist
    async fn stats(&self) -> VectorResult<Option<CollectionStats>>;

    /// Returns `false` when there was nothing to drop
    async fn drop_collection(&self) -> VectorResult<bool>;
}

// ============================================================================
// Qdrant REST API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    points: &'a [VectorPoint],
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    #[serde(default)]
    vectors_count: Option<u64>,
    #[serde(default)]
    points_count: Option<u64>,
    #[serde(default)]
    segments_count: Option<u64>,
}

/// Qdrant REST client bound to a single collection
#[derive(Debug, Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection_name: String,
}

impl QdrantStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        collection_name: impl Into<String>,
        timeout: Duration,
    ) -> VectorResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            collection_name: collection_name.into(),
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/collections/{}",
            self.base_url,
            urlencoding::encode(&self.collection_name)
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn collection_info(&self) -> VectorResult<Option<CollectionInfo>> {
        let url = self.collection_url();
        hybridrag_observability::log_external_call!("qdrant", url.as_str());

        let response = self.authorized(self.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(VectorError::from_response(response).await);
        }

        let info: QdrantResponse<CollectionInfo> = response.json().await?;
        Ok(Some(info.result))
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    async fn ensure_collection(&self, dimension: usize) -> VectorResult<bool> {
        if self.collection_info().await?.is_some() {
            tracing::info!("✅ Collection '{}' already exists", self.collection_name);
            return Ok(false);
        }

        tracing::info!("🔨 Creating collection '{}'", self.collection_name);

        let create_request = serde_json::json!({
            "vectors": {
                "size": dimension,
                "distance": "Cosine"
            }
        });

        let response = self
            .authorized(self.client.put(self.collection_url()))
            .json(&create_request)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!("✅ Successfully created collection '{}'", self.collection_name);
            Ok(true)
        } else {
            let err = VectorError::from_response(response).await;
            tracing::error!("❌ Failed to create collection: {}", err);
            Err(err)
        }
    }

    async fn upsert(&self, points: Vec<VectorPoint>) -> VectorResult<usize> {
        let url = format!("{}/points?wait=true", self.collection_url());
        let mut stored = 0;

        for batch in points.chunks(UPSERT_BATCH_SIZE) {
            let response = self
                .authorized(self.client.put(&url))
                .json(&UpsertRequest { points: batch })
                .send()
                .await?;

            if !response.status().is_success() {
                let err = VectorError::from_response(response).await;
                tracing::error!("❌ Failed to store vectors in batch: {}", err);
                return Err(err);
            }
            stored += batch.len();
        }

        hybridrag_observability::log_db!("UPSERT", self.collection_name.as_str(), stored);
        Ok(stored)
    }

    async fn search(&self, vector: &[f32], limit: usize) -> VectorResult<Vec<ScoredPoint>> {
        let url = format!("{}/points/search", self.collection_url());
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };

        let response = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VectorError::from_response(response).await);
        }

        let results: QdrantResponse<Vec<ScoredPoint>> = response.json().await?;
        tracing::debug!(hits = results.result.len(), limit, "Vector search complete");
        Ok(results.result)
    }

    async fn stats(&self) -> VectorResult<Option<CollectionStats>> {
        Ok(self.collection_info().await?.map(|info| CollectionStats {
            vectors_count: info.vectors_count.unwrap_or(0),
            points_count: info.points_count.unwrap_or(0),
            segments_count: info.segments_count.unwrap_or(0),
        }))
    }

    async fn drop_collection(&self) -> VectorResult<bool> {
        let response = self
            .authorized(self.client.delete(self.collection_url()))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(VectorError::from_response(response).await);
        }

        // Some Qdrant versions answer 200 with `"result": false` for a missing collection
        let dropped = response
            .json::<QdrantResponse<bool>>()
            .await
            .map(|r| r.result)
            .unwrap_or(true);

        if dropped {
            tracing::warn!("Dropped collection '{}'", self.collection_name);
        }
        Ok(dropped)
    }
}
