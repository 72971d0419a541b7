use graph_rag::{GraphStats, GraphStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use vector_rag::{CollectionStats, VectorStore};

const SERVICE: &str = "admin";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VectorStoreStatus {
    Connected {
        collection: String,
        #[serde(flatten)]
        stats: CollectionStats,
    },
    Disconnected {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GraphStoreStatus {
    Connected {
        #[serde(flatten)]
        stats: GraphStats,
    },
    Disconnected {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LlmServerStatus {
    Connected { models: Vec<String>, model_count: usize },
    /// Server answered with a non-success status
    Error { error: String },
    Disconnected { error: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemStats {
    pub vector_store: VectorStoreStatus,
    pub graph_store: GraphStoreStatus,
    pub llm_server: LlmServerStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoreWipe {
    pub success: bool,
    pub message: String,
}

impl StoreWipe {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WipeReport {
    pub vector_store: StoreWipe,
    pub graph_store: StoreWipe,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Health and maintenance operations over both stores
pub struct AdminService {
    vector_store: Arc<dyn VectorStore>,
    /// Holds the connection error when the graph store could not be reached
    graph_store: Result<Arc<dyn GraphStore>, String>,
    http: reqwest::Client,
    ollama_url: String,
}

impl AdminService {
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        graph_store: Result<Arc<dyn GraphStore>, String>,
        ollama_url: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            vector_store,
            graph_store,
            http,
            ollama_url: ollama_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn stats(&self) -> SystemStats {
        SystemStats {
            vector_store: self.vector_status().await,
            graph_store: self.graph_status().await,
            llm_server: self.llm_status().await,
        }
    }

    async fn vector_status(&self) -> VectorStoreStatus {
        match self.vector_store.stats().await {
            Ok(stats) => VectorStoreStatus::Connected {
                collection: self.vector_store.collection_name().to_string(),
                stats: stats.unwrap_or_default(),
            },
            Err(e) => VectorStoreStatus::Disconnected { error: e.to_string() },
        }
    }

    async fn graph_status(&self) -> GraphStoreStatus {
        let store = match &self.graph_store {
            Ok(store) => store,
            Err(e) => return GraphStoreStatus::Disconnected { error: e.clone() },
        };

        match store.stats().await {
            Ok(stats) => GraphStoreStatus::Connected { stats },
            Err(e) => GraphStoreStatus::Disconnected { error: e.to_string() },
        }
    }

    async fn llm_status(&self) -> LlmServerStatus {
        let url = format!("{}/api/tags", self.ollama_url);
        hybridrag_observability::log_external_call!("ollama", url.as_str());

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return LlmServerStatus::Disconnected { error: e.to_string() },
        };

        if !response.status().is_success() {
            return LlmServerStatus::Error {
                error: format!("HTTP {}", response.status().as_u16()),
            };
        }

        match response.json::<TagsResponse>().await {
            Ok(tags) => {
                let models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
                LlmServerStatus::Connected {
                    model_count: models.len(),
                    models,
                }
            }
            Err(e) => LlmServerStatus::Error { error: e.to_string() },
        }
    }

    /// Drop the vector collection and delete every graph node.
    /// Each store reports independently.
    pub async fn wipe(&self) -> WipeReport {
        let vector_store = match self.vector_store.drop_collection().await {
            Ok(true) => StoreWipe::ok(format!(
                "Collection '{}' deleted",
                self.vector_store.collection_name()
            )),
            Ok(false) => StoreWipe::ok("Collection not found"),
            Err(e) => StoreWipe::failed(e.to_string()),
        };
        hybridrag_observability::log_store_wiped(
            SERVICE,
            "qdrant",
            vector_store.success,
            &vector_store.message,
        );

        let graph_store = match &self.graph_store {
            Ok(store) => match store.clear().await {
                Ok(()) => StoreWipe::ok("All nodes and relationships deleted"),
                Err(e) => StoreWipe::failed(e.to_string()),
            },
            Err(e) => StoreWipe::failed(e.clone()),
        };
        hybridrag_observability::log_store_wiped(
            SERVICE,
            "neo4j",
            graph_store.success,
            &graph_store.message,
        );

        WipeReport {
            vector_store,
            graph_store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_status_serializes_flat() {
        let status = VectorStoreStatus::Connected {
            collection: "QdrantRagCollection".to_string(),
            stats: CollectionStats {
                vectors_count: 3,
                points_count: 3,
                segments_count: 1,
            },
        };
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["status"], "connected");
        assert_eq!(json["collection"], "QdrantRagCollection");
        assert_eq!(json["points_count"], 3);
    }

    #[test]
    fn test_llm_error_status_serializes() {
        let json = serde_json::to_value(LlmServerStatus::Error {
            error: "HTTP 500".to_string(),
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({"status": "error", "error": "HTTP 500"}));
    }
}
