//! Environment-driven configuration for the hybrid RAG services.
//!
//! Every setting is read from the process environment (after loading `.env`
//! if present). `AppConfig::from_lookup` takes an arbitrary key lookup so the
//! parsing rules can be exercised without touching the real environment.

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use hybridrag_models::ChunkIdStrategy;

pub const DEFAULT_COLLECTION_NAME: &str = "QdrantRagCollection";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Chat-completion endpoint (any OpenAI-compatible server)
#[derive(Clone, Debug, Serialize)]
pub struct LlmConfig {
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub batch_size: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct QdrantConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub collection_name: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct IngestionConfig {
    pub raw_data_folder: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_id_strategy: ChunkIdStrategy,
}

#[derive(Clone, Debug, Serialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub graph_context_limit: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    pub neo4j: Neo4jConfig,
    pub ingestion: IngestionConfig,
    pub retrieval: RetrievalConfig,
    /// Local model server probed by the stats command
    pub ollama_url: String,
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let llm_base_url = env
            .or("LLM_BASE_URL", "https://api.openai.com/v1")
            .trim_end_matches('/')
            .to_string();
        let llm_api_key = env.optional("LLM_API_KEY");

        let llm = LlmConfig {
            model: env.required("LLM_MODEL")?,
            api_key: llm_api_key.clone(),
            base_url: llm_base_url.clone(),
            timeout_secs: env.parse_or("LLM_TIMEOUT_SECS", 120)?,
        };

        let embedding = EmbeddingConfig {
            model: env.required("EMBEDDING_MODEL")?,
            dimension: env.parse_required("EMBEDDING_DIMENSION")?,
            api_key: env.optional("EMBEDDING_API_KEY").or(llm_api_key),
            base_url: env
                .optional("EMBEDDING_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(llm_base_url),
            batch_size: env.parse_or("EMBEDDING_BATCH_SIZE", 32)?,
        };
        if embedding.dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_DIMENSION".to_string(),
                value: "0".to_string(),
            });
        }
        if embedding.batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "EMBEDDING_BATCH_SIZE".to_string(),
                value: "0".to_string(),
            });
        }

        let qdrant = QdrantConfig {
            url: join_host_port(
                &env.or("QDRANT_URL", "http://localhost"),
                &env.or("QDRANT_HTTP_PORT", "6333"),
            ),
            api_key: env.optional("QDRANT_API_KEY"),
            collection_name: env.or("QDRANT_COLLECTION", DEFAULT_COLLECTION_NAME),
            timeout_secs: env.parse_or("QDRANT_TIMEOUT_SECS", 30)?,
        };

        let (user, password) = parse_neo4j_auth(&env.or("NEO4J_AUTH", "neo4j/password"))?;
        let neo4j = Neo4jConfig {
            uri: join_host_port(
                &env.or("NEO4J_URL", "bolt://localhost"),
                &env.or("NEO4J_BOLT_PORT", "7687"),
            ),
            user,
            password,
            database: env.or("NEO4J_DATABASE", "neo4j"),
        };

        let chunk_id_strategy: ChunkIdStrategy = env.parse_or("CHUNK_ID_STRATEGY", ChunkIdStrategy::Random)?;

        let ingestion = IngestionConfig {
            raw_data_folder: PathBuf::from(env.or("RAW_DATA_FOLDER", "./raw_data")),
            chunk_size: env.parse_or("CHUNK_SIZE", 512)?,
            chunk_overlap: env.parse_or("CHUNK_OVERLAP", 100)?,
            chunk_id_strategy,
        };
        if ingestion.chunk_size == 0 || ingestion.chunk_overlap >= ingestion.chunk_size {
            return Err(ConfigError::Invalid {
                key: "CHUNK_OVERLAP".to_string(),
                value: format!(
                    "{} (must be smaller than CHUNK_SIZE {})",
                    ingestion.chunk_overlap, ingestion.chunk_size
                ),
            });
        }

        let retrieval = RetrievalConfig {
            top_k: env.parse_or("RETRIEVAL_TOP_K", 5)?,
            graph_context_limit: env.parse_or("GRAPH_CONTEXT_LIMIT", 50)?,
        };

        let config = Self {
            llm,
            embedding,
            qdrant,
            neo4j,
            ingestion,
            retrieval,
            ollama_url: env
                .or("OLLAMA_URL", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
        };

        tracing::debug!(
            llm_model = %config.llm.model,
            embedding_model = %config.embedding.model,
            qdrant = %config.qdrant.url,
            neo4j = %config.neo4j.uri,
            "Configuration loaded"
        );

        Ok(config)
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> ConfigResult<String> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parse_required<T: FromStr>(&self, key: &str) -> ConfigResult<T> {
        let raw = self.required(key)?;
        parse_value(key, &raw)
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.optional(key) {
            Some(raw) => parse_value(key, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn join_host_port(host: &str, port: &str) -> String {
    format!("{}:{}", host.trim_end_matches('/'), port.trim())
}

/// Split a `user/password` pair
fn parse_neo4j_auth(raw: &str) -> ConfigResult<(String, String)> {
    match raw.split_once('/') {
        Some((user, password)) if !user.is_empty() => Ok((user.to_string(), password.to_string())),
        _ => Err(ConfigError::Invalid {
            key: "NEO4J_AUTH".to_string(),
            value: "<expected user/password>".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("LLM_MODEL", "gpt-4o-mini"),
            ("EMBEDDING_MODEL", "text-embedding-3-small"),
            ("EMBEDDING_DIMENSION", "1536"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&minimal())).unwrap();

        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.qdrant.url, "http://localhost:6333");
        assert_eq!(config.qdrant.collection_name, DEFAULT_COLLECTION_NAME);
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.ingestion.chunk_size, 512);
        assert_eq!(config.ingestion.chunk_overlap, 100);
        assert_eq!(config.ingestion.chunk_id_strategy, ChunkIdStrategy::Random);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.graph_context_limit, 50);
        assert_eq!(config.ollama_url, "http://localhost:11434");
    }

    #[test]
    fn test_missing_required() {
        let err = AppConfig::from_lookup(lookup(&[("LLM_MODEL", "m")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("EMBEDDING_MODEL".to_string()));
    }

    #[test]
    fn test_invalid_number() {
        let mut pairs = minimal();
        pairs.push(("CHUNK_SIZE", "large"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "CHUNK_SIZE"));
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut pairs = minimal();
        pairs.push(("CHUNK_SIZE", "100"));
        pairs.push(("CHUNK_OVERLAP", "100"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn test_neo4j_auth_and_urls() {
        let mut pairs = minimal();
        pairs.push(("NEO4J_AUTH", "admin/s3cr/et"));
        pairs.push(("NEO4J_URL", "neo4j://graph"));
        pairs.push(("NEO4J_BOLT_PORT", "7688"));
        pairs.push(("QDRANT_URL", "http://qdrant/"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.neo4j.user, "admin");
        assert_eq!(config.neo4j.password, "s3cr/et");
        assert_eq!(config.neo4j.uri, "neo4j://graph:7688");
        assert_eq!(config.qdrant.url, "http://qdrant:6333");
    }

    #[test]
    fn test_malformed_neo4j_auth() {
        let mut pairs = minimal();
        pairs.push(("NEO4J_AUTH", "nopassword"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "NEO4J_AUTH"));
    }

    #[test]
    fn test_embedding_inherits_llm_endpoint() {
        let mut pairs = minimal();
        pairs.push(("LLM_BASE_URL", "http://localhost:11434/v1/"));
        pairs.push(("LLM_API_KEY", "key"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.embedding.base_url, "http://localhost:11434/v1");
        assert_eq!(config.embedding.api_key.as_deref(), Some("key"));
    }

    #[test]
    fn test_unknown_chunk_id_strategy() {
        let mut pairs = minimal();
        pairs.push(("CHUNK_ID_STRATEGY", "sequential"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "CHUNK_ID_STRATEGY"));
    }

    #[test]
    fn test_chunk_id_strategy_is_case_insensitive() {
        let mut pairs = minimal();
        pairs.push(("CHUNK_ID_STRATEGY", "Deterministic"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.ingestion.chunk_id_strategy, ChunkIdStrategy::Deterministic);
    }
}
