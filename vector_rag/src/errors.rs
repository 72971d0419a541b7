use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VectorError {
    /// Build an `Api` error from a non-success response, consuming its body
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        VectorError::Api { status, body }
    }
}

pub type VectorResult<T> = Result<T, VectorError>;
