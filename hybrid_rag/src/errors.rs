use graph_rag::GraphError;
use hybridrag_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;
use vector_rag::VectorError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No files found in {0}")]
    NoFiles(PathBuf),

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
