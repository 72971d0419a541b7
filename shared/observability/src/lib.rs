//! Hybrid RAG Observability Library
//!
//! Provides the logging setup shared by every binary in the workspace.
//!
//! # Features
//! - Structured JSON or pretty logging with a consistent schema
//! - Domain event logging for ingestion, retrieval and agent turns
//! - Timing and external-call macros

pub mod domain_events;
pub mod init;
pub mod macros;

pub use domain_events::*;
pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, warn, trace, span, Level, Instrument};
pub use tracing::instrument;
