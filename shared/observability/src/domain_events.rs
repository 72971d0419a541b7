//! Pipeline events with a fixed JSON shape, logged under the `domain_event`
//! target so they can be filtered apart from ordinary diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
    /// Work was intentionally not done (unusable model output, empty input)
    Skipped,
    /// Finished, but with a fallback path
    Degraded,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
            Self::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Ingestion,
    Chunking,
    Embedding,
    Extraction,
    Search,
    Graph,
    Agent,
    Admin,
}

impl EventCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::Chunking => "chunking",
            Self::Embedding => "embedding",
            Self::Extraction => "extraction",
            Self::Search => "search",
            Self::Graph => "graph",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub category: EventCategory,
    /// What happened, e.g. `ingestion_completed`
    pub action: String,
    pub outcome: Outcome,
    /// `kind:id` of the thing acted on (`file:notes.md`, `store:qdrant`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl DomainEvent {
    pub fn record(service: &str, category: EventCategory, action: &str) -> EventBuilder {
        EventBuilder {
            event: DomainEvent {
                timestamp: Utc::now(),
                service: service.to_string(),
                category,
                action: action.to_string(),
                outcome: Outcome::Success,
                subject: None,
                duration_ms: None,
                error: None,
                fields: Map::new(),
            },
        }
    }
}

pub struct EventBuilder {
    event: DomainEvent,
}

impl EventBuilder {
    pub fn subject(mut self, kind: &str, id: &str) -> Self {
        self.event.subject = Some(format!("{}:{}", kind, id));
        self
    }

    pub fn count(self, name: &str, value: usize) -> Self {
        self.field(name, value)
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.event.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn took(mut self, duration_ms: u64) -> Self {
        self.event.duration_ms = Some(duration_ms);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.event.outcome = outcome;
        self
    }

    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.event.outcome = Outcome::Failure;
        self.event.error = Some(error.into());
        self
    }

    pub fn finish(self) -> DomainEvent {
        self.event
    }

    /// Failures log at error, skips and fallbacks at warn, the rest at info
    pub fn emit(self) {
        let event = self.event;
        let json = serde_json::to_string(&event).unwrap_or_default();
        let category = event.category.as_str();
        let outcome = event.outcome.as_str();

        match event.outcome {
            Outcome::Success => {
                tracing::info!(target: "domain_event", category, action = %event.action, outcome, "{}", json)
            }
            Outcome::Failure => {
                tracing::error!(target: "domain_event", category, action = %event.action, outcome, "{}", json)
            }
            Outcome::Skipped | Outcome::Degraded => {
                tracing::warn!(target: "domain_event", category, action = %event.action, outcome, "{}", json)
            }
        }
    }
}

pub fn log_ingestion_completed(
    service: &str,
    files_processed: usize,
    chunks_embedded: usize,
    nodes_created: usize,
    relationships_created: usize,
    duration_ms: u64,
) {
    DomainEvent::record(service, EventCategory::Ingestion, "ingestion_completed")
        .count("files_processed", files_processed)
        .count("chunks_embedded", chunks_embedded)
        .count("nodes_created", nodes_created)
        .count("relationships_created", relationships_created)
        .took(duration_ms)
        .emit();
}

pub fn log_ingestion_failed(service: &str, error: &str, duration_ms: u64) {
    DomainEvent::record(service, EventCategory::Ingestion, "ingestion_failed")
        .took(duration_ms)
        .failed(error)
        .emit();
}

pub fn log_document_chunked(service: &str, file_name: &str, chunks: usize) {
    DomainEvent::record(service, EventCategory::Chunking, "document_chunked")
        .subject("file", file_name)
        .count("chunks", chunks)
        .emit();
}

pub fn log_chunks_embedded(service: &str, chunks: usize, dimension: usize, duration_ms: u64) {
    DomainEvent::record(service, EventCategory::Embedding, "chunks_embedded")
        .count("chunks", chunks)
        .count("dimension", dimension)
        .took(duration_ms)
        .emit();
}

/// A chunk whose extraction output could not be used
pub fn log_extraction_skipped(service: &str, chunk_id: &str, reason: &str) {
    DomainEvent::record(service, EventCategory::Extraction, "chunk_extraction_skipped")
        .subject("chunk", chunk_id)
        .field("reason", reason)
        .outcome(Outcome::Skipped)
        .emit();
}

pub fn log_graph_ingested(
    service: &str,
    entities: usize,
    chunks: usize,
    mentions: usize,
    relationships: usize,
    duration_ms: u64,
) {
    DomainEvent::record(service, EventCategory::Graph, "graph_ingested")
        .count("entities", entities)
        .count("chunks", chunks)
        .count("mentions", mentions)
        .count("relationships", relationships)
        .took(duration_ms)
        .emit();
}

pub fn log_search_executed(service: &str, chunks_found: usize, relationships_found: usize, duration_ms: u64) {
    DomainEvent::record(service, EventCategory::Search, "hybrid_query_executed")
        .count("chunks_found", chunks_found)
        .count("relationships_found", relationships_found)
        .took(duration_ms)
        .emit();
}

/// `structured` is false when the model's reply had to be used verbatim
pub fn log_agent_answered(service: &str, sources: usize, structured: bool, duration_ms: u64) {
    let outcome = if structured { Outcome::Success } else { Outcome::Degraded };

    DomainEvent::record(service, EventCategory::Agent, "question_answered")
        .count("sources", sources)
        .took(duration_ms)
        .outcome(outcome)
        .emit();
}

pub fn log_store_wiped(service: &str, store: &str, success: bool, message: &str) {
    let builder = DomainEvent::record(service, EventCategory::Admin, "store_wiped").subject("store", store);

    if success {
        builder.field("message", message).emit();
    } else {
        builder.failed(message).emit();
    }
}
