use serde::{Deserialize, Serialize};

/// JSON object the answering LLM is instructed to return
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResponse {
    /// The answer itself, without inline citations
    pub answer: String,
    /// Cited sources in the form "filename, Chunk N"
    pub sources: Vec<String>,
    pub chunks_retrieved: usize,
    pub relationships_found: usize,
}

/// Final answer handed back to the caller for one chat turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatAnswer {
    pub success: bool,
    pub answer: String,
    pub sources: Vec<String>,
    pub chunks_retrieved: usize,
    pub relationships_found: usize,
}

impl From<AgentResponse> for ChatAnswer {
    fn from(response: AgentResponse) -> Self {
        Self {
            success: true,
            answer: response.answer,
            sources: response.sources,
            chunks_retrieved: response.chunks_retrieved,
            relationships_found: response.relationships_found,
        }
    }
}
