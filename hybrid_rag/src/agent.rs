use graph_rag::{LlmGenerateRequest, LlmGenerationClient, OutputFormat};
use hybridrag_models::{AgentResponse, ChatAnswer};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{PipelineError, PipelineResult};
use crate::retrieval::HybridContextBuilder;

const SERVICE: &str = "agent";

pub const AGENT_SYSTEM_PROMPT: &str = r#"You are a strict Knowledge Assistant powered by a Hybrid RAG system.

Your goal is to answer user questions using ONLY the provided context.

**CRITICAL INSTRUCTIONS:**
1. **IGNORE INTERNAL KNOWLEDGE**: Do not use any outside knowledge, training data, or assumptions. Only use the facts provided in the "RELEVANT TEXT CHUNKS" and "KNOWLEDGE GRAPH CONTEXT".
2. **BE FAITHFUL**: If the context says "The sky is green", you must answer "The sky is green".
3. **NO HALLUCINATION**: If the answer is not in the context, say "I cannot find this information in the provided context." do not make up an answer.
4. **SYNTHESIZE**: Combine information from the text chunks and graph relationships to form a coherent answer.

**Output Format**
You MUST respond with ONLY a valid JSON object in this exact format:
{
  "answer": "Your complete answer based ONLY on the context.",
  "sources": ["filename, Chunk N", "filename, Chunk M"],
  "chunks_retrieved": 5,
  "relationships_found": 12
}
"#;

/// Lenient view of the model's JSON; only `answer` is mandatory
#[derive(Debug, Deserialize)]
struct RawAgentResponse {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    chunks_retrieved: Option<usize>,
    #[serde(default)]
    relationships_found: Option<usize>,
}

/// Parse the answering model's output.
///
/// Takes the span from the first `{` to the last `}`. When that isn't a
/// usable object, the whole output becomes the answer and the counts fall
/// back to what retrieval produced. The flag reports whether parsing worked.
pub fn parse_agent_response(raw: &str, chunks_retrieved: usize, relationships_found: usize) -> (AgentResponse, bool) {
    let parsed = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<RawAgentResponse>(&raw[start..=end]).ok()
        }
        _ => None,
    };

    match parsed {
        Some(response) => (
            AgentResponse {
                answer: response.answer,
                sources: response.sources,
                chunks_retrieved: response.chunks_retrieved.unwrap_or(chunks_retrieved),
                relationships_found: response.relationships_found.unwrap_or(relationships_found),
            },
            true,
        ),
        None => (
            AgentResponse {
                answer: raw.trim().to_string(),
                sources: Vec::new(),
                chunks_retrieved,
                relationships_found,
            },
            false,
        ),
    }
}

/// Answers questions from retrieved context with a single model call
pub struct AnsweringAgent {
    llm: Arc<dyn LlmGenerationClient>,
    retriever: HybridContextBuilder,
}

impl AnsweringAgent {
    pub fn new(llm: Arc<dyn LlmGenerationClient>, retriever: HybridContextBuilder) -> Self {
        Self { llm, retriever }
    }

    pub async fn answer(&self, message: &str) -> PipelineResult<ChatAnswer> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PipelineError::EmptyMessage);
        }

        let start = Instant::now();

        let (context, chunks, relationships) = match self.retriever.build(message).await {
            Ok(context) => (context.render(), context.chunk_count(), context.relationship_count()),
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval failed, answering without context");
                (format!("Error retrieving knowledge: {}", e), 0, 0)
            }
        };

        let user_prompt = format!("Question: {}\n\nContext:\n{}", message, context);
        let request = LlmGenerateRequest {
            model: self.llm.model(),
            system_prompt: Some(Cow::Borrowed(AGENT_SYSTEM_PROMPT)),
            user_prompt: Cow::Owned(user_prompt),
            output_format: Some(OutputFormat::JsonObject),
        };

        let response = self.llm.generate(request).await?;
        let (parsed, structured) = parse_agent_response(&response.text, chunks, relationships);

        if !structured {
            tracing::warn!("Model did not return the expected JSON, using raw output");
        }
        hybridrag_observability::log_agent_answered(
            SERVICE,
            parsed.sources.len(),
            structured,
            start.elapsed().as_millis() as u64,
        );

        Ok(ChatAnswer::from(parsed))
    }
}

/// Interactive question loop. `exit` or `quit` ends it, as does end of input.
pub async fn run_chat<R, W>(agent: &AnsweringAgent, input: R, mut output: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = match agent.answer(line).await {
            Ok(answer) => {
                let mut reply = format!("Assistant: {}\n", answer.answer);
                if !answer.sources.is_empty() {
                    reply.push_str(&format!("Sources: {}\n", answer.sources.join("; ")));
                }
                reply
            }
            Err(e) => format!("Error: {}\n", e),
        };
        output.write_all(reply.as_bytes()).await?;
    }

    output.write_all(b"Goodbye!\n").await?;
    output.flush().await
}
