use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::errors::{GraphError, GraphResult};
use crate::llm::{LlmGenerateRequest, LlmGenerateResponse, LlmGenerationClient, OutputFormat};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for any server exposing an OpenAI-compatible `/chat/completions` route
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> GraphResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

fn create_chat_request<'a>(request: &'a LlmGenerateRequest<'_>) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = &request.system_prompt {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: Some(system.to_string()),
        });
    }

    messages.push(ChatMessage {
        role: "user".to_string(),
        content: Some(request.user_prompt.to_string()),
    });

    ChatRequest {
        model: request.model,
        messages,
        response_format: request.output_format.map(|format| match format {
            OutputFormat::JsonObject => ResponseFormat { kind: "json_object" },
        }),
    }
}

#[async_trait]
impl LlmGenerationClient for OpenAiChatClient {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> GraphResult<LlmGenerateResponse> {
        let chat_request = create_chat_request(&request);
        let endpoint = format!("{}/chat/completions", self.base_url);

        hybridrag_observability::log_external_call!("llm", endpoint.as_str());
        let start = Instant::now();

        let mut builder = self.client.post(&endpoint).json(&chat_request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        hybridrag_observability::log_external_call!(
            "llm",
            endpoint.as_str(),
            start.elapsed().as_millis() as u64,
            status.as_u16()
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GraphError::Llm(format!("API error {}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response.json().await?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GraphError::Llm("No response content from model".to_string()))?;

        Ok(LlmGenerateResponse { text })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
