use async_trait::async_trait;
use std::borrow::Cow;

use crate::errors::GraphResult;

pub mod openai;

pub use openai::OpenAiChatClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Ask the server to constrain output to a single JSON object
    JsonObject,
}

#[derive(Debug)]
pub struct LlmGenerateRequest<'a> {
    pub model: &'a str,
    pub system_prompt: Option<Cow<'a, str>>,
    pub user_prompt: Cow<'a, str>,
    pub output_format: Option<OutputFormat>,
}

#[derive(Debug)]
pub struct LlmGenerateResponse {
    pub text: String,
}

#[async_trait]
pub trait LlmGenerationClient: Send + Sync {
    async fn generate(&self, request: LlmGenerateRequest<'_>) -> GraphResult<LlmGenerateResponse>;

    /// Model id used when callers don't pick one
    fn model(&self) -> &str;
}
