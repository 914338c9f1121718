mod openai;
mod stub;

pub use openai::OpenAiClient;
pub use stub::StubCompletionClient;

use async_trait::async_trait;

use crate::domain::types::TokenUsage;

/// Completion call failures, as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("OpenAI API key is not configured")]
    MissingCredential,
    #[error("Authentication with the completion service failed: {0}")]
    Unauthorized(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Completion service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Request to completion service timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response from completion service: {0}")]
    Decode(String),
}

/// One system + user prompt pair sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Raw completion output. Either part may be missing; the caller decides
/// what that means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Completion service (OpenAI or a test double)
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError>;

    fn name(&self) -> &str;
}
