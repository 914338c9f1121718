use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Completion, CompletionClient, CompletionError, CompletionRequest};
use crate::domain::types::TokenUsage;

/// OpenAI chat-completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl OpenAiClient {
    /// `api_key` may be absent; the client then fails each call with
    /// `MissingCredential` instead of refusing to start.
    pub fn new(api_key: Option<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client with timeout, using defaults: {e}");
                reqwest::Client::new()
            });

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key,
            base_url,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingCredential)?;

        let body = ChatRequest {
            model: &request.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system_prompt,
                },
                Message {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        log::debug!("POST {} (model: {})", self.endpoint(), request.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Network(format!("Failed to read response body: {e}"))
            }
        })?;

        parse_response(status, &text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Maps an HTTP status and body to a completion or a classified error.
fn parse_response(status: u16, body: &str) -> Result<Completion, CompletionError> {
    if !(200..300).contains(&status) {
        return Err(classify_status(status, body));
    }

    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Decode(e.to_string()))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content);

    let usage = parsed.usage.and_then(|u| match (u.prompt_tokens, u.completion_tokens) {
        (Some(input), Some(output)) => Some(TokenUsage::new(input, output)),
        _ => None,
    });

    Ok(Completion { text, usage })
}

fn classify_status(status: u16, body: &str) -> CompletionError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => CompletionError::Unauthorized(message),
        429 => {
            let quota = envelope.as_ref().is_some_and(|e| {
                e.error.code.as_deref() == Some("insufficient_quota")
                    || e.error.kind.as_deref() == Some("insufficient_quota")
            }) || body.contains("insufficient_quota");
            if quota {
                CompletionError::QuotaExceeded(message)
            } else {
                CompletionError::RateLimited(message)
            }
        }
        _ => CompletionError::Http {
            status,
            body: message,
        },
    }
}
