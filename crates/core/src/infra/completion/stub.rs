use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, CompletionClient, CompletionError, CompletionRequest};
use crate::domain::types::TokenUsage;

/// Deterministic completion client for tests and offline runs.
///
/// Queued results are returned first, in order; after that every call gets
/// the fallback. Every request is recorded for inspection.
pub struct StubCompletionClient {
    queued: Mutex<VecDeque<Result<Completion, CompletionError>>>,
    fallback: Result<Completion, CompletionError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletionClient {
    pub fn new(fallback: Result<Completion, CompletionError>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `text` with the given token counts.
    pub fn replying(text: impl Into<String>, input_tokens: u64, output_tokens: u64) -> Self {
        Self::new(Ok(Completion {
            text: Some(text.into()),
            usage: Some(TokenUsage::new(input_tokens, output_tokens)),
        }))
    }

    /// Always fails with `err`.
    pub fn failing(err: CompletionError) -> Self {
        Self::new(Err(err))
    }

    /// Queues a one-off result ahead of the fallback.
    pub fn then(self, result: Result<Completion, CompletionError>) -> Self {
        self.queued.lock().unwrap().push_back(result);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for StubCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, CompletionError> {
        self.requests.lock().unwrap().push(request);
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".to_string(),
            system_prompt: "sys".to_string(),
            user_prompt: user.to_string(),
            temperature: 0.7,
            max_output_tokens: 10,
        }
    }

    #[tokio::test]
    async fn test_stub_replies_and_records() {
        let stub = StubCompletionClient::replying("done", 10, 5);
        let c = stub.complete(request("first")).await.unwrap();
        assert_eq!(c.text.as_deref(), Some("done"));
        assert_eq!(c.usage.unwrap().total_tokens, 15);

        stub.complete(request("second")).await.unwrap();
        assert_eq!(stub.call_count(), 2);
        assert_eq!(stub.requests()[1].user_prompt, "second");
    }

    #[tokio::test]
    async fn test_queued_results_come_first() {
        let stub = StubCompletionClient::replying("ok", 1, 1).then(Err(CompletionError::Timeout));
        assert_eq!(stub.complete(request("a")).await, Err(CompletionError::Timeout));
        assert!(stub.complete(request("b")).await.is_ok());
    }

    #[test]
    fn test_stub_name() {
        assert_eq!(StubCompletionClient::failing(CompletionError::Timeout).name(), "stub");
    }
}
