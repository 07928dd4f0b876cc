//! Mock provider for testing without a live completion service.
//!
//! [`MockProvider`] returns pre-configured responses in order, allowing
//! downstream consumers to write deterministic tests against this crate.
//!
//! # Example
//!
//! ```
//! use ideaforge::provider::MockProvider;
//!
//! let mock = MockProvider::fixed(r#"{"title": "CLI budgeter"}"#);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;

use super::{CompletionRequest, CompletionResponse, Provider};
use crate::error::Result;

/// A test provider that returns canned responses in order.
///
/// Cycles back to the beginning when all responses have been consumed.
#[derive(Debug)]
pub struct MockProvider {
    responses: Vec<String>,
    index: AtomicUsize,
}

impl MockProvider {
    /// Create a mock with the given canned responses, returned in order.
    pub fn new(responses: Vec<String>) -> Self {
        assert!(
            !responses.is_empty(),
            "MockProvider requires at least one response"
        );
        Self {
            responses,
            index: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// How many completions have been served so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    fn next_response(&self) -> String {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        self.responses[idx].clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _client: &Client,
        _base_url: &str,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        Ok(CompletionResponse {
            text: self.next_response(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::ModelConfig;

    fn test_request() -> CompletionRequest {
        CompletionRequest {
            model: "test".into(),
            system_prompt: None,
            prompt: "test".into(),
            messages: Vec::new(),
            config: ModelConfig::default(),
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let mock = MockProvider::fixed("Hello!");
        let client = Client::new();
        let resp = mock
            .complete(&client, "http://unused", &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text, "Hello!");
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn cycles_responses() {
        let mock = MockProvider::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let request = test_request();

        let r1 = mock.complete(&client, "http://unused", &request).await.unwrap();
        let r2 = mock.complete(&client, "http://unused", &request).await.unwrap();
        let r3 = mock.complete(&client, "http://unused", &request).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(r3.text, "first"); // cycles
        assert_eq!(mock.calls(), 3);
    }
}
