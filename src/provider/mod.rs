//! Provider trait and normalized request/response types.
//!
//! The [`Provider`] trait abstracts over completion services, translating
//! between normalized [`CompletionRequest`]/[`CompletionResponse`] types
//! and provider-specific HTTP APIs. Built-in implementations:
//! [`GroqProvider`], [`GeminiProvider`], [`MockProvider`].
//!
//! ```text
//! Forge ──► CompletionRequest ──► Provider::complete() ──► CompletionResponse
//!                                        │
//!                            ┌───────────┴───────────┐
//!                       GroqProvider            GeminiProvider
//!                    /v1/chat/completions    :generateContent
//! ```

pub mod backoff;
pub mod gemini;
pub mod groq;
pub mod mock;

pub use backoff::BackoffConfig;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use mock::MockProvider;

use crate::error::Result;
use crate::ForgeError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Type alias for the callback invoked before each transport retry.
///
/// Arguments: `(attempt_number, delay_before_retry, reason_for_retry)`.
pub type RetryCallback<'a> = Option<&'a mut (dyn FnMut(u32, std::time::Duration, &str) + Send)>;

/// A normalized completion request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. `"llama-3.3-70b-versatile"`, `"gemini-2.0-flash"`).
    pub model: String,

    /// Optional system instructions.
    pub system_prompt: Option<String>,

    /// The user prompt text.
    pub prompt: String,

    /// For semantic retry: prior conversation (original prompt + bad
    /// response + correction). Empty on initial calls.
    pub messages: Vec<ChatMessage>,

    /// Sampling configuration (temperature, max_tokens, json_mode).
    pub config: crate::forge::ModelConfig,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,
    /// The message content.
    pub content: String,
}

/// The role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// System instructions.
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// A normalized completion response.
#[derive(Debug)]
pub struct CompletionResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics).
    pub status: u16,

    /// Provider-specific metadata (token counts, model info).
    /// Stored as raw JSON — each provider returns different fields.
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over completion services.
///
/// Implementors translate between the normalized types and the service's
/// HTTP API. Object-safe; designed to be used as `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Execute a completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;

    /// Human-readable name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Check whether a [`ForgeError`] is retryable under the backoff config.
///
/// Retryable conditions:
/// - [`ForgeError::HttpError`] with a status in `config.retryable_statuses`
/// - [`ForgeError::Request`] (connection/transport errors)
pub fn is_retryable(error: &ForgeError, config: &BackoffConfig) -> bool {
    match error {
        ForgeError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        ForgeError::Request(_) => true,
        _ => false,
    }
}

/// Execute a provider call with transport-level retry and exponential backoff.
///
/// Retries transient failures (429, 5xx, connection errors) per the
/// [`BackoffConfig`], honoring `Retry-After` hints when configured.
/// Returns the first successful response, or the last error once retries
/// are exhausted.
pub async fn with_backoff(
    provider: &Arc<dyn Provider>,
    client: &Client,
    base_url: &str,
    request: &CompletionRequest,
    config: &BackoffConfig,
    cancel: Option<&std::sync::atomic::AtomicBool>,
    mut on_retry: RetryCallback<'_>,
) -> Result<CompletionResponse> {
    let mut last_error: Option<ForgeError> = None;

    for attempt in 0..=config.max_retries {
        if let Some(flag) = cancel {
            if flag.load(std::sync::atomic::Ordering::Relaxed) {
                return Err(ForgeError::Cancelled);
            }
        }

        if attempt > 0 {
            let delay = if let Some(ForgeError::HttpError {
                retry_after: Some(ra),
                ..
            }) = &last_error
            {
                if config.respect_retry_after {
                    *ra
                } else {
                    config.delay_for_attempt(attempt - 1)
                }
            } else {
                config.delay_for_attempt(attempt - 1)
            };

            let reason = last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();

            if let Some(ref mut cb) = on_retry {
                cb(attempt, delay, &reason);
            }

            tokio::time::sleep(delay).await;

            if let Some(flag) = cancel {
                if flag.load(std::sync::atomic::Ordering::Relaxed) {
                    return Err(ForgeError::Cancelled);
                }
            }
        }

        match provider.complete(client, base_url, request).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| ForgeError::Other("backoff loop exited unexpectedly".into())))
}

/// Parse a `Retry-After` header value as whole seconds.
pub(crate) fn parse_retry_after(value: &str) -> Option<std::time::Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(std::time::Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::ModelConfig;
    use std::time::Duration;

    fn test_request() -> CompletionRequest {
        CompletionRequest {
            model: "test".into(),
            system_prompt: None,
            prompt: "test".into(),
            messages: Vec::new(),
            config: ModelConfig::default(),
        }
    }

    #[test]
    fn retryable_429() {
        let err = ForgeError::HttpError {
            status: 429,
            body: "rate limited".into(),
            retry_after: None,
        };
        assert!(is_retryable(&err, &BackoffConfig::standard()));
    }

    #[test]
    fn retryable_503() {
        let err = ForgeError::HttpError {
            status: 503,
            body: "service unavailable".into(),
            retry_after: None,
        };
        assert!(is_retryable(&err, &BackoffConfig::standard()));
    }

    #[test]
    fn client_error_not_retried() {
        let err = ForgeError::HttpError {
            status: 400,
            body: "bad request".into(),
            retry_after: None,
        };
        assert!(!is_retryable(&err, &BackoffConfig::standard()));
    }

    #[test]
    fn non_http_errors_not_retried() {
        let config = BackoffConfig::standard();
        assert!(!is_retryable(&ForgeError::Other("nope".into()), &config));
        assert!(!is_retryable(&ForgeError::Cancelled, &config));
    }

    #[test]
    fn parse_retry_after_seconds() {
        assert_eq!(parse_retry_after("30"), Some(Duration::from_secs(30)));
        assert_eq!(parse_retry_after(" 5 "), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[tokio::test]
    async fn backoff_respects_cancellation() {
        use std::sync::atomic::AtomicBool;

        let cancel = AtomicBool::new(true);
        let provider: Arc<dyn Provider> = Arc::new(GroqProvider::new());
        let client = Client::new();

        let result = with_backoff(
            &provider,
            &client,
            "http://localhost:1",
            &test_request(),
            &BackoffConfig::standard(),
            Some(&cancel),
            None,
        )
        .await;

        assert!(matches!(result, Err(ForgeError::Cancelled)));
    }
}
