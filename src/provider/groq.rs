//! Provider for Groq and other OpenAI-compatible chat APIs.
//!
//! Endpoint: `{base}/v1/chat/completions`. Groq serves the OpenAI wire
//! format under `https://api.groq.com/openai`, so the same provider also
//! works against OpenAI, Together, Fireworks, and compatible gateways.

use super::{parse_retry_after, CompletionRequest, CompletionResponse, Provider, Role};
use crate::error::Result;
use crate::ForgeError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Provider for any OpenAI-compatible chat completions API.
///
/// # Example
///
/// ```
/// use ideaforge::provider::GroqProvider;
///
/// let provider = GroqProvider::new().with_api_key("gsk_...");
/// ```
#[derive(Clone)]
pub struct GroqProvider {
    /// Optional API key. If set, sent as `Authorization: Bearer {key}`.
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for GroqProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProvider")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| {
                    if k.len() > 6 {
                        format!("{}***", &k[..6])
                    } else {
                        "***".to_string()
                    }
                }),
            )
            .finish()
    }
}

impl GroqProvider {
    /// Create a provider without authentication (for local gateways).
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key for authentication.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the messages array for the chat request.
    fn build_messages(request: &CompletionRequest) -> Vec<Value> {
        let mut messages = Vec::new();

        if let Some(ref sys) = request.system_prompt {
            if !sys.is_empty() {
                messages.push(json!({"role": "system", "content": sys}));
            }
        }

        // Correction history replaces the plain prompt when present
        for msg in &request.messages {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(json!({"role": role, "content": msg.content}));
        }

        if request.messages.is_empty() {
            messages.push(json!({"role": "user", "content": request.prompt}));
        }

        messages
    }

    /// Build the request body for `/v1/chat/completions`.
    fn build_body(request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": Self::build_messages(request),
            "temperature": request.config.temperature,
            "max_tokens": request.config.max_tokens,
            "stream": false,
        });

        if request.config.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        body
    }

    /// Build the reqwest request with the auth header when configured.
    fn build_http_request(
        &self,
        client: &Client,
        url: &str,
        body: &Value,
    ) -> reqwest::RequestBuilder {
        let mut req = client.post(url).json(body);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        req
    }

    /// Pull token usage and model info out of the raw response.
    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        for key in ["usage", "model", "id"] {
            if let Some(v) = json_resp.get(key) {
                meta.insert(key.into(), v.clone());
            }
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

impl Default for GroqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1/chat/completions", base);
        let body = Self::build_body(request);

        let resp = self
            .build_http_request(client, &url, &body)
            .send()
            .await
            .map_err(|e| {
                ForgeError::Other(format!("Failed to connect to provider at {}: {}", url, e))
            })?;

        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let text = resp.text().await.unwrap_or_default();
            return Err(ForgeError::HttpError {
                status,
                body: text,
                retry_after,
            });
        }

        let json_resp: Value = resp.json().await?;

        let text = json_resp
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(CompletionResponse {
            text,
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}
