//! Provider for the Google Gemini `generateContent` API.
//!
//! Endpoint: `{base}/v1beta/models/{model}:generateContent`, with the API
//! key passed as a query parameter. Roles map onto Gemini's `user`/`model`
//! pair; system instructions ride in `systemInstruction`.

use super::{parse_retry_after, CompletionRequest, CompletionResponse, Provider, Role};
use crate::error::Result;
use crate::ForgeError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Provider for Google's Gemini generateContent API.
///
/// # Example
///
/// ```
/// use ideaforge::provider::GeminiProvider;
///
/// let provider = GeminiProvider::new().with_api_key("AIza...");
/// ```
#[derive(Clone)]
pub struct GeminiProvider {
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
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

impl GeminiProvider {
    /// Create a provider without authentication.
    pub fn new() -> Self {
        Self { api_key: None }
    }

    /// Set the API key (sent as the `key` query parameter).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns `true` if an API key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the `contents` array. Gemini has no assistant role; model
    /// turns use `"model"`.
    fn build_contents(request: &CompletionRequest) -> Vec<Value> {
        if request.messages.is_empty() {
            return vec![json!({"role": "user", "parts": [{"text": request.prompt}]})];
        }

        request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    Role::Assistant => "model",
                    Role::System | Role::User => "user",
                };
                json!({"role": role, "parts": [{"text": msg.content}]})
            })
            .collect()
    }

    /// Build the generateContent request body.
    fn build_body(request: &CompletionRequest) -> Value {
        let mut generation_config = json!({
            "temperature": request.config.temperature,
            "maxOutputTokens": request.config.max_tokens,
        });

        if request.config.json_mode {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": Self::build_contents(request),
            "generationConfig": generation_config,
        });

        if let Some(ref sys) = request.system_prompt {
            if !sys.is_empty() {
                body["systemInstruction"] = json!({"parts": [{"text": sys}]});
            }
        }

        body
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(json_resp: &Value) -> String {
        json_resp
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        for key in ["usageMetadata", "modelVersion"] {
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

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let base = base_url.trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", base, request.model);
        let body = Self::build_body(request);

        let mut req = client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.query(&[("key", key.as_str())]);
        }

        let resp = req.send().await.map_err(|e| {
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

        Ok(CompletionResponse {
            text: Self::extract_text(&json_resp),
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::ModelConfig;
    use crate::provider::ChatMessage;

    fn test_request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.0-flash".into(),
            system_prompt: None,
            prompt: "Suggest a project.".into(),
            messages: Vec::new(),
            config: ModelConfig::default(),
        }
    }

    #[test]
    fn body_wraps_prompt_in_contents() {
        let body = GeminiProvider::build_body(&test_request());
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Suggest a project.");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn system_prompt_becomes_instruction() {
        let mut request = test_request();
        request.system_prompt = Some("You are a mentor.".into());

        let body = GeminiProvider::build_body(&request);
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a mentor."
        );
    }

    #[test]
    fn json_mode_sets_mime_type() {
        let mut request = test_request();
        request.config.json_mode = true;

        let body = GeminiProvider::build_body(&request);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn assistant_turns_map_to_model_role() {
        let mut request = test_request();
        request.messages = vec![
            ChatMessage {
                role: Role::User,
                content: "original".into(),
            },
            ChatMessage {
                role: Role::Assistant,
                content: "bad output".into(),
            },
        ];

        let body = GeminiProvider::build_body(&request);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
    }

    #[test]
    fn text_joins_candidate_parts() {
        let resp = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "part one "}, {"text": "part two"}]
                }
            }]
        });
        assert_eq!(GeminiProvider::extract_text(&resp), "part one part two");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        assert_eq!(GeminiProvider::extract_text(&json!({})), "");
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = GeminiProvider::new().with_api_key("AIzaSyEXAMPLE12345");
        let debug_output = format!("{:?}", provider);
        assert!(!debug_output.contains("EXAMPLE12345"));
        assert!(debug_output.contains("***"));
    }
}
