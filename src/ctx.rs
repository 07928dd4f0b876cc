//! Execution context shared across generation operations.
//!
//! [`ForgeCtx`] carries the HTTP client, provider, endpoint, template
//! variables, cancellation handle, and optional event handler. Construct it
//! once and share it across every call.

use crate::events::EventHandler;
use crate::provider::{BackoffConfig, GeminiProvider, GroqProvider, Provider};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

/// Shared execution context for generation operations.
///
/// # Example
///
/// ```
/// use ideaforge::ForgeCtx;
///
/// let ctx = ForgeCtx::builder("https://api.groq.com/openai")
///     .groq_with_key("gsk_...")
///     .var("audience", "students")
///     .build();
/// ```
pub struct ForgeCtx {
    /// HTTP client (cheap to clone -- uses `Arc` internally).
    pub client: Client,
    /// Base URL for the completion service.
    pub base_url: String,
    /// Completion provider. Default: [`GroqProvider`] without a key.
    pub provider: Arc<dyn Provider>,
    /// Transport retry configuration. Default: [`BackoffConfig::standard()`].
    pub backoff: BackoffConfig,
    /// Template variables substituted into prompt `{key}` placeholders.
    pub vars: HashMap<String, String>,
    /// Optional cancellation flag; operations check it between steps.
    pub cancellation: Option<Arc<AtomicBool>>,
    /// Optional event handler for lifecycle events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ForgeCtx {
    /// Create a new builder.
    pub fn builder(base_url: impl Into<String>) -> ForgeCtxBuilder {
        ForgeCtxBuilder {
            client: None,
            base_url: base_url.into(),
            provider: None,
            backoff: None,
            vars: HashMap::new(),
            cancellation: None,
            event_handler: None,
            timeout: None,
        }
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }

    /// Return an error if cancellation has been requested.
    pub fn check_cancelled(&self) -> crate::error::Result<()> {
        if self.is_cancelled() {
            return Err(crate::ForgeError::Cancelled);
        }
        Ok(())
    }

    /// Get a reference to the cancellation AtomicBool, if set.
    pub fn cancel_flag(&self) -> Option<&AtomicBool> {
        self.cancellation.as_deref()
    }
}

impl std::fmt::Debug for ForgeCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeCtx")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider.name())
            .field("backoff", &self.backoff)
            .field("vars_count", &self.vars.len())
            .field("has_cancellation", &self.cancellation.is_some())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ForgeCtx`].
pub struct ForgeCtxBuilder {
    client: Option<Client>,
    base_url: String,
    provider: Option<Arc<dyn Provider>>,
    backoff: Option<BackoffConfig>,
    vars: HashMap<String, String>,
    cancellation: Option<Arc<AtomicBool>>,
    event_handler: Option<Arc<dyn EventHandler>>,
    timeout: Option<Duration>,
}

impl ForgeCtxBuilder {
    /// Set the HTTP client. If not set, a default client is created.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the completion provider.
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use the Groq-compatible provider with API key authentication.
    pub fn groq_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.provider = Some(Arc::new(GroqProvider::new().with_api_key(api_key)));
        self
    }

    /// Use the Gemini provider with API key authentication.
    pub fn gemini_with_key(mut self, api_key: impl Into<String>) -> Self {
        self.provider = Some(Arc::new(GeminiProvider::new().with_api_key(api_key)));
        self
    }

    /// Set the transport retry configuration.
    /// Default: [`BackoffConfig::standard()`].
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = Some(config);
        self
    }

    /// Set all template variables at once.
    pub fn vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = vars;
        self
    }

    /// Insert a single template variable.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the cancellation flag.
    pub fn cancellation(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancellation = cancel;
        self
    }

    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Set the request timeout. Default: 60 seconds.
    ///
    /// Ignored when a custom `Client` is provided via `.client()` — the
    /// custom client's own timeout applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> ForgeCtx {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(60));
        let client = self.client.unwrap_or_else(|| {
            Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client")
        });
        ForgeCtx {
            client,
            base_url: normalize_base_url(&self.base_url),
            provider: self.provider.unwrap_or_else(|| Arc::new(GroqProvider::new())),
            backoff: self.backoff.unwrap_or_else(BackoffConfig::standard),
            vars: self.vars,
            cancellation: self.cancellation,
            event_handler: self.event_handler,
        }
    }
}

/// Strip known provider path suffixes from a base URL.
/// This prevents double-pathing when providers append their own paths.
/// e.g., "https://api.groq.com/openai/v1" -> "https://api.groq.com/openai"
/// e.g., "https://generativelanguage.googleapis.com/v1beta" ->
///       "https://generativelanguage.googleapis.com"
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    // Longest suffixes first
    for suffix in &["/v1/chat/completions", "/v1/chat", "/v1beta", "/v1"] {
        if let Some(stripped) = trimmed.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_v1() {
        assert_eq!(
            normalize_base_url("https://api.groq.com/openai/v1"),
            "https://api.groq.com/openai"
        );
        assert_eq!(
            normalize_base_url("https://api.groq.com/openai/v1/"),
            "https://api.groq.com/openai"
        );
    }

    #[test]
    fn normalize_strips_v1beta() {
        assert_eq!(
            normalize_base_url("https://generativelanguage.googleapis.com/v1beta"),
            "https://generativelanguage.googleapis.com"
        );
    }

    #[test]
    fn normalize_strips_full_chat_path() {
        assert_eq!(
            normalize_base_url("https://api.groq.com/openai/v1/chat/completions"),
            "https://api.groq.com/openai"
        );
    }

    #[test]
    fn normalize_preserves_clean_urls() {
        assert_eq!(
            normalize_base_url("https://api.groq.com/openai"),
            "https://api.groq.com/openai"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080/"),
            "http://localhost:8080"
        );
    }

    #[test]
    fn default_provider_is_groq() {
        let ctx = ForgeCtx::builder("https://api.groq.com/openai").build();
        assert_eq!(ctx.provider.name(), "groq");
    }

    #[test]
    fn gemini_builder_swaps_provider() {
        let ctx = ForgeCtx::builder("https://generativelanguage.googleapis.com")
            .gemini_with_key("AIza-test")
            .build();
        assert_eq!(ctx.provider.name(), "gemini");
    }

    #[test]
    fn cancellation_flag_roundtrip() {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = ForgeCtx::builder("http://localhost:8080")
            .cancellation(Some(Arc::clone(&flag)))
            .build();
        assert!(!ctx.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(ctx.is_cancelled());
        assert!(ctx.check_cancelled().is_err());
    }
}
