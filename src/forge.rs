//! Generation operations — the primary execution unit.
//!
//! [`Forge`] renders prompts, dispatches the provider call, recovers JSON
//! from the raw response, and applies the degrade-to-default policy: an
//! unrecoverable response produces an empty idea list or a placeholder
//! blueprint with the failure recorded in diagnostics, never a hard error.
//! Transport failures (after backoff) still surface as `Err`.

use crate::{
    cache::TtlCache,
    ctx::ForgeCtx,
    diagnostics::GenerationDiagnostics,
    error::Result,
    events::{emit, Event},
    extract::{extract_with_strategy, ExtractError, Strategy},
    prompt,
    provider::{self, ChatMessage, CompletionRequest, CompletionResponse, Role},
    types::{Blueprint, ProjectIdea},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Sampling configuration for completion requests.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Request JSON-formatted output from the model.
    pub json_mode: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            json_mode: false,
        }
    }
}

impl ModelConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }
}

/// Type alias for the semantic validator function used in [`RetryConfig`].
pub type ValidatorFn =
    Arc<dyn Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync>;

/// Configuration for regeneration on extraction or validation failure.
///
/// When extraction fails (or the validator rejects the value) and a
/// `RetryConfig` is present, the operation re-calls the model with a
/// correction message containing the bad output and the failure reason.
///
/// # Example
///
/// ```
/// use ideaforge::forge::RetryConfig;
///
/// // Retry up to 2 times on extraction failure
/// let config = RetryConfig::new(2);
///
/// // Additionally require specific keys in the result
/// let config = RetryConfig::new(2).requiring_keys(&["summary"]);
/// ```
#[derive(Clone)]
pub struct RetryConfig {
    /// Maximum retry attempts (not counting the initial call). Range: 1-5.
    pub max_retries: u32,

    /// Optional validator run after extraction succeeds, for semantic
    /// checks beyond structure. Receives `(raw_text, value)`.
    pub validator: Option<ValidatorFn>,

    /// Lower temperature on each retry. Default: `true`.
    /// Drops by 0.2 per retry (floored at 0.0).
    pub cool_down: bool,
}

impl RetryConfig {
    /// Retry up to N times on extraction failure.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries: max_retries.min(5),
            validator: None,
            cool_down: true,
        }
    }

    /// Retry with an additional semantic validator.
    pub fn with_validator(
        mut self,
        f: impl Fn(&str, &Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    /// Shorthand: validate that specific JSON keys exist and are non-null.
    pub fn requiring_keys(self, keys: &[&str]) -> Self {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.with_validator(move |_raw, value| {
            for key in &keys {
                match value.get(key.as_str()) {
                    None => return Err(format!("missing required key: '{}'", key)),
                    Some(v) if v.is_null() => {
                        return Err(format!("required key '{}' is null", key))
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }

    /// Disable temperature cool-down.
    pub fn no_cool_down(mut self) -> Self {
        self.cool_down = false;
        self
    }
}

impl std::fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("has_validator", &self.validator.is_some())
            .field("cool_down", &self.cool_down)
            .finish()
    }
}

/// Request for a batch of project ideas.
#[derive(Debug, Clone)]
pub struct IdeaRequest {
    /// Topic or interest area to ideate on.
    pub topic: String,
    /// How many ideas to ask for.
    pub count: u32,
}

impl IdeaRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            count: 3,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// Request for a blueprint of one chosen idea.
#[derive(Debug, Clone)]
pub struct BlueprintRequest {
    /// The idea to expand into a blueprint.
    pub idea: String,
}

impl BlueprintRequest {
    pub fn new(idea: impl Into<String>) -> Self {
        Self { idea: idea.into() }
    }
}

/// Output of [`Forge::ideas`].
#[derive(Debug, Clone)]
pub struct IdeasOutput {
    /// Parsed ideas; empty when the response could not be recovered.
    pub ideas: Vec<ProjectIdea>,
    /// Raw response text from the model (before extraction).
    pub raw_response: String,
    /// What happened along the way.
    pub diagnostics: GenerationDiagnostics,
}

/// Output of [`Forge::blueprint`].
#[derive(Debug, Clone)]
pub struct BlueprintOutput {
    /// Parsed blueprint; a placeholder when the response could not be
    /// recovered.
    pub blueprint: Blueprint,
    /// Raw response text from the model (before extraction).
    pub raw_response: String,
    /// What happened along the way.
    pub diagnostics: GenerationDiagnostics,
}

/// The generation engine: prompt rendering, provider dispatch, extraction,
/// and default-filling.
///
/// # Example
///
/// ```no_run
/// use ideaforge::{Forge, ForgeCtx, IdeaRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let ctx = ForgeCtx::builder("https://api.groq.com/openai")
///         .groq_with_key(std::env::var("GROQ_API_KEY")?)
///         .build();
///
///     let forge = Forge::new("llama-3.3-70b-versatile");
///     let output = forge.ideas(&ctx, &IdeaRequest::new("home automation")).await?;
///     for idea in &output.ideas {
///         println!("{}: {}", idea.id, idea.title);
///     }
///     Ok(())
/// }
/// ```
pub struct Forge {
    /// Model identifier passed to the provider.
    model: String,
    /// Sampling configuration.
    config: ModelConfig,
    /// Optional system prompt template ({key} vars only).
    system_template: Option<String>,
    /// Optional regeneration-on-failure configuration.
    retry: Option<RetryConfig>,
    /// Optional raw-response cache keyed by rendered prompt.
    cache: Option<Arc<TtlCache<String, String>>>,
}

impl Forge {
    /// Create a generation engine for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            config: ModelConfig::default(),
            system_template: None,
            retry: None,
            cache: None,
        }
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the sampling configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Returns the retry configuration, if any.
    pub fn retry(&self) -> Option<&RetryConfig> {
        self.retry.as_ref()
    }

    /// Set the sampling configuration.
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a system prompt template (supports `{key}` context vars).
    pub fn with_system(mut self, template: impl Into<String>) -> Self {
        self.system_template = Some(template.into());
        self
    }

    /// Enable regeneration on extraction/validation failure.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Cache raw responses keyed by rendered prompt.
    pub fn with_cache(mut self, cache: Arc<TtlCache<String, String>>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Generate project ideas for a topic.
    ///
    /// Extraction failure degrades to an empty list with
    /// `diagnostics.defaulted` set; transport failure is an `Err`.
    pub async fn ideas(&self, ctx: &ForgeCtx, request: &IdeaRequest) -> Result<IdeasOutput> {
        let template = prompt::ideas_template(request.count);
        let rendered = prompt::render(&template, &request.topic, &ctx.vars);

        let (value, raw_response, mut diagnostics) =
            self.generate_value(ctx, "ideas", &rendered).await?;

        let ideas = match value.as_ref().and_then(coerce_idea_array) {
            Some(mut ideas) => {
                ProjectIdea::fill_missing_ids(&mut ideas);
                ideas
            }
            None => {
                if diagnostics.extract_error.is_none() {
                    diagnostics.extract_error =
                        Some("extracted value is not an idea array".to_string());
                }
                diagnostics.defaulted = true;
                Vec::new()
            }
        };

        Ok(IdeasOutput {
            ideas,
            raw_response,
            diagnostics,
        })
    }

    /// Generate a blueprint for a chosen idea.
    ///
    /// Extraction failure degrades to [`Blueprint::placeholder`] with
    /// `diagnostics.defaulted` set; transport failure is an `Err`.
    pub async fn blueprint(
        &self,
        ctx: &ForgeCtx,
        request: &BlueprintRequest,
    ) -> Result<BlueprintOutput> {
        let rendered = prompt::render(prompt::blueprint_template(), &request.idea, &ctx.vars);

        let (value, raw_response, mut diagnostics) =
            self.generate_value(ctx, "blueprint", &rendered).await?;

        let blueprint = match value {
            Some(v) => match serde_json::from_value::<Blueprint>(v) {
                Ok(bp) => bp,
                Err(e) => {
                    diagnostics.extract_error = Some(e.to_string());
                    diagnostics.defaulted = true;
                    Blueprint::placeholder(&request.idea)
                }
            },
            None => Blueprint::placeholder(&request.idea),
        };

        Ok(BlueprintOutput {
            blueprint,
            raw_response,
            diagnostics,
        })
    }

    /// Run the shared generation path: cache lookup, provider call with
    /// transport retry, extraction, optional semantic retry.
    ///
    /// Returns `(value, raw_response, diagnostics)` where `value` is `None`
    /// when every recovery strategy failed — the caller substitutes its
    /// default.
    async fn generate_value(
        &self,
        ctx: &ForgeCtx,
        operation: &'static str,
        rendered_prompt: &str,
    ) -> Result<(Option<Value>, String, GenerationDiagnostics)> {
        ctx.check_cancelled()?;

        emit(
            &ctx.event_handler,
            Event::GenerationStart {
                operation,
                model: self.model.clone(),
            },
        );

        let mut diag = GenerationDiagnostics::default();

        if let Some(ref cache) = self.cache {
            if let Some(raw) = cache.get(&rendered_prompt.to_string()) {
                diag.cache_hit = true;
                let outcome = extract_with_strategy(&raw);
                return Ok(self.finish(ctx, operation, outcome, raw, diag));
            }
        }

        let system = self
            .system_template
            .as_ref()
            .map(|t| render_vars(t, &ctx.vars));

        let request = CompletionRequest {
            model: self.model.clone(),
            system_prompt: system.clone(),
            prompt: rendered_prompt.to_string(),
            messages: Vec::new(),
            config: self.config.clone(),
        };

        let (response, transport_retries, backoff_total_ms) =
            match self.call_provider(ctx, operation, &request).await {
                Ok(ok) => ok,
                Err(e) => {
                    emit(
                        &ctx.event_handler,
                        Event::GenerationEnd {
                            operation,
                            ok: false,
                        },
                    );
                    return Err(e);
                }
            };
        diag.transport_retries = transport_retries;
        diag.backoff_total_ms = backoff_total_ms;

        let mut raw = response.text;
        let mut outcome = extract_with_strategy(&raw);

        if let Some(ref retry_config) = self.retry {
            let mut reason = retry_reason(&outcome, retry_config, &raw);

            if reason.is_some() {
                let mut messages = vec![ChatMessage {
                    role: Role::User,
                    content: rendered_prompt.to_string(),
                }];
                let mut temp_offset = 0.0f64;

                for attempt in 1..=retry_config.max_retries {
                    ctx.check_cancelled()?;

                    let why = reason.take().unwrap_or_default();
                    emit(
                        &ctx.event_handler,
                        Event::RetryStart {
                            operation,
                            attempt,
                            reason: why.clone(),
                        },
                    );

                    messages.push(ChatMessage {
                        role: Role::Assistant,
                        content: raw.clone(),
                    });
                    messages.push(ChatMessage {
                        role: Role::User,
                        content: format!(
                            "Your previous response was invalid: {}. Respond again with only the corrected JSON.",
                            why
                        ),
                    });

                    if retry_config.cool_down {
                        temp_offset += 0.2;
                    }
                    let mut config = self.config.clone();
                    config.temperature = (config.temperature - temp_offset).max(0.0);

                    let retry_request = CompletionRequest {
                        model: self.model.clone(),
                        system_prompt: system.clone(),
                        prompt: rendered_prompt.to_string(),
                        messages: messages.clone(),
                        config,
                    };

                    let (response, tr, bt) =
                        match self.call_provider(ctx, operation, &retry_request).await {
                            Ok(ok) => ok,
                            Err(e) => {
                                emit(
                                    &ctx.event_handler,
                                    Event::RetryEnd {
                                        operation,
                                        attempts: attempt,
                                        success: false,
                                    },
                                );
                                emit(
                                    &ctx.event_handler,
                                    Event::GenerationEnd {
                                        operation,
                                        ok: false,
                                    },
                                );
                                return Err(e);
                            }
                        };

                    diag.retry_attempts = attempt;
                    diag.transport_retries = tr;
                    diag.backoff_total_ms = bt;

                    raw = response.text;
                    outcome = extract_with_strategy(&raw);
                    reason = retry_reason(&outcome, retry_config, &raw);

                    if reason.is_none() {
                        emit(
                            &ctx.event_handler,
                            Event::RetryEnd {
                                operation,
                                attempts: attempt,
                                success: true,
                            },
                        );
                        break;
                    }

                    if attempt == retry_config.max_retries {
                        emit(
                            &ctx.event_handler,
                            Event::RetryEnd {
                                operation,
                                attempts: attempt,
                                success: false,
                            },
                        );
                    }
                }
            }
        }

        if outcome.is_ok() {
            if let Some(ref cache) = self.cache {
                cache.insert(rendered_prompt.to_string(), raw.clone());
            }
        }

        Ok(self.finish(ctx, operation, outcome, raw, diag))
    }

    /// Fold the extraction outcome into the diagnostics and emit the end
    /// event.
    fn finish(
        &self,
        ctx: &ForgeCtx,
        operation: &'static str,
        outcome: std::result::Result<(Value, Strategy), ExtractError>,
        raw: String,
        mut diag: GenerationDiagnostics,
    ) -> (Option<Value>, String, GenerationDiagnostics) {
        let value = match outcome {
            Ok((value, strategy)) => {
                diag.strategy = Some(strategy.name());
                Some(value)
            }
            Err(e) => {
                diag.extract_error = Some(e.to_string());
                diag.defaulted = true;
                None
            }
        };

        emit(
            &ctx.event_handler,
            Event::GenerationEnd {
                operation,
                ok: value.is_some(),
            },
        );

        (value, raw, diag)
    }

    /// Execute the provider call with transport retry, tracking retry
    /// counts for diagnostics.
    async fn call_provider(
        &self,
        ctx: &ForgeCtx,
        operation: &'static str,
        request: &CompletionRequest,
    ) -> Result<(CompletionResponse, u32, u64)> {
        let mut transport_retries: u32 = 0;
        let mut backoff_total_ms: u64 = 0;
        let event_handler = ctx.event_handler.clone();

        let mut on_retry = |attempt: u32, delay: std::time::Duration, reason: &str| {
            transport_retries = attempt;
            backoff_total_ms += delay.as_millis() as u64;
            emit(
                &event_handler,
                Event::TransportRetry {
                    operation,
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                    reason: reason.to_string(),
                },
            );
        };

        let response = provider::with_backoff(
            &ctx.provider,
            &ctx.client,
            &ctx.base_url,
            request,
            &ctx.backoff,
            ctx.cancel_flag(),
            Some(&mut on_retry),
        )
        .await?;

        Ok((response, transport_retries, backoff_total_ms))
    }
}

/// Substitute `{key}` context vars only (no `{input}`).
fn render_vars(template: &str, vars: &HashMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

/// Why a retry is needed, or `None` when the outcome is acceptable.
fn retry_reason(
    outcome: &std::result::Result<(Value, Strategy), ExtractError>,
    retry_config: &RetryConfig,
    raw: &str,
) -> Option<String> {
    match outcome {
        Err(e) => Some(e.to_string()),
        Ok((value, _)) => {
            if let Some(ref validator) = retry_config.validator {
                if let Err(reason) = validator(raw, value) {
                    return Some(reason);
                }
            }
            None
        }
    }
}

/// Coerce the extracted value into an idea array.
///
/// Accepts a bare array or an object wrapping one under `"ideas"`.
/// Elements that are not objects are skipped rather than failing the batch.
fn coerce_idea_array(value: &Value) -> Option<Vec<ProjectIdea>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.get("ideas")?.as_array()?,
        _ => return None,
    };

    Some(
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
    )
}
