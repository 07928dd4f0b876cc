//! # IdeaForge
//!
//! Project blueprint and idea generation over LLM providers.
//!
//! This crate provides the pieces of a blueprint-generation service:
//! **prompt templating**, **provider calls** with transport backoff,
//! **resilient JSON extraction** from messy model output, and **typed
//! domain defaults** for graceful degradation.
//!
//! ## Core Concepts
//!
//! - **[`extract`](extract::extract)** — the heart of the crate: recover a
//!   JSON value from raw model text that may be fenced, truncated, or
//!   malformed, with an ordered fallback chain and two explicit failure
//!   cases.
//! - **[`Forge`]** — the generation engine: renders prompts, calls the
//!   provider, extracts, and degrades to safe defaults on failure.
//! - **[`ForgeCtx`]** — shared execution context (HTTP client, provider,
//!   endpoint, template vars, cancellation, optional event handler).
//! - **[`Provider`](provider::Provider)** — abstraction over completion
//!   services ([`GroqProvider`], [`GeminiProvider`], [`MockProvider`]).
//! - **[`TtlCache`]** — explicit time-to-live cache for generation results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ideaforge::{Forge, ForgeCtx, IdeaRequest, BlueprintRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = ForgeCtx::builder("https://api.groq.com/openai")
//!         .groq_with_key(std::env::var("GROQ_API_KEY")?)
//!         .build();
//!
//!     let forge = Forge::new("llama-3.3-70b-versatile");
//!
//!     let ideas = forge.ideas(&ctx, &IdeaRequest::new("home automation")).await?;
//!     for idea in &ideas.ideas {
//!         println!("[{}] {} — {}", idea.difficulty.as_str(), idea.title, idea.description);
//!     }
//!
//!     if let Some(first) = ideas.ideas.first() {
//!         let bp = forge.blueprint(&ctx, &BlueprintRequest::new(first.title.clone())).await?;
//!         println!("{}", bp.blueprint.summary);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Extraction only
//!
//! The extractor is a pure function and usable standalone:
//!
//! ```
//! use ideaforge::extract::extract;
//!
//! let value = extract(r#"Sure! {"a": 1, "b": [1, 2, 3"#).unwrap();
//! assert_eq!(value["b"], serde_json::json!([1, 2, 3]));
//! ```

pub mod cache;
pub mod ctx;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod extract;
pub mod forge;
pub mod prompt;
pub mod provider;
pub mod types;

pub use cache::TtlCache;
pub use ctx::{ForgeCtx, ForgeCtxBuilder};
pub use diagnostics::GenerationDiagnostics;
pub use error::{ForgeError, Result};
pub use extract::{ExtractError, Strategy};
pub use forge::{
    BlueprintOutput, BlueprintRequest, Forge, IdeaRequest, IdeasOutput, ModelConfig, RetryConfig,
};
pub use provider::{BackoffConfig, GeminiProvider, GroqProvider, MockProvider};
pub use types::{Blueprint, Difficulty, ProjectIdea};
