//! # Resilient JSON Extraction
//!
//! Recovers a parsed JSON value from raw model output that may be wrapped
//! in markdown fences, truncated mid-stream, contain unescaped newlines,
//! or carry trailing commas.
//!
//! | Entry point | Use case |
//! |-------------|----------|
//! | [`extract`] | Untyped `serde_json::Value` recovery |
//! | [`extract_with_strategy`] | Same, reporting which strategy won |
//! | [`extract_as`] | Typed recovery at workflow edges |
//!
//! The fallback chain is ordered from highest to lowest confidence: fenced
//! block, direct candidate parse, newline escaping, backtracking truncation
//! repair. The extractor is pure and synchronous; it either returns a fully
//! parseable value or fails with one of the two [`ExtractError`] cases.

pub mod error;
mod fence;
mod json;
mod normalize;
mod repair;
mod scan;

pub use error::ExtractError;
pub use json::{extract, extract_as, extract_with_strategy, Strategy};
