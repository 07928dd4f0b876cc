//! Extraction entry points and the ordered fallback chain.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::extract::error::{truncate, ExtractError};
use crate::extract::fence::fenced_json;
use crate::extract::normalize::escape_bare_newlines;
use crate::extract::repair::repair_truncated;
use crate::extract::scan::select_candidate;

/// Which strategy in the fallback chain produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A `` ```json `` fenced block parsed directly.
    Fenced,
    /// The bracket-scan candidate parsed as-is.
    Direct,
    /// The candidate parsed after bare newlines were escaped.
    NewlineEscaped,
    /// The candidate parsed after backtracking truncation repair.
    TruncationRepaired,
}

impl Strategy {
    /// Stable name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Fenced => "fenced",
            Strategy::Direct => "direct",
            Strategy::NewlineEscaped => "newline_escaped",
            Strategy::TruncationRepaired => "truncation_repaired",
        }
    }
}

/// Extract a JSON value from free-form generated text.
///
/// Strategies (in order, each tried only if the prior produced no value):
/// 1. Parse the content of a `` ```json `` fenced block
/// 2. Bracket-scan the text for a candidate region and parse it as-is
/// 3. Escape bare newlines inside string values, re-parse
/// 4. Backtracking truncation repair (synthesize missing closers)
///
/// The call never panics and never surfaces a raw parse error: every
/// intermediate failure moves to the next strategy, and only total
/// exhaustion returns [`ExtractError`]. Partial values are never returned.
///
/// # Examples
///
/// ```
/// use ideaforge::extract::extract;
///
/// let text = "Sure! Here it is:\n```json\n{\"title\": \"CLI budgeter\"}\n```";
/// let value = extract(text).unwrap();
/// assert_eq!(value["title"], "CLI budgeter");
///
/// // Truncated mid-array — repaired
/// let value = extract(r#"{"a": 1, "b": [1, 2, 3"#).unwrap();
/// assert_eq!(value["b"], serde_json::json!([1, 2, 3]));
/// ```
pub fn extract(text: &str) -> Result<Value, ExtractError> {
    extract_with_strategy(text).map(|(value, _)| value)
}

/// Like [`extract`], additionally reporting which strategy succeeded.
pub fn extract_with_strategy(text: &str) -> Result<(Value, Strategy), ExtractError> {
    if let Some(content) = fenced_json(text) {
        // Only object/array shapes short-circuit here; a fence around a
        // scalar falls through to the bracket scan.
        if content.starts_with('{') || content.starts_with('[') {
            if let Ok(value) = serde_json::from_str(content) {
                return Ok((value, Strategy::Fenced));
            }
        }
    }

    let (candidate, _kind) = select_candidate(text).ok_or(ExtractError::NoCandidateFound)?;

    let direct_err = match serde_json::from_str(candidate) {
        Ok(value) => return Ok((value, Strategy::Direct)),
        Err(e) => e,
    };

    let normalized = escape_bare_newlines(candidate);
    if normalized != candidate {
        if let Ok(value) = serde_json::from_str(&normalized) {
            return Ok((value, Strategy::NewlineEscaped));
        }
    }

    if let Some(repaired) = repair_truncated(&normalized) {
        if let Ok(value) = serde_json::from_str(&repaired) {
            return Ok((value, Strategy::TruncationRepaired));
        }
    }

    Err(ExtractError::AllRepairAttemptsFailed {
        reason: direct_err.to_string(),
        candidate: truncate(candidate, 200),
    })
}

/// Extract and deserialize into a typed `T`.
///
/// Extraction failures surface as
/// [`ForgeError::Extraction`](crate::ForgeError::Extraction); a recovered
/// value that does not fit `T` surfaces as the underlying serde error.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> crate::error::Result<T> {
    let value = extract(text)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_object() {
        let (value, strategy) = extract_with_strategy(r#"{"a": 1}"#).unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert_eq!(strategy, Strategy::Direct);
    }

    #[test]
    fn object_in_prose() {
        let value = extract(r#"Here's the plan: {"phase": "mvp"} — enjoy!"#).unwrap();
        assert_eq!(value["phase"], "mvp");
    }

    #[test]
    fn fenced_block_wins_over_surrounding_brackets() {
        let input = "Noise {\"wrong\": true} first\n```json\n{\"right\": 1}\n```\nand [9, 9] after";
        let (value, strategy) = extract_with_strategy(input).unwrap();
        assert_eq!(value, json!({"right": 1}));
        assert_eq!(strategy, Strategy::Fenced);
    }

    #[test]
    fn broken_fence_falls_through_to_scan() {
        let input = "```json\nnot json\n```\nbut here: {\"ok\": true}";
        let value = extract(input).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn truncation_recovery() {
        let value = extract(r#"{"a": 1, "b": [1, 2, 3"#).unwrap();
        assert_eq!(value, json!({"a": 1, "b": [1, 2, 3]}));
    }

    #[test]
    fn trailing_comma_tolerated() {
        let value = extract(r#"{"a": 1, "b": 2,}"#).unwrap();
        assert_eq!(value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn unescaped_newline_tolerated() {
        let input = "{\"note\": \"line one\nline two\"}";
        let (value, strategy) = extract_with_strategy(input).unwrap();
        assert_eq!(value["note"], "line one\nline two");
        assert_eq!(strategy, Strategy::NewlineEscaped);
    }

    #[test]
    fn empty_input_fails_without_candidate() {
        assert!(matches!(extract(""), Err(ExtractError::NoCandidateFound)));
        assert!(matches!(
            extract("no json here"),
            Err(ExtractError::NoCandidateFound)
        ));
        assert!(matches!(
            extract("   \n\t  "),
            Err(ExtractError::NoCandidateFound)
        ));
    }

    #[test]
    fn array_bracket_first_yields_array() {
        let value = extract(r#"[1,2,3] and {"x":1}"#).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn unrepairable_candidate_fails_explicitly() {
        let result = extract("some { garbage : : that never parses");
        match result {
            Err(ExtractError::AllRepairAttemptsFailed { candidate, .. }) => {
                assert!(candidate.contains("garbage"));
            }
            other => panic!("expected AllRepairAttemptsFailed, got {:?}", other),
        }
    }

    #[test]
    fn success_is_idempotent_under_reserialization() {
        let inputs = [
            "```json\n{\"a\": [1, 2], \"b\": {\"c\": null}}\n```",
            r#"{"a": 1, "b": [1, 2, 3"#,
            "{\"note\": \"one\ntwo\"}",
            r#"prose [ {"k": "v"} , 2 ] prose"#,
        ];
        for input in inputs {
            let first = extract(input).unwrap();
            let reserialized = serde_json::to_string(&first).unwrap();
            let second = extract(&reserialized).unwrap();
            assert_eq!(first, second, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn strategy_names_are_stable() {
        assert_eq!(Strategy::Fenced.name(), "fenced");
        assert_eq!(Strategy::Direct.name(), "direct");
        assert_eq!(Strategy::NewlineEscaped.name(), "newline_escaped");
        assert_eq!(Strategy::TruncationRepaired.name(), "truncation_repaired");
    }

    #[test]
    fn extract_as_typed() {
        #[derive(Debug, serde::Deserialize)]
        struct Plan {
            phase: String,
        }
        let plan: Plan = extract_as(r#"The plan: {"phase": "beta"}"#).unwrap();
        assert_eq!(plan.phase, "beta");
    }

    #[test]
    fn extract_as_propagates_extraction_failure() {
        #[derive(Debug, serde::Deserialize)]
        struct Plan {
            _phase: String,
        }
        assert!(extract_as::<Plan>("nothing structured").is_err());
    }
}
