//! Error type for the resilient JSON extractor.

/// Errors returned by the extraction entry points.
///
/// These are the only two outcomes besides success: either the text has no
/// bracket at all, or a candidate existed and every recovery strategy failed.
/// Individual parse errors along the chain are never propagated directly.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The text contains no `{` or `[` anywhere; nothing to recover.
    /// Empty and whitespace-only input fails here.
    #[error("no JSON candidate found in generated text")]
    NoCandidateFound,

    /// A candidate region was found, but direct parse, newline escaping,
    /// and backtracking truncation repair all failed.
    #[error("all repair attempts failed: {reason}")]
    AllRepairAttemptsFailed {
        /// The parse error from the direct attempt on the candidate.
        reason: String,
        /// A truncated copy of the candidate text (max 200 chars).
        candidate: String,
    },
}

/// Truncate a string to at most `max_len` bytes on a char boundary,
/// appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
