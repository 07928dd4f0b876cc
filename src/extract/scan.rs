//! Bracket-scan candidate selection.

/// The syntactic kind of a candidate region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateKind {
    Object,
    Array,
}

/// Locate the candidate JSON region inside free-form text.
///
/// The earliest opening bracket decides the kind; on a tie the object
/// wins. The region ends at the last occurrence of the matching closer,
/// or runs to end-of-text when no closer exists (likely truncation).
/// Returns `None` when the text contains no opening bracket at all.
pub(crate) fn select_candidate(text: &str) -> Option<(&str, CandidateKind)> {
    let brace = text.find('{');
    let bracket = text.find('[');

    let (start, kind) = match (brace, bracket) {
        (Some(b), Some(k)) if b <= k => (b, CandidateKind::Object),
        (Some(_), Some(k)) => (k, CandidateKind::Array),
        (Some(b), None) => (b, CandidateKind::Object),
        (None, Some(k)) => (k, CandidateKind::Array),
        (None, None) => return None,
    };

    let close = match kind {
        CandidateKind::Object => '}',
        CandidateKind::Array => ']',
    };

    let candidate = match text[start..].rfind(close) {
        Some(offset) => &text[start..=start + offset],
        None => &text[start..],
    };

    Some((candidate, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_in_prose() {
        let input = r#"The result is {"a": 1} as requested."#;
        let (candidate, kind) = select_candidate(input).unwrap();
        assert_eq!(candidate, r#"{"a": 1}"#);
        assert_eq!(kind, CandidateKind::Object);
    }

    #[test]
    fn array_before_object_wins() {
        let input = r#"[1,2,3] and {"x":1}"#;
        let (candidate, kind) = select_candidate(input).unwrap();
        assert_eq!(kind, CandidateKind::Array);
        assert_eq!(candidate, "[1,2,3]");
    }

    #[test]
    fn object_before_array_wins() {
        let input = r#"{"x": [1]} trailing"#;
        let (candidate, kind) = select_candidate(input).unwrap();
        assert_eq!(kind, CandidateKind::Object);
        assert_eq!(candidate, r#"{"x": [1]}"#);
    }

    #[test]
    fn missing_closer_runs_to_end() {
        let input = r#"prefix {"a": [1, 2"#;
        let (candidate, kind) = select_candidate(input).unwrap();
        assert_eq!(kind, CandidateKind::Object);
        assert_eq!(candidate, r#"{"a": [1, 2"#);
    }

    #[test]
    fn last_closer_bounds_the_region() {
        let input = r#"{"a": 1} middle {"b": 2} end"#;
        let (candidate, _) = select_candidate(input).unwrap();
        assert_eq!(candidate, r#"{"a": 1} middle {"b": 2}"#);
    }

    #[test]
    fn no_brackets_yields_none() {
        assert!(select_candidate("no json here").is_none());
        assert!(select_candidate("").is_none());
    }
}
