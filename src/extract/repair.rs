//! Backtracking repair for truncated JSON.
//!
//! Token-limited generations frequently stop mid-object. Recovery tries the
//! full candidate first, then progressively earlier cut points at structural
//! boundaries, synthesizing the closing delimiters the truncation ate.

use serde_json::Value;

/// Attempt to rebuild valid JSON from a truncated candidate.
///
/// Cut points are tried from the end of the string backward: first the full
/// candidate, then every position ending in `}`, `]`, or `"`. Each attempt
/// strips trailing commas, appends the missing closers in nesting order,
/// and validates the result. Returns the first reconstruction that parses,
/// or `None` when every cut point fails.
pub(crate) fn repair_truncated(s: &str) -> Option<String> {
    // The full candidate may end mid-token with no boundary character at
    // all; it is also the only attempt allowed to close an unclosed string.
    if let Some(fixed) = complete(s, true) {
        return Some(fixed);
    }

    let bytes = s.as_bytes();
    for end in (1..bytes.len()).rev() {
        match bytes[end - 1] {
            b'}' | b']' | b'"' => {
                if let Some(fixed) = complete(&s[..end], false) {
                    return Some(fixed);
                }
            }
            _ => {}
        }
    }

    None
}

/// Complete one cut-point attempt: balance delimiters, strip the trailing
/// comma, and validate. `close_open_string` permits synthesizing a closing
/// quote when the cut lands inside a string value.
fn complete(sub: &str, close_open_string: bool) -> Option<String> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for ch in sub.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if in_string {
            if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    let mut result = remove_trailing_commas(sub);

    if in_string {
        if !close_open_string {
            return None;
        }
        result.push('"');
    }

    // A comma left dangling at the truncation point is invalid once the
    // closers land after it.
    let trimmed = result.trim_end();
    if let Some(stripped) = trimmed.strip_suffix(',') {
        result = stripped.trim_end().to_string();
    }

    while let Some(closer) = stack.pop() {
        result.push(closer);
    }

    if serde_json::from_str::<Value>(&result).is_ok() {
        Some(result)
    } else {
        None
    }
}

/// Remove commas that sit directly before `}` or `]`, skipping string
/// content.
fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let mut result = String::with_capacity(s.len());
    let mut i = 0;
    let mut in_string = false;
    let mut escape_next = false;

    while i < len {
        let ch = chars[i];

        if escape_next {
            escape_next = false;
            result.push(ch);
            i += 1;
            continue;
        }

        if in_string {
            if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            result.push(ch);
            i += 1;
            continue;
        }

        if ch == '"' {
            in_string = true;
            result.push(ch);
            i += 1;
            continue;
        }

        if ch == ',' {
            let mut j = i + 1;
            while j < len && chars[j].is_whitespace() {
                j += 1;
            }
            if j < len && (chars[j] == '}' || chars[j] == ']') {
                i += 1;
                continue;
            }
        }

        result.push(ch);
        i += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Value {
        serde_json::from_str(&repair_truncated(s).unwrap()).unwrap()
    }

    #[test]
    fn truncated_object_with_open_array() {
        let v = parse(r#"{"a": 1, "b": [1, 2, 3"#);
        assert_eq!(v, serde_json::json!({"a": 1, "b": [1, 2, 3]}));
    }

    #[test]
    fn truncated_array() {
        let v = parse("[1, 2, 3");
        assert_eq!(v, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn truncated_after_comma() {
        let v = parse(r#"{"a": 1,"#);
        assert_eq!(v, serde_json::json!({"a": 1}));
    }

    #[test]
    fn trailing_comma_before_existing_closer() {
        let v = parse(r#"{"a": 1, "b": 2,}"#);
        assert_eq!(v, serde_json::json!({"a": 1, "b": 2}));
    }

    #[test]
    fn nested_trailing_commas() {
        let v = parse(r#"{"a": [1, 2,], "b": 3,}"#);
        assert_eq!(v, serde_json::json!({"a": [1, 2], "b": 3}));
    }

    #[test]
    fn truncated_inside_string() {
        let v = parse(r#"{"msg": "hello wor"#);
        assert_eq!(v["msg"], "hello wor");
    }

    #[test]
    fn truncated_mid_key_backtracks_to_last_value() {
        // The dangling key has no value; the cut point before it parses.
        let repaired = repair_truncated(r#"{"items": [{"a": 1}], "extra"#);
        assert!(repaired.is_some());
        let v: Value = serde_json::from_str(&repaired.unwrap()).unwrap();
        assert_eq!(v["items"][0]["a"], 1);
    }

    #[test]
    fn commas_inside_strings_survive() {
        let v = parse(r#"{"text": "a, b,", "n": 1,"#);
        assert_eq!(v["text"], "a, b,");
        assert_eq!(v["n"], 1);
    }

    #[test]
    fn already_balanced_passthrough() {
        let v = parse(r#"{"a": 1}"#);
        assert_eq!(v, serde_json::json!({"a": 1}));
    }

    #[test]
    fn hopeless_input_fails() {
        assert!(repair_truncated("{{{:").is_none());
        assert!(repair_truncated("").is_none());
    }
}
