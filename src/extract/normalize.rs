//! Newline normalization for JSON string values.

/// Escape literal newlines that most likely belong inside string values.
///
/// Generators frequently emit a raw newline where strict JSON requires the
/// two-character `\n` escape. A newline followed by optional whitespace and
/// then a structural character (`"`, `{`, `}`, `[`, `]`) is treated as
/// inter-token formatting and kept; every other newline is escaped.
pub(crate) fn escape_bare_newlines(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 8);

    for (i, &ch) in chars.iter().enumerate() {
        if ch != '\n' {
            result.push(ch);
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }

        match chars.get(j) {
            Some('"') | Some('{') | Some('}') | Some('[') | Some(']') => result.push('\n'),
            _ => result.push_str("\\n"),
        }
    }

    result
}
