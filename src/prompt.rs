//! Prompt templating and the generation prompt builders.

use std::collections::HashMap;

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders in the template with values from `vars`.
/// The special `{input}` placeholder is replaced by the `input` parameter.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}` —
/// required for JSON examples embedded in templates.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use ideaforge::prompt::render;
///
/// let mut vars = HashMap::new();
/// vars.insert("audience".to_string(), "students".to_string());
/// let out = render("Ideas about {input} for {audience}: {{\"k\": 1}}", "rust", &vars);
/// assert_eq!(out, r#"Ideas about rust for students: {"k": 1}"#);
/// ```
pub fn render(template: &str, input: &str, vars: &HashMap<String, String>) -> String {
    // Pass 1: protect escaped braces
    let mut rendered = template.replace("{{", ESCAPE_SENTINEL);
    rendered = rendered.replace("}}", ESCAPE_SENTINEL_CLOSE);

    // Pass 2: substitute placeholders
    rendered = rendered.replace("{input}", input);
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }

    // Pass 3: restore escaped braces
    rendered = rendered.replace(ESCAPE_SENTINEL, "{");
    rendered = rendered.replace(ESCAPE_SENTINEL_CLOSE, "}");
    rendered
}

/// Template for the idea-generation prompt. `{input}` is the topic.
///
/// Instructs the model to answer with a fenced JSON array of idea objects
/// in the shape [`ProjectIdea`](crate::types::ProjectIdea) expects.
pub fn ideas_template(count: u32) -> String {
    format!(
        "You are a project mentor. Suggest exactly {count} software project ideas \
about: {{input}}.\n\n\
Respond with ONLY a JSON array inside a ```json code fence. Each element:\n\
{{{{\"id\": \"short-slug\", \"title\": \"...\", \"description\": \"2-3 sentences\", \
\"difficulty\": \"beginner|intermediate|advanced\", \"tech_stack\": [\"...\"]}}}}\n\n\
No prose before or after the fence.",
        count = count
    )
}

/// Template for the blueprint-generation prompt. `{input}` is the chosen idea.
///
/// Instructs the model to answer with a fenced JSON blueprint document
/// carrying the sections [`Blueprint`](crate::types::Blueprint) surfaces.
pub fn blueprint_template() -> &'static str {
    "You are a software architect. Produce a complete project blueprint for: {input}.\n\n\
Respond with ONLY a JSON object inside a ```json code fence, with fields:\n\
{{\"summary\": \"one paragraph\", \
\"costEstimate\": {{\"currency\": \"USD\", \"total\": 0, \"breakdown\": []}}, \
\"scores\": {{\"feasibility\": 0, \"novelty\": 0, \"marketFit\": 0}}, \
\"mockUI\": {{\"screens\": []}}, \
\"pitchDeck\": {{\"slides\": []}}}}\n\n\
Omit a field entirely if you cannot fill it. No prose before or after the fence."
}

/// Wrap text in a labeled section for structured prompts.
pub fn section(label: &str, content: &str) -> String {
    format!("## {}\n{}", label, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_basic() {
        let result = render("Hello {name}, process {input}", "data", &vars(&[("name", "Ada")]));
        assert_eq!(result, "Hello Ada, process data");
    }

    #[test]
    fn render_no_placeholders() {
        let result = render("static prompt", "ignored", &vars(&[]));
        assert_eq!(result, "static prompt");
    }

    #[test]
    fn render_escaped_braces() {
        let result = render("JSON: {{\"key\": \"val\"}}", "x", &vars(&[]));
        assert_eq!(result, r#"JSON: {"key": "val"}"#);
    }

    #[test]
    fn render_nested_escaped_braces() {
        let result = render("{{\"result\": {{\"value\": 42}}}}", "x", &vars(&[]));
        assert_eq!(result, r#"{"result": {"value": 42}}"#);
    }

    #[test]
    fn ideas_template_embeds_count_and_keeps_input() {
        let t = ideas_template(5);
        assert!(t.contains("exactly 5"));
        assert!(t.contains("{input}"));

        let rendered = render(&t, "home automation", &vars(&[]));
        assert!(rendered.contains("home automation"));
        assert!(rendered.contains(r#""difficulty": "beginner|intermediate|advanced""#));
        assert!(!rendered.contains("{input}"));
    }

    #[test]
    fn blueprint_template_renders_schema_braces() {
        let rendered = render(blueprint_template(), "habit tracker", &vars(&[]));
        assert!(rendered.contains("habit tracker"));
        assert!(rendered.contains(r#"{"summary""#));
        assert!(rendered.contains("costEstimate"));
        assert!(rendered.contains("pitchDeck"));
    }

    #[test]
    fn section_format() {
        assert_eq!(section("Context", "facts"), "## Context\nfacts");
    }
}
