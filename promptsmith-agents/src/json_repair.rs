//! Lenient parsing of structured model output.
//!
//! Models are asked for a JSON object but frequently wrap it in prose, use
//! typographic quotes, or emit JavaScript-style literals. [`parse_lenient`]
//! tries a strict parse first, then a single retry after [`repair`].

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;

use crate::error::{AgentError, Result};

static SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([\[{:,]\s*)'([^'\n]*)'"#).expect("valid regex"));
static TRAILING_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));
static BARE_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_\-]*)(\s*):").expect("valid regex")
});
static BARE_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(:\s*)([A-Za-z][^,"{}\[\]\n]*?)(\s*)([,}\]\n])"#).expect("valid regex")
});

/// Parse `raw` as `T`, retrying once on the repaired text.
pub fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str::<T>(raw.trim()).or_else(|first| {
        serde_json::from_str::<T>(&repair(raw)).map_err(|second| {
            AgentError::malformed(format!(
                "structured output unparseable ({first}); after repair: {second}"
            ))
        })
    })
}

/// Apply the fixed repair sequence to model output.
pub fn repair(raw: &str) -> String {
    let text = extract_object_span(raw);
    let text = normalize_quotes(text);
    let text = strip_trailing_separators(&text);
    let text = quote_bare_keys(&text);
    quote_bare_values(&text)
}

/// Outermost `{ ... }` span, or the whole input when there is none.
pub fn extract_object_span(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw.trim(),
    }
}

pub fn normalize_quotes(text: &str) -> String {
    let straightened: String = text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect();
    replace_outside_strings(&SINGLE_QUOTED, &straightened, |caps| {
        format!("{}\"{}\"", &caps[1], &caps[2])
    })
}

pub fn strip_trailing_separators(text: &str) -> String {
    replace_outside_strings(&TRAILING_SEPARATOR, text, |caps| caps[1].to_string())
}

pub fn quote_bare_keys(text: &str) -> String {
    replace_outside_strings(&BARE_KEY, text, |caps| {
        format!("{}\"{}\"{}:", &caps[1], &caps[2], &caps[3])
    })
}

pub fn quote_bare_values(text: &str) -> String {
    replace_outside_strings(&BARE_VALUE, text, |caps| {
        let value = &caps[2];
        if matches!(value, "true" | "false" | "null") {
            caps[0].to_string()
        } else {
            format!("{}\"{}\"{}{}", &caps[1], value, &caps[3], &caps[4])
        }
    })
}

/// Rewrite matches of `pattern`, leaving those that start inside a
/// double-quoted literal untouched.
fn replace_outside_strings(
    pattern: &Regex,
    text: &str,
    rewrite: impl Fn(&Captures) -> String,
) -> String {
    let spans = string_spans(text);
    pattern
        .replace_all(text, |caps: &Captures| {
            let at = caps.get(0).map_or(0, |m| m.start());
            if spans.iter().any(|span| span.contains(&at)) {
                caps[0].to_string()
            } else {
                rewrite(caps)
            }
        })
        .into_owned()
}

/// Byte ranges of double-quoted literals, quotes included.
fn string_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match (open, c) {
            (Some(_), _) if escaped => escaped = false,
            (Some(_), '\\') => escaped = true,
            (Some(start), '"') => {
                spans.push(start..i + 1);
                open = None;
            }
            (None, '"') => open = Some(i),
            _ => {}
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::agent_types::ContextFacts;

    #[test]
    fn strict_json_parses_without_repair() {
        let value: Value = parse_lenient(r#" {"a": 1} "#).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn extracts_object_from_prose() {
        assert_eq!(
            extract_object_span("Here you go: {\"a\": 1} hope it helps"),
            "{\"a\": 1}"
        );
        assert_eq!(extract_object_span("no braces"), "no braces");
    }

    #[test]
    fn individual_repairs() {
        assert_eq!(normalize_quotes("{“a”: ‘b’}"), r#"{"a": "b"}"#);
        assert_eq!(normalize_quotes(r#"{"a": "kid's toy"}"#), r#"{"a": "kid's toy"}"#);
        assert_eq!(strip_trailing_separators(r#"{"a": [1, 2,], }"#), r#"{"a": [1, 2]}"#);
        assert_eq!(quote_bare_keys(r#"{a: 1, b_c: 2}"#), r#"{"a": 1, "b_c": 2}"#);
        assert_eq!(
            quote_bare_values(r#"{"a": young adults, "b": true}"#),
            r#"{"a": "young adults", "b": true}"#
        );
    }

    #[test]
    fn repairs_javascript_style_facts() {
        let raw = "Sure! Here is the analysis:\n\
            {industry: 'automotive', objective: “sales”, audience: young drivers, \
            content_type: product, visual_style: neon, temporal_context: night, \
            trending_topics: ['ev', 'night drives'],}\nLet me know!";

        let facts: ContextFacts = parse_lenient(raw).unwrap();
        assert_eq!(facts.industry, "automotive");
        assert_eq!(facts.objective, "sales");
        assert_eq!(facts.audience, "young drivers");
        assert_eq!(facts.trending_topics, vec!["ev", "night drives"]);
        assert!(facts.missing_fields().is_empty());
    }

    #[test]
    fn repairs_leave_quoted_text_alone() {
        assert_eq!(
            normalize_quotes(r#"{"a": "rock, 'n' roll"}"#),
            r#"{"a": "rock, 'n' roll"}"#
        );
        assert_eq!(
            repair(r#"{visual_style: "bold: neon, retro", industry: food}"#),
            r#"{"visual_style": "bold: neon, retro", "industry": "food"}"#
        );
        assert_eq!(strip_trailing_separators(r#"{"a": "x, }",}"#), r#"{"a": "x, }"}"#);
    }

    #[test]
    fn colon_inside_a_value_survives_repair() {
        let raw = r#"{"content_type": "food", "industry": "food", "objective": "sales",
            "audience": "families", "visual_style": "style: neon, bold",
            "temporal_context": "morning", "trending_topics": ["brunch"],}"#;

        let facts: ContextFacts = parse_lenient(raw).unwrap();
        assert_eq!(facts.visual_style, "style: neon, bold");
        assert_eq!(facts.trending_topics, vec!["brunch"]);
    }

    #[test]
    fn unrecoverable_input_is_malformed() {
        let err = parse_lenient::<ContextFacts>("I cannot help with that.").unwrap_err();
        assert_eq!(err.category(), "malformed_response");
    }
}
