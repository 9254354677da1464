//! Base agent trait and shared text helpers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    agent_types::AgentResult,
    error::{AgentError, Result},
    inference::InferenceClient,
};

/// A single pipeline role backed by one inference call.
///
/// Agents are stateless: they hold only a handle to the shared inference
/// client. Whether a failed call is absorbed by a fallback or returned as an
/// error is each agent's own policy.
#[async_trait]
pub trait Agent: Send + Sync {
    type Input: Send + Sync;

    /// Agent name as recorded in the run log
    fn name(&self) -> &str;

    /// Process input and produce exactly one result
    async fn process(&self, input: &Self::Input) -> Result<AgentResult>;
}

/// Call the model and return cleaned prose, treating empty output as malformed.
pub(crate) async fn complete_text(
    client: &Arc<dyn InferenceClient>,
    prompt: &str,
    temperature: f32,
) -> Result<String> {
    let raw = client.complete(prompt, temperature).await?;
    clean_model_text(&raw).ok_or_else(|| AgentError::malformed("model returned empty text"))
}

const LABELS: [&str; 5] = [
    "final prompt:",
    "optimized prompt:",
    "enhanced prompt:",
    "prompt:",
    "output:",
];

/// Strip code fences, a leading label and wrapping quotes from model prose.
pub fn clean_model_text(raw: &str) -> Option<String> {
    let mut text = raw.trim();

    if let Some(inner) = text.strip_prefix("```") {
        let inner = inner.split_once('\n').map_or("", |(_, rest)| rest);
        text = inner.trim_end().trim_end_matches("```").trim();
    }

    let lowered = text.to_lowercase();
    if let Some(label) = LABELS.iter().find(|label| lowered.starts_with(*label)) {
        text = text[label.len()..].trim();
    }

    let text = text
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// `ceil(chars / 4)`, the token estimate used throughout the pipeline.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Trim `text` at a word boundary so its estimate fits within `max_tokens`.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let budget = max_tokens * 4;
    let head: String = text.chars().take(budget).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &head[..idx],
        _ => head.as_str(),
    };
    cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'))
        .to_string()
}
