//! Turning model text into job postings.

use serde_json::Value;

use crate::error::ChainError;
use crate::job::JobPosting;
use crate::provider::Completion;

/// Parses an extraction response.
///
/// A JSON array becomes the posting list (every element must be an object);
/// a single object becomes a one-element list. Code fences and chatter
/// around the outermost JSON value are tolerated.
pub fn parse_jobs(completion: Completion) -> Result<Vec<JobPosting>, ChainError> {
    let text = match completion {
        Completion::Text(t) => t,
        raw @ Completion::Raw(_) => {
            return Err(ChainError::Parse(format!(
                "provider returned no text content: {}",
                truncate_chars(&raw.text(), 200)
            )));
        }
    };

    let value = parse_json(&text)?;
    match value {
        Value::Array(items) => items.into_iter().map(JobPosting::from_value).collect(),
        Value::Object(_) => Ok(vec![JobPosting::from_value(value)?]),
        other => Err(ChainError::Parse(format!(
            "expected a JSON object or array, got {other}"
        ))),
    }
}

/// Parses the JSON value in `text`, falling back to its outermost
/// `[...]`/`{...}` block when the whole text is not valid JSON.
pub fn parse_json(text: &str) -> Result<Value, ChainError> {
    let cleaned = strip_json_fences(text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(v) => Ok(v),
        Err(first) => outermost_block(cleaned)
            .and_then(|block| serde_json::from_str::<Value>(block).ok())
            .ok_or_else(|| ChainError::Parse(format!("context too big or malformed model output: {first}"))),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim()),
        None => text,
    }
}

// From the first opening bracket to the last matching closer.
fn outermost_block(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    let closer = if text[start..].starts_with('[') { ']' } else { '}' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
