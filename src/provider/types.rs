//! Wire types for the two provider families and the response variant the
//! rest of the crate sees.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a model handed back.
///
/// Providers normally answer with text; when a well-formed body carries no
/// text field the raw JSON is kept so callers still get something readable.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Text(String),
    Raw(Value),
}

impl Completion {
    /// Textual content of the response; raw bodies are stringified.
    pub fn text(&self) -> String {
        match self {
            Completion::Text(t) => t.clone(),
            Completion::Raw(v) => v.to_string(),
        }
    }
}

// --- Groq (OpenAI-compatible chat completions) ---

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.message.content.as_deref())
    }
}

// --- Gemini generateContent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub contents: Vec<GeminiContent<'a>>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiContent<'a> {
    pub role: &'a str,
    pub parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiReply>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiReply {
    #[serde(default)]
    pub parts: Vec<GeminiReplyPart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiReplyPart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if it has any.
    pub fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if parts.iter().any(|p| p.text.is_some()) {
            Some(text)
        } else {
            None
        }
    }
}

// --- Error bodies (same envelope shape for both families) ---

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    /// Gemini: `RESOURCE_EXHAUSTED`, `INVALID_ARGUMENT`, ...
    pub status: Option<String>,
    /// Groq: `rate_limit_exceeded`, `invalid_api_key`, ...
    pub code: Option<Value>,
}

impl ErrorBody {
    /// Whether the provider attached a machine-readable status or code.
    pub fn is_coded(&self) -> bool {
        self.status.is_some() || self.code.is_some()
    }

    pub fn signals_rate_limit(&self) -> bool {
        let status = self.status.as_deref().unwrap_or_default();
        let code = self.code.as_ref().and_then(Value::as_str).unwrap_or_default();
        status.eq_ignore_ascii_case("RESOURCE_EXHAUSTED") || code.eq_ignore_ascii_case("rate_limit_exceeded")
    }
}
