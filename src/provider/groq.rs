use reqwest::Client;
use reqwest::header::HeaderValue;
use serde_json::Value;
use tracing::debug;

use super::error::ProviderError;
use super::types::{ChatMessage, ChatRequest, ChatResponse, Completion};
use super::ModelHandle;

/// Client for Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    http: Client,
    // Full `/chat/completions` endpoint.
    url: String,
    // Marked sensitive so it is redacted from header debug output.
    auth: HeaderValue,
    model: String,
    temperature: f32,
}

impl GroqClient {
    /// Builds a client bound to one model.
    ///
    /// The key is first used as given; if it cannot form a bearer header it is
    /// retried once in its stripped form (surrounding whitespace and quotes,
    /// as left behind by some secret stores) before construction fails.
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: &str,
        model: &str,
        temperature: f32,
    ) -> Result<Self, ProviderError> {
        let auth = match bearer(api_key) {
            Ok(v) => v,
            Err(first) => {
                debug!("Groq key rejected as header ({first}), retrying stripped form");
                bearer(stripped_key(api_key)).map_err(|e| {
                    ProviderError::Construction(format!("Groq credential is not a valid header value: {e}"))
                })?
            }
        };

        Ok(Self {
            http,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            auth,
            model: model.to_string(),
            temperature,
        })
    }
}

fn bearer(key: &str) -> Result<HeaderValue, String> {
    // A blank key would build a valid header and only fail at the API.
    if key.trim().is_empty() {
        return Err("key is empty".to_string());
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| e.to_string())?;
    value.set_sensitive(true);
    Ok(value)
}

fn stripped_key(key: &str) -> &str {
    key.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

impl ModelHandle for GroqClient {
    async fn invoke(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let req = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, self.auth.clone())
            .json(&req)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let completion = match serde_json::from_value::<ChatResponse>(body.clone()) {
            Ok(parsed) => match parsed.first_text() {
                Some(text) => Completion::Text(text.to_string()),
                None => Completion::Raw(body),
            },
            Err(_) => Completion::Raw(body),
        };
        Ok(completion)
    }
}
