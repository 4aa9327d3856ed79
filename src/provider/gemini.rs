use reqwest::Client;
use serde_json::Value;

use super::error::ProviderError;
use super::types::{Completion, GeminiContent, GeminiPart, GenerateRequest, GenerateResponse, GenerationConfig};
use super::ModelHandle;

/// Client for Gemini's `models/{model}:generateContent` endpoint.
///
/// The key travels as the `key` query parameter, so there is only one way to
/// construct it.
pub struct GeminiClient {
    http: Client,
    // Model already baked in; the key is added per request.
    url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(http: Client, base_url: &str, api_key: &str, model: &str, temperature: f32) -> Self {
        Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            api_key: api_key.trim().to_string(),
            temperature,
        }
    }
}

impl ModelHandle for GeminiClient {
    async fn invoke(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let req = GenerateRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            // reqwest errors echo the URL, which carries the key.
            .map_err(|e| ProviderError::Network(e.without_url()))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.without_url().to_string()))?;

        let completion = match serde_json::from_value::<GenerateResponse>(body.clone()) {
            Ok(parsed) => match parsed.first_text() {
                Some(text) => Completion::Text(text),
                None => Completion::Raw(body),
            },
            Err(_) => Completion::Raw(body),
        };
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(Client::new(), &server.uri(), "AIza-test", "gemini-1.5-flash", 0.0)
    }

    #[tokio::test]
    async fn returns_joined_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "AIza-test"))
            .and(body_partial_json(json!({"contents": [{"parts": [{"text": "write"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = client(&server).invoke("write").await.unwrap();
        assert_eq!(out, Completion::Text("Hi there".into()));
    }

    #[tokio::test]
    async fn resource_exhausted_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Quota exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).invoke("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn bad_request_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = client(&server).invoke("x").await.unwrap_err();
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "API error (status 400): API key not valid");
    }

    #[tokio::test]
    async fn blocked_candidate_is_kept_raw() {
        let server = MockServer::start().await;
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]});
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let out = client(&server).invoke("x").await.unwrap();
        assert_eq!(out, Completion::Raw(body));
    }
}
