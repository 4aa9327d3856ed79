//! Error types at the model-provider boundary.
//!
//! [`ProviderError`] keeps the structured signal a provider gives us (HTTP
//! status, explicit rate limiting) so the retry wrapper can tell transient
//! overload apart from everything else without parsing messages first.

use thiserror::Error;

use super::types::ErrorEnvelope;

/// Message fragments that mark a transient rate-limit/quota failure when the
/// provider gave no structured signal.
const TRANSIENT_MARKERS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "ratelimit",
    "429",
    "quota",
    "exceeded",
    "throttl",
    "resource_exhausted",
];

/// Errors that can occur while building or invoking a model client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered HTTP 429 or otherwise reported rate limiting.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Any other non-success HTTP response (bad key, unknown model, 5xx).
    ///
    /// `structured` is set when the body carried a provider error code or
    /// status; only unstructured messages are sniffed for rate-limit markers.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        structured: bool,
    },

    /// Transport-level failure (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The client could not be constructed for this candidate.
    #[error("client construction failed: {0}")]
    Construction(String),

    /// A success status with a body we could not read.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether this failure signals temporary overload that a retry may clear.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status: 429, .. } => true,
            ProviderError::Api { structured: true, .. } => false,
            ProviderError::Api { message, .. } => looks_transient(message),
            ProviderError::Network(e) => {
                e.status().is_some_and(|s| s.as_u16() == 429) || looks_transient(&e.to_string())
            }
            ProviderError::Construction(_) => false,
            ProviderError::MalformedResponse(msg) => looks_transient(msg),
        }
    }
}

impl ProviderError {
    /// Classifies a non-success HTTP response.
    ///
    /// HTTP 429 and provider bodies flagged as rate limiting become
    /// [`ProviderError::RateLimited`]; everything else is an [`Api`](ProviderError::Api)
    /// error carrying the provider's message when one can be parsed.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let retry_after_ms = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        let parsed = serde_json::from_str::<ErrorEnvelope>(&body).ok();

        let rate_limited = status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || parsed.as_ref().is_some_and(|p| p.error.signals_rate_limit());
        if rate_limited {
            return ProviderError::RateLimited {
                retry_after_ms: retry_after_ms.unwrap_or(1000),
            };
        }

        match parsed {
            Some(p) => ProviderError::Api {
                status: status.as_u16(),
                structured: p.error.is_coded(),
                message: p.error.message,
            },
            None => ProviderError::Api {
                status: status.as_u16(),
                message: body,
                structured: false,
            },
        }
    }
}

/// Case-insensitive sniff for rate-limit markers in a free-form message.
pub fn looks_transient(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_display() {
        let err = ProviderError::RateLimited {
            retry_after_ms: 3000,
        };
        assert_eq!(err.to_string(), "rate limited, retry after 3000ms");
    }

    #[test]
    fn api_error_display() {
        let err = ProviderError::Api {
            status: 401,
            message: "Invalid API Key".into(),
            structured: false,
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API Key");
    }

    #[test]
    fn structured_rate_limit_is_transient() {
        assert!(ProviderError::RateLimited { retry_after_ms: 0 }.is_transient());
        assert!(
            ProviderError::Api {
                status: 429,
                message: String::new(),
                structured: false,
            }
            .is_transient()
        );
    }

    #[test]
    fn quota_message_is_transient() {
        let err = ProviderError::Api {
            status: 400,
            message: "Daily token Quota EXCEEDED for org".into(),
            structured: false,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn auth_failure_is_not_transient() {
        let err = ProviderError::Api {
            status: 401,
            message: "invalid_api_key".into(),
            structured: true,
        };
        assert!(!err.is_transient());
        assert!(!ProviderError::Construction("bad key".into()).is_transient());
    }

    #[test]
    fn sniffing_is_case_insensitive() {
        assert!(looks_transient("Rate Limit reached for model"));
        assert!(looks_transient("HTTP 429 Too Many Requests"));
        assert!(looks_transient("Request was THROTTLED"));
        assert!(!looks_transient("model not found"));
    }

    async fn classify(template: wiremock::ResponseTemplate) -> ProviderError {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(template)
            .mount(&server)
            .await;
        let response = reqwest::get(server.uri()).await.unwrap();
        ProviderError::from_response(response).await
    }

    #[tokio::test]
    async fn coded_error_is_not_sniffed() {
        let err = classify(wiremock::ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "message": "Maximum context length exceeded for this model",
                "code": "context_length_exceeded"
            }
        })))
        .await;

        assert!(matches!(
            err,
            ProviderError::Api {
                status: 400,
                structured: true,
                ..
            }
        ));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn coded_rate_limit_becomes_rate_limited() {
        let err = classify(
            wiremock::ResponseTemplate::new(400)
                .insert_header("retry-after", "7")
                .set_body_json(serde_json::json!({
                    "error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}
                })),
        )
        .await;
        assert!(matches!(err, ProviderError::RateLimited { retry_after_ms: 7000 }));
    }

    #[tokio::test]
    async fn plain_text_body_falls_back_to_sniffing() {
        let err = classify(wiremock::ResponseTemplate::new(503).set_body_string("quota exceeded, slow down")).await;
        assert!(matches!(
            err,
            ProviderError::Api {
                status: 503,
                structured: false,
                ..
            }
        ));
        assert!(err.is_transient());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProviderError>();
    }
}
