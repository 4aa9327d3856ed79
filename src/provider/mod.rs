//! Model client factory and the provider families it can build.
//!
//! Every candidate in a fallback chain is turned into a [`ModelHandle`] by a
//! [`ClientFactory`]. The production factory, [`HttpClientFactory`], talks to
//! Groq's OpenAI-compatible endpoint and to Gemini's `generateContent`; tests
//! plug in their own factory to script responses.

pub mod error;
pub mod gemini;
pub mod groq;
pub mod types;

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use error::ProviderError;
pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use types::Completion;

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider families a candidate can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    Gemini,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => write!(f, "groq"),
            Provider::Gemini => write!(f, "gemini"),
        }
    }
}

/// One (provider, model, credential) attempt in a fallback chain.
#[derive(Clone, PartialEq)]
pub struct ModelCandidate {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
}

impl ModelCandidate {
    pub fn new(provider: Provider, model: impl Into<String>, api_key: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: api_key.into(),
            temperature,
        }
    }

    /// `provider/model`, used in logs.
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

// Keys never reach logs or panic messages.
impl fmt::Debug for ModelCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCandidate")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// A constructed model endpoint that can answer one prompt.
#[allow(async_fn_in_trait)]
pub trait ModelHandle {
    async fn invoke(&self, prompt: &str) -> Result<Completion, ProviderError>;
}

/// Builds a [`ModelHandle`] for a candidate.
pub trait ClientFactory {
    type Handle: ModelHandle;

    fn make_client(&self, candidate: &ModelCandidate) -> Result<Self::Handle, ProviderError>;
}

/// A handle for either provider family.
pub enum ProviderClient {
    Groq(GroqClient),
    Gemini(GeminiClient),
}

impl ModelHandle for ProviderClient {
    async fn invoke(&self, prompt: &str) -> Result<Completion, ProviderError> {
        match self {
            ProviderClient::Groq(c) => c.invoke(prompt).await,
            ProviderClient::Gemini(c) => c.invoke(prompt).await,
        }
    }
}

/// Endpoint and transport settings for [`HttpClientFactory`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_groq_base_url() -> String {
    GROQ_API_URL.to_string()
}

fn default_gemini_base_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            groq_base_url: default_groq_base_url(),
            gemini_base_url: default_gemini_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Production factory: real HTTP clients for Groq and Gemini.
///
/// The underlying `reqwest::Client` is shared so connections are pooled, but
/// each call to [`make_client`](ClientFactory::make_client) yields a fresh
/// handle bound to one candidate.
pub struct HttpClientFactory {
    http: Client,
    settings: ProviderSettings,
}

impl HttpClientFactory {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::Construction(format!("HTTP client: {e}")))?;
        Ok(Self { http, settings })
    }
}

impl ClientFactory for HttpClientFactory {
    type Handle = ProviderClient;

    fn make_client(&self, candidate: &ModelCandidate) -> Result<ProviderClient, ProviderError> {
        match candidate.provider {
            Provider::Groq => GroqClient::new(
                self.http.clone(),
                &self.settings.groq_base_url,
                &candidate.api_key,
                &candidate.model,
                candidate.temperature,
            )
            .map(ProviderClient::Groq),
            Provider::Gemini => Ok(ProviderClient::Gemini(GeminiClient::new(
                self.http.clone(),
                &self.settings.gemini_base_url,
                &candidate.api_key,
                &candidate.model,
                candidate.temperature,
            ))),
        }
    }
}
