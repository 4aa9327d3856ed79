//! Configuration loaded from `coldmail.toml`.
//!
//! Every field has a default, so a missing file or a partial one is fine.
//! API keys found in the environment or a host secret store take precedence
//! over the key written in the file.

use std::path::Path;

use serde::Deserialize;

use crate::error::ChainError;
use crate::prompts::{EmailStyle, Persona};
use crate::provider::ProviderSettings;
use crate::retry::RetryPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "coldmail.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    /// Base Groq key. `groq_api_key` is accepted as an alternate name.
    #[serde(default, alias = "groq_api_key")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub models: ModelNames,

    /// Sampling temperature for every candidate.
    #[serde(default)]
    pub temperature: f32,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub style: EmailStyle,

    #[serde(default)]
    pub persona: Persona,

    #[serde(default)]
    pub providers: ProviderSettings,

    /// Page text beyond this many characters is cut before extraction.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

/// Model names per role.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelNames {
    /// Small, cheap Groq model.
    #[serde(default = "default_fast_model")]
    pub fast: String,
    /// Largest Groq model.
    #[serde(default = "default_heavy_model")]
    pub heavy: String,
    #[serde(default = "default_gemini_model")]
    pub gemini: String,
}

fn default_fast_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_heavy_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_input_chars() -> usize {
    24_000
}

impl Default for ModelNames {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            heavy: default_heavy_model(),
            gemini: default_gemini_model(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: ModelNames::default(),
            temperature: 0.0,
            retry: RetryPolicy::default(),
            style: EmailStyle::default(),
            persona: Persona::default(),
            providers: ProviderSettings::default(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl ChainConfig {
    /// Loads `coldmail.toml` from the working directory, or defaults if it
    /// does not exist.
    pub fn load() -> Result<Self, ChainError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ChainError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<ChainConfig>(&contents)?)
    }
}
