use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Config error: {0}")]
    Configuration(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invocation failed after {attempts} attempt(s): {source}")]
    Invocation {
        attempts: u32,
        source: ProviderError,
    },

    #[error("Malformed model output: {0}")]
    Parse(String),

    #[error("Job extraction failed after {candidates} candidate(s){}", last_error(.source))]
    Extraction {
        candidates: usize,
        source: Option<Box<ChainError>>,
    },

    #[error("Email drafting failed after {candidates} candidate(s){}", last_error(.source))]
    Draft {
        candidates: usize,
        source: Option<Box<ChainError>>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn last_error(source: &Option<Box<ChainError>>) -> String {
    match source {
        Some(e) => format!(": {e}"),
        None => " (no credentials configured)".to_string(),
    }
}

impl ChainError {
    /// Whether the failure at the end of this chain was a rate-limit signal.
    ///
    /// Callers use this to advise waiting or switching credentials instead
    /// of reporting a generic failure.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ChainError::Provider(e) => e.is_transient(),
            ChainError::Invocation { source, .. } => source.is_transient(),
            ChainError::Extraction { source, .. } | ChainError::Draft { source, .. } => {
                source.as_deref().is_some_and(ChainError::is_rate_limited)
            }
            _ => false,
        }
    }
}
