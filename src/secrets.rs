//! Layered credential lookup.
//!
//! A host application may expose its own secret store (a vault, a UI
//! framework's secrets file); it is consulted first and the process
//! environment second. Blank values count as missing.

use std::collections::HashMap;

use crate::error::ChainError;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const GROQ_API_KEY_FAST: &str = "GROQ_API_KEY_FAST";
pub const GROQ_API_KEY_HEAVY: &str = "GROQ_API_KEY_HEAVY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// A source of named secrets. Lookups never fail loudly: a store that
/// cannot answer returns `None`.
pub trait SecretStore {
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
pub struct EnvStore;

impl SecretStore for EnvStore {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SecretStore for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Host store first, then the fallback (normally [`EnvStore`]).
pub struct SecretResolver {
    // Consulted first when present.
    host: Option<Box<dyn SecretStore>>,
    fallback: Box<dyn SecretStore>,
}

impl Default for SecretResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SecretResolver {
    /// Environment only. Loads `.env` from the working directory if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            host: None,
            fallback: Box::new(EnvStore),
        }
    }

    pub fn with_host_store(mut self, store: impl SecretStore + 'static) -> Self {
        self.host = Some(Box::new(store));
        self
    }

    /// Replaces the environment with another store (used by tests and by
    /// hosts that must not read the process environment).
    pub fn with_fallback(mut self, store: impl SecretStore + 'static) -> Self {
        self.fallback = Box::new(store);
        self
    }

    /// First non-blank value for `name`, trimmed.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.host
            .as_ref()
            .and_then(|h| non_blank(h.get(name)))
            .or_else(|| non_blank(self.fallback.get(name)))
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolved keys for every provider role.
///
/// `fast` and `heavy` each fall back to the base Groq key. Without a base
/// key, a role-specific key configures only its own role.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub groq_fast: Option<String>,
    pub groq_heavy: Option<String>,
    pub gemini: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("groq_fast", &mark(&self.groq_fast))
            .field("groq_heavy", &mark(&self.groq_heavy))
            .field("gemini", &mark(&self.gemini))
            .finish()
    }
}

impl Credentials {
    /// Reads all recognized names. `file_key` is the base key from the
    /// config file, used only when no store provides `GROQ_API_KEY`.
    ///
    /// Fails with [`ChainError::Configuration`] when nothing resolves.
    pub fn resolve(resolver: &SecretResolver, file_key: Option<&str>) -> Result<Self, ChainError> {
        let base = resolver
            .resolve(GROQ_API_KEY)
            .or_else(|| non_blank(file_key.map(str::to_string)));
        let creds = Self {
            groq_fast: resolver.resolve(GROQ_API_KEY_FAST).or_else(|| base.clone()),
            groq_heavy: resolver.resolve(GROQ_API_KEY_HEAVY).or_else(|| base.clone()),
            gemini: resolver.resolve(GEMINI_API_KEY),
        };

        if creds.is_empty() {
            return Err(ChainError::Configuration(format!(
                "no API key found. Set {GROQ_API_KEY} (or {GROQ_API_KEY_FAST}/{GROQ_API_KEY_HEAVY}) \
                 or {GEMINI_API_KEY} in the environment, a .env file, or the host secret store"
            )));
        }
        Ok(creds)
    }

    pub fn is_empty(&self) -> bool {
        self.groq_fast.is_none() && self.groq_heavy.is_none() && self.gemini.is_none()
    }
}
