//! Job-posting extraction and cold email drafting over a multi-provider LLM
//! fallback chain.
//!
//! ```no_run
//! # async fn demo() -> Result<(), coldmail::ChainError> {
//! use coldmail::{Chain, ChainConfig};
//!
//! let chain = Chain::new(&ChainConfig::load()?)?;
//! for job in chain.extract_jobs("...cleaned careers page text...").await? {
//!     let email = chain.write_mail(&job, &[]).await?;
//!     println!("{email}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod format;
pub mod job;
pub mod parse;
pub mod portfolio;
pub mod prompts;
pub mod provider;
pub mod retry;
pub mod secrets;

pub use chain::{Chain, DraftOptions};
pub use config::ChainConfig;
pub use error::ChainError;
pub use job::JobPosting;
pub use portfolio::{Portfolio, PortfolioLink, PortfolioMatcher};
pub use prompts::{EmailStyle, Persona};
pub use provider::{Completion, ModelCandidate, Provider, ProviderError};
pub use retry::{RetryPolicy, invoke_with_retry};
pub use secrets::{Credentials, SecretResolver, SecretStore};
