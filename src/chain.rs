//! Extraction and drafting pipelines over an ordered fallback chain.
//!
//! Each pipeline owns a list of [`ModelCandidate`]s built once from the
//! resolved credentials. A call walks that list in order, one candidate at a
//! time: build a client, invoke it with retry, parse the answer. The first
//! candidate that yields a usable answer wins; every failure is logged and
//! the next candidate is tried. Only exhaustion is reported to the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::job::JobPosting;
use crate::parse::{parse_jobs, truncate_chars};
use crate::portfolio::PortfolioMatcher;
use crate::prompts::{EmailStyle, Persona, email_prompt, extraction_prompt};
use crate::provider::{ClientFactory, Completion, HttpClientFactory, ModelCandidate, Provider};
use crate::retry::{RetryPolicy, invoke_with_retry};
use crate::secrets::{Credentials, SecretResolver};

/// Optional hints merged into the job record before drafting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftOptions {
    pub tone: Option<String>,
    pub cta: Option<String>,
}

pub struct Chain<F: ClientFactory = HttpClientFactory> {
    factory: F,
    // Cheapest first.
    extraction: Vec<ModelCandidate>,
    // Best quality first.
    drafting: Vec<ModelCandidate>,
    // Applied per candidate, not per chain.
    retry: RetryPolicy,
    style: EmailStyle,
    // Sender named in the email prompt.
    persona: Persona,
    max_input_chars: usize,
}

impl Chain<HttpClientFactory> {
    /// Builds a chain backed by real provider clients, resolving keys from
    /// the environment (and `.env`).
    pub fn new(config: &ChainConfig) -> Result<Self, ChainError> {
        Self::with_resolver(config, &SecretResolver::from_env())
    }

    pub fn with_resolver(config: &ChainConfig, resolver: &SecretResolver) -> Result<Self, ChainError> {
        let creds = Credentials::resolve(resolver, config.api_key.as_deref())?;
        let factory = HttpClientFactory::new(config.providers.clone())?;
        Self::with_factory(factory, config, &creds)
    }
}

impl<F: ClientFactory> Chain<F> {
    /// Builds a chain over any client factory.
    ///
    /// Fails with [`ChainError::Configuration`] if `creds` holds no key.
    pub fn with_factory(factory: F, config: &ChainConfig, creds: &Credentials) -> Result<Self, ChainError> {
        if creds.is_empty() {
            return Err(ChainError::Configuration("no API key configured".into()));
        }
        let extraction = extraction_candidates(creds, config);
        let drafting = drafting_candidates(creds, config);
        debug!(
            "Candidate chains: extraction={:?} drafting={:?}",
            extraction.iter().map(ModelCandidate::label).collect::<Vec<_>>(),
            drafting.iter().map(ModelCandidate::label).collect::<Vec<_>>()
        );

        Ok(Self {
            factory,
            extraction,
            drafting,
            retry: config.retry.clone(),
            style: config.style,
            persona: config.persona.clone(),
            max_input_chars: config.max_input_chars,
        })
    }

    pub fn extraction_candidates(&self) -> &[ModelCandidate] {
        &self.extraction
    }

    pub fn drafting_candidates(&self) -> &[ModelCandidate] {
        &self.drafting
    }

    /// Extracts job postings from cleaned page text.
    pub async fn extract_jobs(&self, cleaned_text: &str) -> Result<Vec<JobPosting>, ChainError> {
        let page = truncate_chars(cleaned_text, self.max_input_chars);
        if page.len() < cleaned_text.len() {
            warn!(
                "Page text truncated to {} characters before extraction",
                self.max_input_chars
            );
        }
        let prompt = extraction_prompt(page);

        let jobs = self
            .run_fallback("extract", &self.extraction, &prompt, parse_jobs)
            .await
            .map_err(|last| ChainError::Extraction {
                candidates: self.extraction.len(),
                source: last.map(Box::new),
            })?;
        info!("Extracted {} job posting(s)", jobs.len());
        Ok(jobs)
    }

    /// Drafts an email for `job`, citing `links`.
    pub async fn write_mail(&self, job: &JobPosting, links: &[String]) -> Result<String, ChainError> {
        self.write_mail_with(job, links, &DraftOptions::default()).await
    }

    /// Like [`write_mail`](Self::write_mail), with tone and call-to-action
    /// hints added to the job record as `tone` and `cta`.
    pub async fn write_mail_with(
        &self,
        job: &JobPosting,
        links: &[String],
        options: &DraftOptions,
    ) -> Result<String, ChainError> {
        let mut record = job.clone();
        if let Some(tone) = &options.tone {
            record.set("tone", tone.as_str());
        }
        if let Some(cta) = &options.cta {
            record.set("cta", cta.as_str());
        }
        let prompt = email_prompt(&record, links, &self.persona, self.style);

        self.run_fallback("draft", &self.drafting, &prompt, email_text)
            .await
            .map_err(|last| ChainError::Draft {
                candidates: self.drafting.len(),
                source: last.map(Box::new),
            })
    }

    /// Matches the job's skills against `portfolio` and drafts with the
    /// resulting links (duplicates removed, match order kept).
    pub async fn draft_for_job(
        &self,
        job: &JobPosting,
        portfolio: &impl PortfolioMatcher,
        options: &DraftOptions,
    ) -> Result<String, ChainError> {
        let mut links: Vec<String> = Vec::new();
        for link in portfolio.find_links(&job.skills()) {
            if !links.contains(&link.url) {
                links.push(link.url);
            }
        }
        debug!("Matched {} portfolio link(s) for '{}'", links.len(), job.role());
        self.write_mail_with(job, &links, options).await
    }

    /// Tries each candidate in order and returns the first parsed answer.
    /// On exhaustion yields the last candidate's error, or `None` when the
    /// list was empty.
    async fn run_fallback<T>(
        &self,
        task: &str,
        candidates: &[ModelCandidate],
        prompt: &str,
        parse: impl Fn(Completion) -> Result<T, ChainError>,
    ) -> Result<T, Option<ChainError>> {
        let mut last_error = None;

        for (i, candidate) in candidates.iter().enumerate() {
            info!(
                "[{task}] trying {} ({}/{})",
                candidate.label(),
                i + 1,
                candidates.len()
            );
            let outcome = match self.factory.make_client(candidate) {
                Ok(handle) => invoke_with_retry(&handle, prompt, &self.retry)
                    .await
                    .and_then(&parse),
                Err(e) => Err(ChainError::Provider(e)),
            };

            match outcome {
                Ok(value) => {
                    info!("[{task}] {} succeeded", candidate.label());
                    return Ok(value);
                }
                Err(e) => {
                    warn!("[{task}] {} failed: {e}", candidate.label());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error)
    }
}

fn email_text(completion: Completion) -> Result<String, ChainError> {
    match completion {
        Completion::Text(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
        Completion::Text(_) => Err(ChainError::Parse("model returned an empty email".into())),
        raw @ Completion::Raw(_) => Err(ChainError::Parse(format!(
            "provider returned no text content: {}",
            truncate_chars(&raw.text(), 200)
        ))),
    }
}

type Tier<'a> = (Provider, &'a String, &'a Option<String>);

/// Cheapest first: Groq fast, Groq heavy, then Gemini.
pub fn extraction_candidates(creds: &Credentials, config: &ChainConfig) -> Vec<ModelCandidate> {
    let m = &config.models;
    configured(
        [
            (Provider::Groq, &m.fast, &creds.groq_fast),
            (Provider::Groq, &m.heavy, &creds.groq_heavy),
            (Provider::Gemini, &m.gemini, &creds.gemini),
        ],
        config.temperature,
    )
}

/// Best quality first: Groq heavy, Groq fast, then Gemini.
pub fn drafting_candidates(creds: &Credentials, config: &ChainConfig) -> Vec<ModelCandidate> {
    let m = &config.models;
    configured(
        [
            (Provider::Groq, &m.heavy, &creds.groq_heavy),
            (Provider::Groq, &m.fast, &creds.groq_fast),
            (Provider::Gemini, &m.gemini, &creds.gemini),
        ],
        config.temperature,
    )
}

// Keeps only tiers whose key resolved.
fn configured(tiers: [Tier<'_>; 3], temperature: f32) -> Vec<ModelCandidate> {
    tiers
        .into_iter()
        .filter_map(|(provider, model, key)| {
            key.as_deref()
                .map(|k| ModelCandidate::new(provider, model.as_str(), k, temperature))
        })
        .collect()
}
