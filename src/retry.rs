//! Bounded retry around a single model invocation.
//!
//! Only transient failures (rate limit, quota) are retried, after a fixed
//! backoff. Anything else is returned on the first attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use crate::error::ChainError;
use crate::provider::{Completion, ModelHandle};

/// Retry behavior for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed wait between attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    3000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Invokes `handle`, retrying transient failures up to `policy.max_retries`
/// times with a fixed sleep in between.
///
/// Returns [`ChainError::Invocation`] with the last provider error when the
/// first non-transient failure occurs or the retries run out.
pub async fn invoke_with_retry<H: ModelHandle>(
    handle: &H,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<Completion, ChainError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match handle.invoke(prompt).await {
            Ok(completion) => return Ok(completion),
            Err(e) if e.is_transient() && attempts <= policy.max_retries => {
                warn!(
                    "Transient provider error (attempt {attempts}/{}): {e}; retrying in {}ms",
                    policy.max_retries + 1,
                    policy.backoff_ms
                );
                sleep(policy.backoff()).await;
            }
            Err(source) => return Err(ChainError::Invocation { attempts, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Fails with the scripted errors in order, then succeeds.
    struct Flaky {
        failures: RefCell<VecDeque<ProviderError>>,
        calls: Cell<usize>,
    }

    impl Flaky {
        fn new(failures: Vec<ProviderError>) -> Self {
            Self {
                failures: RefCell::new(failures.into()),
                calls: Cell::new(0),
            }
        }
    }

    impl ModelHandle for Flaky {
        async fn invoke(&self, _prompt: &str) -> Result<Completion, ProviderError> {
            self.calls.set(self.calls.get() + 1);
            match self.failures.borrow_mut().pop_front() {
                Some(e) => Err(e),
                None => Ok(Completion::Text("ok".into())),
            }
        }
    }

    fn rate_limited() -> ProviderError {
        ProviderError::Api {
            status: 400,
            message: "Rate limit reached for model llama-3.3-70b-versatile".into(),
            structured: false,
        }
    }

    fn unauthorized() -> ProviderError {
        ProviderError::Api {
            status: 401,
            message: "Invalid API Key".into(),
            structured: true,
        }
    }

    #[test]
    fn default_policy_is_one_retry_three_seconds() {
        let p = RetryPolicy::default();
        assert_eq!(p.max_retries, 1);
        assert_eq!(p.backoff(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_n_transient_failures() {
        let handle = Flaky::new(vec![rate_limited(), rate_limited(), rate_limited()]);
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_ms: 3000,
        };
        let start = Instant::now();

        let out = invoke_with_retry(&handle, "p", &policy).await.unwrap();

        assert_eq!(out.text(), "ok");
        assert_eq!(handle.calls.get(), 4);
        // Three sleeps of one backoff each.
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(9) && waited < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_is_not_retried() {
        let handle = Flaky::new(vec![unauthorized()]);
        let start = Instant::now();

        let err = invoke_with_retry(&handle, "p", &RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(handle.calls.get(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
        match err {
            ChainError::Invocation { attempts, source } => {
                assert_eq!(attempts, 1);
                assert!(matches!(source, ProviderError::Api { status: 401, .. }));
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_carry_last_error() {
        let handle = Flaky::new(vec![rate_limited(), rate_limited(), rate_limited()]);
        let err = invoke_with_retry(&handle, "p", &RetryPolicy::default())
            .await
            .unwrap_err();

        assert_eq!(handle.calls.get(), 2);
        assert!(err.is_rate_limited());
        assert!(matches!(err, ChainError::Invocation { attempts: 2, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_single_attempt() {
        let handle = Flaky::new(vec![rate_limited()]);
        let policy = RetryPolicy {
            max_retries: 0,
            backoff_ms: 3000,
        };
        let err = invoke_with_retry(&handle, "p", &policy).await.unwrap_err();
        assert_eq!(handle.calls.get(), 1);
        assert!(matches!(err, ChainError::Invocation { attempts: 1, .. }));
    }
}
