//! Request executor and retry/backoff controller.
//!
//! One chunk is a small state machine: ATTEMPT -> {SUCCESS,
//! RETRYABLE_FAILURE, FATAL_FAILURE}. A retryable failure waits out either
//! the provider-suggested delay plus a safety buffer, or exponential
//! backoff -- with a larger base for confirmed rate-limit signals than for
//! generic transient errors. Attempts per chunk are capped; exhausting
//! them is fatal for that chunk only.

use std::time::Duration;

use chronicle_types::error::ProviderError;

use crate::provider::GenerationProvider;

/// Classified outcome of one provider attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(String),
    RetryableFailure {
        error: ProviderError,
        /// Provider-suggested wait, when the throttling response carried one.
        delay_hint: Option<Duration>,
        /// Confirmed rate-limit signal (vs. generic transient failure).
        rate_limited: bool,
    },
    FatalFailure(ProviderError),
}

/// Map a provider result onto the executor state machine.
pub fn classify(result: Result<String, ProviderError>) -> AttemptOutcome {
    match result {
        Ok(text) => AttemptOutcome::Success(text),
        Err(err @ ProviderError::RateLimited { retry_after_ms }) => AttemptOutcome::RetryableFailure {
            delay_hint: retry_after_ms.map(Duration::from_millis),
            rate_limited: true,
            error: err,
        },
        Err(err) if err.is_retryable() => AttemptOutcome::RetryableFailure {
            delay_hint: None,
            rate_limited: false,
            error: err,
        },
        Err(err) => AttemptOutcome::FatalFailure(err),
    }
}

/// Backoff schedule for retryable failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per chunk (first try included).
    pub max_attempts: u32,
    /// Backoff base for generic transient errors.
    pub transient_base: Duration,
    /// Backoff base for confirmed rate-limit signals.
    pub rate_limit_base: Duration,
    /// Safety margin added to a provider-suggested delay.
    pub retry_after_buffer: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            transient_base: Duration::from_secs(2),
            rate_limit_base: Duration::from_secs(10),
            retry_after_buffer: Duration::from_secs(1),
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Wait before re-attempting after a failure on `attempt` (1-based).
    ///
    /// A provider-suggested delay wins outright (plus the safety buffer);
    /// otherwise exponential backoff from the base matching the failure kind.
    pub fn delay_for(
        &self,
        attempt: u32,
        delay_hint: Option<Duration>,
        rate_limited: bool,
    ) -> Duration {
        if let Some(hint) = delay_hint {
            return (hint + self.retry_after_buffer).min(self.max_delay);
        }

        let base = if rate_limited {
            self.rate_limit_base
        } else {
            self.transient_base
        };
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        base.saturating_mul(factor).min(self.max_delay)
    }
}

/// How a chunk's attempt loop ended without producing text.
#[derive(Debug)]
pub enum ExecutionError {
    /// Every attempt failed retryably; the chunk is abandoned.
    RetryExhausted { attempts: u32, last: ProviderError },
    /// A non-retryable provider failure; retrying cannot help.
    Fatal(ProviderError),
}

/// Issues one generation call per attempt, under a wall-clock timeout,
/// until success, a fatal failure, or the attempt cap.
pub struct RequestExecutor<'a, P> {
    provider: &'a P,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl<'a, P: GenerationProvider> RequestExecutor<'a, P> {
    pub fn new(provider: &'a P, policy: RetryPolicy, request_timeout: Duration) -> Self {
        Self {
            provider,
            policy,
            request_timeout,
        }
    }

    /// Run the attempt loop for one chunk prompt.
    pub async fn execute(&self, prompt: &str, model: &str) -> Result<String, ExecutionError> {
        let mut attempt = 1;
        loop {
            let outcome = classify(self.attempt_once(prompt, model).await);

            match outcome {
                AttemptOutcome::Success(text) => return Ok(text),
                AttemptOutcome::FatalFailure(err) => {
                    tracing::warn!(model, attempt, error = %err, "fatal provider failure");
                    return Err(ExecutionError::Fatal(err));
                }
                AttemptOutcome::RetryableFailure {
                    error,
                    delay_hint,
                    rate_limited,
                } => {
                    if attempt >= self.policy.max_attempts {
                        tracing::warn!(
                            model,
                            attempts = attempt,
                            error = %error,
                            "retries exhausted for chunk"
                        );
                        return Err(ExecutionError::RetryExhausted {
                            attempts: attempt,
                            last: error,
                        });
                    }

                    let delay = self.policy.delay_for(attempt, delay_hint, rate_limited);
                    if rate_limited {
                        tracing::info!(model, attempt, ?delay, "rate limited, backing off");
                    } else {
                        tracing::debug!(model, attempt, ?delay, error = %error, "transient failure, backing off");
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One provider call bounded by the configured timeout. A timeout is
    /// classified as a retryable failure.
    async fn attempt_once(&self, prompt: &str, model: &str) -> Result<String, ProviderError> {
        match tokio::time::timeout(self.request_timeout, self.provider.generate(prompt, model)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.request_timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider scripted to fail `failures` times before succeeding.
    struct ScriptedProvider {
        calls: AtomicU32,
        failures: u32,
        error: fn() -> ProviderError,
    }

    impl ScriptedProvider {
        fn failing_n(failures: u32, error: fn() -> ProviderError) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                error,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GenerationProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err((self.error)())
            } else {
                Ok("a summary".to_string())
            }
        }
    }

    fn executor<P: GenerationProvider>(provider: &P) -> RequestExecutor<'_, P> {
        RequestExecutor::new(provider, RetryPolicy::default(), Duration::from_secs(30))
    }

    #[test]
    fn test_classify_maps_rate_limit_with_hint() {
        let outcome = classify(Err(ProviderError::RateLimited {
            retry_after_ms: Some(14_000),
        }));
        match outcome {
            AttemptOutcome::RetryableFailure {
                delay_hint,
                rate_limited,
                ..
            } => {
                assert_eq!(delay_hint, Some(Duration::from_secs(14)));
                assert!(rate_limited);
            }
            other => panic!("expected retryable, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_maps_fatal() {
        let outcome = classify(Err(ProviderError::AuthenticationFailed));
        assert!(matches!(outcome, AttemptOutcome::FatalFailure(_)));
    }

    #[test]
    fn test_delay_prefers_provider_hint_plus_buffer() {
        let policy = RetryPolicy::default();
        let delay = policy.delay_for(1, Some(Duration::from_secs(14)), true);
        assert_eq!(delay, Duration::from_secs(15));
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1, None, false), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2, None, false), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3, None, false), Duration::from_secs(8));
    }

    #[test]
    fn test_rate_limit_base_is_larger() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for(1, None, true) > policy.delay_for(1, None, false));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(30, None, true), policy.max_delay);
        assert_eq!(
            policy.delay_for(1, Some(Duration::from_secs(600)), true),
            policy.max_delay
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_provider_attempts_exactly_max() {
        let provider = ScriptedProvider::failing_n(u32::MAX, || {
            ProviderError::Transient("503".to_string())
        });
        let result = executor(&provider).execute("prompt", "flash").await;

        match result {
            Err(ExecutionError::RetryExhausted { attempts, .. }) => {
                assert_eq!(attempts, 5);
                assert_eq!(provider.calls(), 5);
            }
            other => panic!("expected retry exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let provider =
            ScriptedProvider::failing_n(2, || ProviderError::Transient("reset".to_string()));
        let text = executor(&provider).execute("prompt", "flash").await.unwrap();
        assert_eq!(text, "a summary");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_stops_immediately() {
        let provider = ScriptedProvider::failing_n(u32::MAX, || ProviderError::AuthenticationFailed);
        let result = executor(&provider).execute("prompt", "flash").await;
        assert!(matches!(result, Err(ExecutionError::Fatal(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retryable() {
        struct HangingProvider;

        impl GenerationProvider for HangingProvider {
            fn name(&self) -> &str {
                "hanging"
            }

            async fn generate(&self, _prompt: &str, _model: &str) -> Result<String, ProviderError> {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok(String::new())
            }
        }

        let provider = HangingProvider;
        let exec = RequestExecutor::new(
            &provider,
            RetryPolicy {
                max_attempts: 2,
                ..RetryPolicy::default()
            },
            Duration::from_secs(30),
        );
        let result = exec.execute("prompt", "flash").await;
        match result {
            Err(ExecutionError::RetryExhausted { attempts, last }) => {
                assert_eq!(attempts, 2);
                assert!(matches!(last, ProviderError::Timeout(30)));
            }
            other => panic!("expected timeout exhaustion, got {other:?}"),
        }
    }
}
