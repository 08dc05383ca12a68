//! RPC retry logic and error classification
//!
//! Every failed request is retried until the retry budget is exhausted; the
//! last error is then propagated unchanged. Rate-limit responses back off
//! exponentially, everything else retries after the base delay. Both delays
//! carry a small uniform jitter to spread out concurrent workers.

use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::rpc::config::RetryConfig;

/// Jitter range added on top of the exponential rate-limit backoff.
const RATE_LIMIT_JITTER_MS: u64 = 100;
/// Jitter range added on top of the base delay for all other errors.
const DEFAULT_JITTER_MS: u64 = 50;

/// Extension trait classifying errors for backoff selection.
///
/// Rate limiting surfaces in provider-dependent shapes, so classification
/// goes by the rendered message rather than a structured code.
pub(crate) trait RetryableError {
    /// Whether this error is a rate-limit response (HTTP 429 or equivalent).
    fn is_rate_limited(&self) -> bool;
}

impl<E: std::fmt::Display> RetryableError for E {
    fn is_rate_limited(&self) -> bool {
        let message = self.to_string();
        message.contains("429") ||
            message.contains("Too Many Requests") ||
            message.contains("rate limit")
    }
}

/// Configuration for RPC retry behavior with backoff and jitter.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_retries: usize,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryConfig::default().into()
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }
}

impl From<&RetryPolicy> for RetryConfig {
    fn from(policy: &RetryPolicy) -> Self {
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy optimized for testing (very short delays).
    #[cfg(test)]
    pub fn for_testing() -> Self {
        RetryConfig { max_retries: 3, base_delay_ms: 1 }.into()
    }

    /// Executes an RPC request with automatic retry on failure.
    ///
    /// Performs up to `max_retries + 1` attempts. Rate-limit errors back off
    /// with `base * 2^attempt` plus jitter, other errors with the base delay
    /// plus jitter. After the final attempt the last error is returned as-is.
    pub(crate) async fn retry_request<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    if attempt >= self.max_retries {
                        return Err(error);
                    }
                    let rate_limited = error.is_rate_limited();
                    let delay = self.next_delay(attempt, rate_limited);
                    if rate_limited {
                        warn!(
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Rate limited, backing off before retry"
                        );
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn next_delay(&self, attempt: usize, rate_limited: bool) -> Duration {
        let mut rng = rand::thread_rng();
        if rate_limited {
            let factor = 1u32 << attempt.min(31);
            self.base_delay.saturating_mul(factor) +
                Duration::from_millis(rng.gen_range(0..RATE_LIMIT_JITTER_MS))
        } else {
            self.base_delay + Duration::from_millis(rng.gen_range(0..DEFAULT_JITTER_MS))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::http_status("HTTP status client error (429 Too Many Requests)", true)]
    #[case::bare_status_code("error 429", true)]
    #[case::message_only("Too Many Requests", true)]
    #[case::provider_phrasing("provider rate limit exceeded", true)]
    #[case::timeout("connection timed out", false)]
    #[case::not_found("account not found", false)]
    fn test_rate_limit_classification(#[case] message: &str, #[case] expected: bool) {
        let error = std::io::Error::other(message);
        assert_eq!(error.is_rate_limited(), expected);
    }

    #[rstest]
    #[case::first_attempt(0, 100, 200)]
    #[case::second_attempt(1, 200, 300)]
    #[case::third_attempt(2, 400, 500)]
    fn test_rate_limit_delay_bounds(
        #[case] attempt: usize,
        #[case] min_ms: u64,
        #[case] max_ms: u64,
    ) {
        let policy = RetryPolicy::default();
        let delay = policy.next_delay(attempt, true);
        assert!(delay >= Duration::from_millis(min_ms), "delay {delay:?} below {min_ms}ms");
        assert!(delay < Duration::from_millis(max_ms), "delay {delay:?} not below {max_ms}ms");
    }

    #[test]
    fn test_default_delay_bounds() {
        let policy = RetryPolicy::default();
        // Non-rate-limited errors keep the flat base delay regardless of attempt.
        for attempt in 0..4 {
            let delay = policy.next_delay(attempt, false);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay < Duration::from_millis(150));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_rate_limit_then_succeed() {
        let policy: RetryPolicy = RetryConfig { max_retries: 3, base_delay_ms: 100 }.into();
        let attempts = AtomicUsize::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<&str, String> = policy
            .retry_request(|| {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err("429 Too Many Requests".to_string())
                    } else {
                        Ok("block")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("block"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3, "expected 2 failures + 1 success");

        // Two rate-limited backoffs: base*1 and base*2, each plus up to 100ms jitter.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "expected >= 300ms backoff, got {elapsed:?}");
        assert!(elapsed < Duration::from_millis(500), "expected < 500ms backoff, got {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries_and_returns_last_error() {
        let policy = RetryPolicy::for_testing();
        let attempts = AtomicUsize::new(0);

        let result: Result<(), String> = policy
            .retry_request(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("connection refused".to_string()) }
            })
            .await;

        assert_eq!(result, Err("connection refused".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 4, "expected max_retries + 1 attempts");
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limited_errors_are_also_retried() {
        let policy = RetryPolicy::for_testing();
        let attempts = AtomicUsize::new(0);

        let result: Result<&str, String> = policy
            .retry_request(|| {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err("socket closed".to_string())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_retry_config_roundtrip() {
        let config = RetryConfig { max_retries: 7, base_delay_ms: 250 };
        let policy: RetryPolicy = config.into();
        let roundtripped: RetryConfig = (&policy).into();

        assert_eq!(roundtripped.max_retries, 7);
        assert_eq!(roundtripped.base_delay_ms, 250);
    }
}
