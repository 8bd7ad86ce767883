//! Bounded retry with exponential backoff and jitter for CFBD API calls.
//!
//! A full-season collection makes a few hundred requests against a free-tier
//! API; transient 5xx responses and rate-limit hits are routine and must not
//! abort the batch. Client errors other than 408/425/429 fail fast.

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial try)
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
    /// Cap for a single backoff delay in milliseconds
    pub max_delay_ms: u64,
    /// Maximum total elapsed time in milliseconds across all attempts
    pub max_elapsed_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 2000,
            max_elapsed_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Load the policy from CFBD_RETRY_* environment variables with safe
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("CFBD_RETRY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0 && n <= 10)
                .unwrap_or(defaults.max_attempts),
            base_delay_ms: std::env::var("CFBD_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.base_delay_ms),
            max_delay_ms: std::env::var("CFBD_RETRY_MAX_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_delay_ms),
            max_elapsed_ms: std::env::var("CFBD_RETRY_MAX_ELAPSED_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_elapsed_ms),
        }
    }

    /// Backoff delay for an attempt: min(max_delay, base * 2^(attempt-1))
    /// with full jitter in [0, capped).
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let capped = self.capped_backoff_ms(attempt);
        if capped == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..capped)
        }
    }

    fn capped_backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        let multiplier = if exponent >= 32 {
            u64::MAX
        } else {
            1u64 << exponent
        };
        self.base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms)
    }
}

/// Classify an error as retryable or not.
///
/// Retryable: network/timeout errors and HTTP 408, 425, 429, 5xx.
/// Not retryable: other 4xx (bad request, bad token, not found) and anything
/// that is not a transport problem.
pub fn is_retryable(err: &anyhow::Error) -> bool {
    if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>() {
        if let Some(status) = reqwest_err.status() {
            return matches!(status.as_u16(), 408 | 425 | 429 | 500..=599);
        }
        return reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request();
    }
    // Unclassified errors are treated as transient.
    true
}

/// Retry an async operation under the policy.
///
/// `op_name` labels the operation in logs (e.g. "fetch_plays_w3").
pub async fn retry_async<T, Fut, F>(policy: &RetryPolicy, op_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let start = std::time::Instant::now();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        op = op_name,
                        attempts = attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "retry succeeded"
                    );
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    debug!(op = op_name, error = %err, "non-retryable error");
                    return Err(err);
                }
                if attempt >= policy.max_attempts {
                    warn!(op = op_name, attempts = attempt, error = %err, "retries exhausted");
                    return Err(err);
                }
                let elapsed_ms = start.elapsed().as_millis() as u64;
                if elapsed_ms >= policy.max_elapsed_ms {
                    warn!(op = op_name, elapsed_ms, error = %err, "retry window elapsed");
                    return Err(err);
                }

                let backoff_ms = policy
                    .backoff_ms(attempt)
                    .min(policy.max_elapsed_ms.saturating_sub(elapsed_ms));
                debug!(op = op_name, attempt, backoff_ms, "backing off before retry");
                if backoff_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay_ms, 250);
        assert_eq!(policy.max_delay_ms, 2000);
        assert_eq!(policy.max_elapsed_ms, 10_000);
    }

    #[test]
    fn test_backoff_schedule_caps() {
        let policy = RetryPolicy::default();
        // 250, 500, 1000, 2000, then held at the cap.
        assert_eq!(policy.capped_backoff_ms(1), 250);
        assert_eq!(policy.capped_backoff_ms(2), 500);
        assert_eq!(policy.capped_backoff_ms(3), 1000);
        assert_eq!(policy.capped_backoff_ms(4), 2000);
        assert_eq!(policy.capped_backoff_ms(5), 2000);
        assert_eq!(policy.capped_backoff_ms(40), 2000);
    }

    #[test]
    fn test_jitter_stays_below_cap() {
        let policy = RetryPolicy::default();
        for attempt in 1..6 {
            for _ in 0..20 {
                assert!(policy.backoff_ms(attempt) < policy.capped_backoff_ms(attempt).max(1));
            }
        }
    }

    #[test]
    fn test_plain_anyhow_errors_are_retryable() {
        assert!(is_retryable(&anyhow::anyhow!("connection reset")));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_second_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            max_elapsed_ms: 1000,
        };
        let mut calls = 0;
        let result = retry_async(&policy, "test_op", || {
            calls += 1;
            async move {
                if calls < 2 {
                    anyhow::bail!("transient failure");
                }
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            max_elapsed_ms: 1000,
        };
        let mut calls = 0;
        let result: Result<()> = retry_async(&policy, "test_op", || {
            calls += 1;
            async move { anyhow::bail!("persistent failure") }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
