//! Exponential backoff retry for transient transport failures.
//!
//! Retries apply only to network-level errors (connection failures, timeouts,
//! 5xx responses). Application-level rejections (`Success: false`) and
//! validation errors are deterministic and are never retried.

use std::{future::Future, time::Duration};

use serde::Deserialize;

use crate::error::{PaymentsError, Result};

/// Configuration for retry behavior.
///
/// The delay between attempts grows exponentially up to `max_delay_ms`.
///
/// # Examples
///
/// ```
/// use tbank_payments::RetryPolicy;
///
/// // Default policy: 3 attempts, 100ms initial delay, 5s max delay.
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
///
/// // More aggressive retries.
/// let aggressive = RetryPolicy {
///     max_attempts: 5,
///     initial_delay_ms: 50,
///     max_delay_ms: 10_000,
///     backoff_multiplier: 2.0,
/// };
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds (default: 100).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds (default: 5000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0).
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with custom maximum attempts and default delays.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::default() }
    }

    /// Delay before the retry following attempt number `attempt` (0-based).
    ///
    /// Exponential: `initial_delay * multiplier ^ attempt`, capped at
    /// `max_delay_ms`.
    pub(crate) fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = (self.initial_delay_ms as f64) * self.backoff_multiplier.powi(exponent);
        let capped = delay_ms.min(self.max_delay_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Determines whether an error is worth retrying.
///
/// Only transport-level failures qualify: the gateway may be temporarily
/// unreachable or overloaded. A 4xx status, a `Success:false` payload, and
/// every validation or configuration error indicate a deterministic outcome
/// that a retry cannot change.
#[must_use]
pub fn is_retryable(error: &PaymentsError) -> bool {
    match error {
        PaymentsError::Network { status, .. } => match status {
            // 4xx means the request itself is bad.
            Some(code) => (500..600).contains(&u32::from(*code)),
            // Connection-level failure with no response at all.
            None => true,
        },
        PaymentsError::Validation(_) | PaymentsError::Api { .. } | PaymentsError::Config(_) => {
            false
        }
    }
}

/// Executes `operation` with exponential backoff retry.
///
/// Retries up to `policy.max_attempts` total attempts, sleeping between them,
/// but only while `retryable` classifies the error as transient. The last
/// error is returned once attempts are exhausted or a non-retryable error
/// occurs.
///
/// # Errors
///
/// Returns the final error produced by `operation`.
pub(crate) async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    retryable: impl Fn(&PaymentsError) -> bool,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                let last_attempt = attempt + 1 >= max_attempts;
                if last_attempt || !retryable(&error) {
                    return Err(error);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient request failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("loop returns on the last attempt")
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use super::*;

    fn transient() -> PaymentsError {
        PaymentsError::Network { message: "connection reset".into(), status: None, source: None }
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay_ms, 100);
        assert_eq!(policy.max_delay_ms, 5000);
        assert!((policy.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_policy_from_toml() {
        let policy: RetryPolicy = toml::from_str(
            "max_attempts = 5\ninitial_delay_ms = 50\n",
        )
        .unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay_ms, 50);
        assert_eq!(policy.max_delay_ms, 5000); // default
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy { max_delay_ms: 1000, ..RetryPolicy::default() };
        assert_eq!(policy.delay_for_attempt(20), Duration::from_millis(1000));
    }

    #[test]
    fn test_is_retryable_classification() {
        assert!(is_retryable(&transient()));
        assert!(is_retryable(&PaymentsError::Network {
            message: "status 503".into(),
            status: Some(503),
            source: None,
        }));
        assert!(!is_retryable(&PaymentsError::Network {
            message: "status 400".into(),
            status: Some(400),
            source: None,
        }));
        assert!(!is_retryable(&PaymentsError::Validation("bad".into())));
        assert!(!is_retryable(&PaymentsError::Api {
            code: "1".into(),
            message: "rejected".into(),
            details: None,
        }));
        assert!(!is_retryable(&PaymentsError::Config("missing".into())));
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let policy = RetryPolicy::with_max_attempts(3);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result = retry_with_backoff(&policy, is_retryable, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<i32, PaymentsError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            ..RetryPolicy::default()
        };
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result = retry_with_backoff(&policy, is_retryable, || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_attempts_exhausted() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay_ms: 1,
            ..RetryPolicy::default()
        };
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<i32> = retry_with_backoff(&policy, is_retryable, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let policy = RetryPolicy::with_max_attempts(5);
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<i32> = retry_with_backoff(&policy, is_retryable, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(PaymentsError::Api {
                    code: "9999".into(),
                    message: "rejected".into(),
                    details: None,
                })
            }
        })
        .await;

        assert!(matches!(result, Err(PaymentsError::Api { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_treated_as_one() {
        let policy = RetryPolicy { max_attempts: 0, ..RetryPolicy::default() };
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<i32> = retry_with_backoff(&policy, is_retryable, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
