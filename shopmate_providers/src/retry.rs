use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// How often and how patiently a failed request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Retry an async operation with exponential backoff.
///
/// # Arguments
/// * `operation` - The async operation to retry
/// * `policy` - Number of retries and base delay
/// * `should_retry` - Errors for which this returns `false` are returned at once
///
/// # Returns
/// The result of the first successful attempt, or the last error
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    mut operation: F,
    policy: &RetryPolicy,
    should_retry: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    R: Fn(&E) -> bool,
{
    let total = policy.max_retries.saturating_add(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < total && should_retry(&e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Request failed (attempt {}/{}): {e}. Retrying after {}ms...",
                    attempt,
                    total,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopmate_core::GenError;
    use std::sync::atomic::{AtomicU32, Ordering};

    const FAST: RetryPolicy = RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(1),
    };

    /// Fails with `error` for the first `failures` calls, then answers.
    async fn run_flaky(
        failures: u32,
        error: GenError,
        policy: &RetryPolicy,
    ) -> (Result<&'static str, GenError>, u32) {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst);
                let error = error.clone();
                async move {
                    if call < failures {
                        Err(error)
                    } else {
                        Ok("recommendation")
                    }
                }
            },
            policy,
            GenError::is_retryable,
        )
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_returned_directly() {
        let (result, calls) = run_flaky(0, GenError::Timeout, &FAST).await;
        assert_eq!(result, Ok("recommendation"));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (result, calls) = run_flaky(2, GenError::RateLimited, &FAST).await;
        assert_eq!(result, Ok("recommendation"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn gives_up_after_last_retry() {
        let (result, calls) = run_flaky(10, GenError::Timeout, &FAST).await;
        assert_eq!(result, Err(GenError::Timeout));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let (result, calls) = run_flaky(10, GenError::Auth("bad key".into()), &FAST).await;
        assert!(matches!(result, Err(GenError::Auth(_))));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn none_policy_runs_once() {
        let (result, calls) = run_flaky(1, GenError::Timeout, &RetryPolicy::none()).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }
}
