//! Propagation retry
//!
//! Some requests fail for a short while after a dependency was created
//! elsewhere (an IAM role not yet visible, a freshly created portfolio not yet
//! replicated). Those requests are retried a bounded number of times with a
//! fixed delay, independent of the lifecycle poller.

use std::future::Future;
use std::time::Duration;

use stratus_common::{Error, PropagationConfig, Result};
use tracing::debug;

/// Retry policy for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&PropagationConfig::default())
    }
}

impl From<&PropagationConfig> for RetryConfig {
    fn from(config: &PropagationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.delay(),
        }
    }
}

impl RetryConfig {
    /// Run `op`, retrying while `retryable` holds for the error it returns.
    /// The last error is returned once attempts are exhausted.
    pub async fn run<T, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&Error) -> bool,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(v) => return Ok(v),
                Err(err) if attempt < self.max_attempts && retryable(&err) => {
                    debug!(
                        "Retrying after propagation error (attempt {}/{}): {}",
                        attempt, self.max_attempts, err
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use stratus_common::ApiError;

    fn policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            delay: Duration::from_secs(2),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_propagation() {
        let calls = AtomicU32::new(0);
        let value = policy(5)
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < 2 {
                            Err(ApiError::not_found("ResourceNotFoundException", "portfolio").into())
                        } else {
                            Ok(n)
                        }
                    }
                },
                Error::is_not_found,
            )
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let err = policy(3)
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(ApiError::not_found("ResourceNotFoundException", "x").into()) }
                },
                Error::is_not_found,
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_retry_other_errors() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let err = policy(5)
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(ApiError::validation("InvalidParametersException", "bad type").into()) }
                },
                Error::is_not_found,
            )
            .await
            .unwrap_err();

        assert!(!err.is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_from_config() {
        let cfg = PropagationConfig {
            max_attempts: 0,
            delay_ms: 10,
        };
        let retry = RetryConfig::from(&cfg);
        assert_eq!(retry.max_attempts, 1);
        assert_eq!(retry.delay, Duration::from_millis(10));
    }
}
