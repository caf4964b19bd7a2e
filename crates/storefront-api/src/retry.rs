//! Caller-level retry for transient failures.
//!
//! The HTTP client core only ever retries a request once after a token
//! refresh. Callers that want to ride out flaky networks or a restarting
//! backend wrap the call in [`with_retries`].

use auth_session::ApiResult;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy for [`RetryConfig::run`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let delay_ms = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }

    /// Run `op`, re-invoking it while it fails with a transient error.
    ///
    /// Non-transient errors (4xx, 401 after refresh, decode failures) are
    /// returned at once.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for_attempt(attempt);
                    attempt += 1;
                    debug!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if attempt > 0 {
                        warn!(attempts = attempt + 1, "Giving up: {}", e);
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// [`RetryConfig::run`] with the default backoff and `retries` extra attempts.
pub async fn with_retries<T, F, Fut>(retries: u32, op: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    RetryConfig::with_max_retries(retries).run(op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_session::{ApiError, TransportError};
    use serde_json::Value;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            path: "/api/products".to_string(),
            body: Value::Null,
        }
    }

    #[test]
    fn test_delay_for_attempt() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(5000));
        assert_eq!(config.delay_for_attempt(90), Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retries(3, move || {
            let counter = counter.clone();
            async move {
                match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(ApiError::Transport(TransportError::Timeout)),
                    1 => Err(status(503)),
                    _ => Ok("ok"),
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: ApiResult<()> = with_retries(5, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(status(422)) }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(422));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = tokio::time::Instant::now();

        let result: ApiResult<()> = with_retries(2, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(status(502)) }
        })
        .await;

        assert_eq!(result.unwrap_err().status(), Some(502));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 500ms + 1000ms of backoff on the paused clock.
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let result: ApiResult<()> =
            with_retries(0, || async { Err(ApiError::Transport(TransportError::Timeout)) }).await;
        assert!(matches!(
            result,
            Err(ApiError::Transport(TransportError::Timeout))
        ));
    }
}
