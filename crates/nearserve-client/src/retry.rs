//! Back-off policy for provider searches.
//!
//! Only the provider search goes through [`retry_with_backoff`]. Geocoding is
//! never retried; it runs under a single deadline instead.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Longest pause between two provider search attempts, before jitter.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Whether another attempt could plausibly succeed: the request never got an
/// answer, or the backend answered with a 5xx.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::Timeout { .. } => true,
        ClientError::Server { status, .. } => *status >= 500,
        ClientError::NotFound { .. }
        | ClientError::Deserialize { .. }
        | ClientError::InvalidBaseUrl { .. } => false,
    }
}

/// Calls `operation` until it succeeds, fails with a non-retriable error, or
/// `max_retries` extra attempts have been spent.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retries_left = max_retries;
    let mut attempt = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries_left == 0 || !is_retriable(&err) {
            return Err(err);
        }
        retries_left -= 1;
        attempt += 1;

        let delay = backoff_delay(backoff_base_ms, attempt, rand::random::<f64>());
        tracing::warn!(
            attempt,
            retries_left,
            delay_ms = delay.as_millis(),
            error = %err,
            "provider search hit a transient error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

/// `base_ms` doubled per earlier retry, capped at [`MAX_BACKOFF`], then
/// scaled into 75..125 % by `jitter` (a sample from `[0, 1)`).
fn backoff_delay(base_ms: u64, attempt: u32, jitter: f64) -> Duration {
    let doublings = attempt.saturating_sub(1).min(16);
    let nominal = Duration::from_millis(base_ms.saturating_mul(1u64 << doublings)).min(MAX_BACKOFF);
    nominal.mul_f64(0.75 + jitter.clamp(0.0, 1.0) * 0.5)
}
