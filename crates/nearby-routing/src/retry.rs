//! Retry with exponential back-off and jitter for routing requests.
//!
//! Only transport-level hiccups are retried. A "no route" answer or a body
//! that does not parse will not change on a second attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::RoutingError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for timeouts, connection failures and HTTP 5xx.
pub(crate) fn is_retriable(err: &RoutingError) -> bool {
    match err {
        RoutingError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RoutingError::Deserialize { .. }
        | RoutingError::NoRoute { .. }
        | RoutingError::EmptyRoutes
        | RoutingError::InvalidBaseUrl(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The sleep before retry `n` is `backoff_base_ms * 2^(n-1)` ± 25 % jitter,
/// capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, RoutingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RoutingError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient routing error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    async fn connect_error() -> RoutingError {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1")
            .send()
            .await
            .unwrap_err();
        RoutingError::Http(err)
    }

    #[test]
    fn no_route_is_not_retriable() {
        assert!(!is_retriable(&RoutingError::NoRoute {
            code: "NoRoute".to_owned()
        }));
        assert!(!is_retriable(&RoutingError::EmptyRoutes));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        assert!(!is_retriable(&RoutingError::Deserialize {
            context: "test".to_owned(),
            source,
        }));
    }

    #[tokio::test]
    async fn connect_error_is_retriable() {
        assert!(is_retriable(&connect_error().await));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(connect_error().await)
                } else {
                    Ok(1.5_f64)
                }
            }
        })
        .await;
        assert!((result.unwrap() - 1.5).abs() < f64::EPSILON);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_no_route() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<f64, _>(RoutingError::NoRoute {
                    code: "NoRoute".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RoutingError::NoRoute { .. })));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<f64, _>(connect_error().await)
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(RoutingError::Http(_))));
    }
}
