use std::future::Future;
use std::time::Duration;

use super::ProviderError;

/// Run an idempotent provider read, retrying retryable failures up to
/// `retries` extra times with linear backoff. Writes must not use this.
pub async fn with_read_retries<T, F, Fut>(
    operation: &str,
    retries: u32,
    backoff: Duration,
    mut call: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match call().await {
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}; retrying",
                    operation,
                    attempt,
                    retries + 1,
                    err
                );
                tokio::time::sleep(backoff * attempt).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = with_read_retries("select", 2, Duration::ZERO, || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ProviderError::Timeout)
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_read_retries("select", 1, Duration::ZERO, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Rejected { status: 503, message: "busy".into() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = with_read_retries("get_user", 5, Duration::ZERO, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Rejected { status: 400, message: "bad".into() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
