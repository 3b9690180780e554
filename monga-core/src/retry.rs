//! Bounded retries for writes interrupted by a replica set failover.
//!
//! A write that hits a "not primary" class failure is retried up to
//! `max_retries` more times. Any other failure, or the failure that exhausts
//! the budget, is returned to the caller as-is. There is no backoff between
//! attempts.

use std::future::Future;

use log::warn;

/// Server error codes reported while the contacted node is not (or no longer)
/// the primary.
pub const NOT_PRIMARY_CODES: [i32; 3] = [10107, 13435, 10058];

pub fn is_not_primary_code(code: i32) -> bool {
    NOT_PRIMARY_CODES.contains(&code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy { max_retries: 1 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        RetryPolicy { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs `operation`, re-running it while `is_retryable` accepts the error
    /// and the retry budget lasts.
    ///
    /// # Arguments
    ///
    /// * `is_retryable` - Classifies a failure as transient.
    /// * `operation` - Produces a fresh attempt each time it is called.
    pub async fn run<T, E, C, F, Fut>(&self, is_retryable: C, mut operation: F) -> Result<T, E>
    where
        C: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_retries && is_retryable(&error) => {
                    attempt += 1;
                    warn!(
                        "retrying write after transient failure ({attempt}/{}): {error}",
                        self.max_retries
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Failure(i32);

    impl std::fmt::Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "code {}", self.0)
        }
    }

    fn transient(failure: &Failure) -> bool {
        is_not_primary_code(failure.0)
    }

    #[test]
    fn test_not_primary_codes() {
        assert!(is_not_primary_code(10107));
        assert!(is_not_primary_code(13435));
        assert!(is_not_primary_code(10058));
        assert!(!is_not_primary_code(11000));
    }

    #[tokio::test]
    async fn test_success_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::default()
            .run(transient, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Failure>(7)
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(2)
            .run(transient, move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Failure(10107))
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(1)
            .run(transient, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Failure(13435))
            })
            .await;

        assert_eq!(result, Err(Failure(13435)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_failures_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(5)
            .run(transient, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Failure(11000))
            })
            .await;

        assert_eq!(result, Err(Failure(11000)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = RetryPolicy::new(0)
            .run(transient, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Failure(10107))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
