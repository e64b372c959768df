//! Bounded retry shared by every retried operation in the service.
//!
//! Attempts are immediate (no backoff) and bounded purely by count. The
//! policy's `classify` hook decides whether a given failure is worth another
//! attempt; fatal failures end the loop early.

use std::fmt::Display;
use std::future::Future;

use thiserror::Error;
use tracing::warn;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Retryable,
    Fatal,
}

/// `{max_attempts, classify}`; `max_attempts` is clamped to at least one.
pub struct RetryPolicy<E> {
    max_attempts: u32,
    classify: fn(&E) -> ErrorClass,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryPolicy<E> {}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

fn always_retry<E>(_: &E) -> ErrorClass {
    ErrorClass::Retryable
}

impl<E> RetryPolicy<E> {
    /// Retries every failure, up to `max_attempts` total attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            classify: always_retry::<E>,
        }
    }

    pub fn with_classifier(mut self, classify: fn(&E) -> ErrorClass) -> Self {
        self.classify = classify;
        self
    }
}

/// Returned when no attempt succeeded.
#[derive(Debug, Error)]
#[error("{label} gave up after {attempts} attempt(s): {last_error}")]
pub struct RetryError<E: Display> {
    pub label: String,
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` until it succeeds, the policy says stop, or attempts run out.
///
/// `op` receives the 1-based attempt number.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy<E>,
    label: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let class = (policy.classify)(&e);
                warn!(
                    "{} attempt {}/{} failed: {}",
                    label, attempt, policy.max_attempts, e
                );
                if class == ErrorClass::Fatal || attempt >= policy.max_attempts {
                    return Err(RetryError {
                        label: label.to_string(),
                        attempts: attempt,
                        last_error: e,
                    });
                }
                attempt += 1;
            }
        }
    }
}
