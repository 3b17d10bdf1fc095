//! # Retry stage for fallible pipeline operations.
//!
//! [`retry`] re-runs an async operation until it succeeds, the attempt budget is
//! spent, or the cancellation token fires. Every failed attempt goes through
//! [`report_pipeline_error`] before the next one is scheduled.
//!
//! ## Architecture
//! ```text
//! attempt 0 ──► op(0) ── Ok(v) ──────────────────────────► Ok(v)
//!                 │
//!                 └─ Err(e) ─► report_pipeline_error(e)
//!                                ├─ not retryable ─────────► Err(Rejected)     (retry_stream only)
//!                                ├─ attempts spent ────────► Err(Exhausted)
//!                                └─ sleep(backoff.next(n)) ─┬─► op(n + 1) ...
//!                                                           └─ token cancelled ─► Err(Cancelled)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use eventcast::{retry, BackoffPolicy, RetryPolicy};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let policy = RetryPolicy {
//!     max_attempts: 4,
//!     backoff: BackoffPolicy::constant(Duration::from_millis(1)),
//! };
//! let calls = AtomicU32::new(0);
//!
//! let snapshot = retry(&policy, &CancellationToken::new(), |attempt| {
//!     calls.fetch_add(1, Ordering::SeqCst);
//!     async move {
//!         if attempt < 2 { Err("snapshot not ready") } else { Ok(attempt) }
//!     }
//! })
//! .await;
//!
//! assert_eq!(snapshot, Ok(2));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # }
//! ```

use std::fmt::Display;
use std::future::Future;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::error::{RetryError, StreamError};
use crate::pipeline::backoff::BackoffPolicy;
use crate::pipeline::reporter::report_pipeline_error;

/// How many times to try, and how long to wait in between.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `0` means unlimited.
    pub max_attempts: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// Returns a policy with `max_attempts = 5` and [`BackoffPolicy::default`].
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries until success or cancellation.
    pub fn unlimited(backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts: 0,
            backoff,
        }
    }

    /// True if another attempt is allowed after `attempts` were made.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts == 0 || attempts < self.max_attempts
    }
}

/// Runs `op` until it succeeds, following `policy`.
///
/// `op` receives the 0-indexed attempt number. Every error is considered
/// retryable; use [`retry_stream`] to stop on fatal [`StreamError`]s.
///
/// # Errors
/// - [`RetryError::Exhausted`] when all attempts failed;
/// - [`RetryError::Cancelled`] when `token` fires before an attempt or during backoff.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    run(policy, token, op, |_| true).await
}

/// Like [`retry`], but a non-retryable [`StreamError`] ends the loop at once.
///
/// # Errors
/// Same as [`retry`], plus [`RetryError::Rejected`] for errors where
/// [`StreamError::is_retryable`] is false.
pub async fn retry_stream<T, F, Fut>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    op: F,
) -> Result<T, RetryError<StreamError>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StreamError>>,
{
    run(policy, token, op, StreamError::is_retryable).await
}

async fn run<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut op: F,
    retryable: C,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
{
    let mut attempts: u32 = 0;
    let mut last: Option<E> = None;

    loop {
        if token.is_cancelled() {
            return Err(RetryError::Cancelled { attempts, last });
        }

        let err = match op(attempts).await {
            Ok(value) => {
                if attempts > 0 {
                    tracing::debug!(
                        attempts = attempts.saturating_add(1),
                        "retried operation succeeded"
                    );
                }
                return Ok(value);
            }
            Err(e) => report_pipeline_error(e),
        };
        let delay = policy.backoff.next(attempts);
        attempts = attempts.saturating_add(1);

        if !retryable(&err) {
            return Err(RetryError::Rejected {
                attempts,
                last: err,
            });
        }
        if !policy.allows(attempts) {
            return Err(RetryError::Exhausted {
                attempts,
                last: err,
            });
        }

        tracing::debug!(attempt = attempts, ?delay, "retry scheduled");
        let sleep = time::sleep(delay);
        tokio::pin!(sleep);
        select! {
            biased;
            _ = token.cancelled() => {
                return Err(RetryError::Cancelled { attempts, last: Some(err) });
            }
            _ = &mut sleep => {}
        }
        last = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::pipeline::backoff::Jitter;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(1),
                factor: 2.0,
                jitter: Jitter::None,
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures_with_backoff() {
        let start = time::Instant::now();
        let out = retry(&policy(5), &CancellationToken::new(), |attempt| async move {
            if attempt < 2 {
                Err(format!("connect refused #{attempt}"))
            } else {
                Ok("connected")
            }
        })
        .await;

        assert_eq!(out, Ok("connected"));
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_keeps_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let out: Result<(), _> = retry(&policy(3), &CancellationToken::new(), move |attempt| {
            c.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("boom {attempt}")) }
        })
        .await;

        assert_eq!(
            out,
            Err(RetryError::Exhausted {
                attempts: 3,
                last: "boom 2".to_string()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_stream_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let out: Result<(), _> = retry_stream(&policy(0), &CancellationToken::new(), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            async { Err(StreamError::fatal("market delisted")) }
        })
        .await;

        assert_eq!(out.as_ref().map_err(RetryError::as_label), Err("retry_rejected"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_stream_error_is_retried() {
        let out = retry_stream(&policy(4), &CancellationToken::new(), |attempt| async move {
            match attempt {
                0 | 1 => Err(StreamError::transport("socket reset")),
                n => Ok(n),
            }
        })
        .await;
        assert_eq!(out, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let token = CancellationToken::new();
        let t = token.clone();
        let out: Result<(), _> = retry(&policy(0), &token, move |_| {
            t.cancel();
            async { Err("down") }
        })
        .await;

        assert_eq!(
            out,
            Err(RetryError::Cancelled {
                attempts: 1,
                last: Some("down")
            })
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let out: Result<u8, RetryError<String>> =
            retry(&policy(3), &token, |_| async { Ok(1) }).await;
        assert_eq!(out.map_err(|e| e.attempts()), Err(0));
    }

    #[test]
    fn test_policy_allows() {
        assert!(policy(2).allows(1));
        assert!(!policy(2).allows(2));
        assert!(RetryPolicy::unlimited(BackoffPolicy::default()).allows(u32::MAX));
    }
}
