//! Pipeline error handling: reporting and retry.
//!
//! This module groups what happens to an error *inside* a pipeline: it is logged
//! where it is intercepted and, for operations that can be re-run, retried with
//! backoff.
//!
//! ## Contents
//! - [`report_pipeline_error`] / [`intercept`] log and pass an error through unchanged
//! - [`Reporting`] observer wrapper reporting `on_error` before forwarding
//! - [`log_subscription_error`] `on_error` callback that only logs
//! - [`RetryPolicy`] attempt budget + [`BackoffPolicy`] delays + [`Jitter`]
//! - [`retry`] / [`retry_stream`] async retry loop with cancellation
//!
//! ## Quick wiring
//! ```text
//! transport connect ──► retry_stream(policy, token, connect)
//!                          ├─ Ok(feed)  ─► feed.publish(...) ─► EventSource
//!                          └─ Err(e)    ─► source.signal_error(e.into_last())
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 5 attempts.
//! - `BackoffPolicy::default()` → first=500ms, factor=2.0, max=30s, jitter=Equal.

mod backoff;
mod reporter;
mod retry;

pub use backoff::{BackoffPolicy, Jitter};
pub use reporter::{intercept, log_subscription_error, report_pipeline_error, Reporting};
pub use retry::{retry, retry_stream, RetryPolicy};
