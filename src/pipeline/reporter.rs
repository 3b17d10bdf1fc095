//! # Pipeline error reporting.
//!
//! Errors travelling through a pipeline are logged at the point they are
//! intercepted and then passed on **unchanged**: reporting never swallows,
//! wraps or replaces an error.
//!
//! ## Contents
//! - [`report_pipeline_error`] log an error and hand it back
//! - [`intercept`] the same, applied to a `Result`
//! - [`Reporting`] observer wrapper that reports `on_error` before forwarding
//! - [`log_subscription_error`] ready-made `on_error` callback
//!
//! ## Example
//! ```rust
//! use eventcast::{intercept, StreamError};
//!
//! fn parse(raw: &str) -> Result<u64, StreamError> {
//!     raw.parse().map_err(|_| StreamError::fail(format!("bad quantity {raw:?}")))
//! }
//!
//! // Logged at ERROR, returned as-is.
//! let out = intercept(parse("ten"));
//! assert_eq!(out, Err(StreamError::fail("bad quantity \"ten\"")));
//! ```

use std::fmt::Display;

use crate::error::StreamError;
use crate::observers::Observer;

/// Logs `err` at ERROR and returns it unchanged.
pub fn report_pipeline_error<E: Display>(err: E) -> E {
    tracing::error!("Intercepted error in observable pipeline: {err}");
    err
}

/// Reports the error of a failed `result`; successful results pass untouched.
pub fn intercept<T, E: Display>(result: Result<T, E>) -> Result<T, E> {
    result.map_err(report_pipeline_error)
}

/// Logs a subscription error at ERROR. Meant as an `on_error` callback.
pub fn log_subscription_error(error: &StreamError) {
    tracing::error!(label = error.as_label(), "Observable subscription error: {error}");
}

/// Observer wrapper that reports stream errors before forwarding them.
///
/// Items and completion pass straight through.
pub struct Reporting<O> {
    inner: O,
}

impl<O> Reporting<O> {
    /// Wraps `inner`.
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    /// The wrapped observer.
    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<T, O> Observer<T> for Reporting<O>
where
    O: Observer<T>,
{
    fn on_item(&self, item: T) {
        self.inner.on_item(item);
    }

    fn on_error(&self, error: &StreamError) {
        tracing::error!(
            subscriber = %self.inner.name(),
            "Intercepted error in observable pipeline: {error}"
        );
        self.inner.on_error(error);
    }

    fn on_completed(&self) {
        self.inner.on_completed();
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
