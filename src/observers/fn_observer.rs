//! # Function-backed observer (`FnObserver`)
//!
//! [`FnObserver`] turns up to three independent closures into one [`Observer`].
//! This is mostly for components (like [`Latest`](crate::Latest) or
//! [`EventSource::subscribe`](crate::EventSource::subscribe)) that take observers
//! rather than their component functions.
//!
//! ## Isolation
//! Each closure call is wrapped individually. A closure that returns `Err` or
//! panics is logged at WARN and the observer keeps working for later items:
//! one subscriber's bug never reaches the publisher or its siblings.
//!
//! ## Example
//! ```rust
//! use eventcast::{FnObserver, Observer, StreamError};
//!
//! let obs = FnObserver::new(|price: f64| {
//!     if price < 0.0 {
//!         return Err(format!("negative price {price}"));
//!     }
//!     Ok(())
//! })
//! .with_on_error(|e: &StreamError| eprintln!("feed failed: {e}"))
//! .with_name("price-checker");
//!
//! obs.on_item(-1.0); // logged, not raised
//! obs.on_item(101.5);
//! ```

use std::borrow::Cow;

use crate::error::StreamError;
use crate::isolate::{isolate, CallbackOutcome};
use crate::observers::Observer;

type ItemFn<T> = Box<dyn Fn(T) -> Result<(), String> + Send + Sync>;
type ErrorFn = Box<dyn Fn(&StreamError) -> Result<(), String> + Send + Sync>;
type CompletedFn = Box<dyn Fn() -> Result<(), String> + Send + Sync>;

/// Observer built from closures; missing callbacks default to no-ops.
pub struct FnObserver<T> {
    name: Cow<'static, str>,
    on_item: ItemFn<T>,
    on_error: ErrorFn,
    on_completed: CompletedFn,
}

impl<T> FnObserver<T> {
    /// Creates an observer with the required item callback.
    ///
    /// The callback may return `()` or `Result<(), E>` with `E: Display`.
    pub fn new<F, R>(on_item: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        Self {
            name: Cow::Borrowed("FnObserver"),
            on_item: Box::new(move |item| on_item(item).into_outcome()),
            on_error: Box::new(|_: &StreamError| Ok(())),
            on_completed: Box::new(|| Ok(())),
        }
    }

    /// Sets the error callback (default: ignore).
    #[must_use]
    pub fn with_on_error<F, R>(mut self, on_error: F) -> Self
    where
        F: Fn(&StreamError) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        self.on_error = Box::new(move |e: &StreamError| on_error(e).into_outcome());
        self
    }

    /// Sets the completion callback (default: ignore).
    #[must_use]
    pub fn with_on_completed<F, R>(mut self, on_completed: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        self.on_completed = Box::new(move || on_completed().into_outcome());
        self
    }

    /// Sets the name used in warnings.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T: 'static> Observer<T> for FnObserver<T> {
    fn on_item(&self, item: T) {
        if let Err(failure) = isolate(|| (self.on_item)(item)) {
            tracing::warn!(
                subscriber = %self.name,
                callback = "on_item",
                "callable raised: {failure}"
            );
        }
    }

    fn on_error(&self, error: &StreamError) {
        if let Err(failure) = isolate(|| (self.on_error)(error)) {
            tracing::warn!(
                subscriber = %self.name,
                callback = "on_error",
                "callable raised: {failure}"
            );
        }
    }

    fn on_completed(&self) {
        if let Err(failure) = isolate(|| (self.on_completed)()) {
            tracing::warn!(
                subscriber = %self.name,
                callback = "on_completed",
                "callable raised: {failure}"
            );
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_failing_item_callback_keeps_observer_usable() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let obs = FnObserver::new(move |n: u32| {
            if n % 2 == 0 {
                panic!("even item {n}");
            }
            s.lock().push(n);
        });

        for n in 1..=5 {
            obs.on_item(n);
        }
        assert_eq!(*seen.lock(), vec![1, 3, 5]);
    }

    #[test]
    fn test_err_result_is_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let obs = FnObserver::new(move |_: &str| {
            c.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("rejected")
        });
        obs.on_item("a");
        obs.on_item("b");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_defaults_are_noops() {
        let obs = FnObserver::new(|_: u8| ());
        obs.on_error(&StreamError::fail("x"));
        obs.on_completed();
        assert_eq!(Observer::<u8>::name(&obs), "FnObserver");
    }

    #[test]
    fn test_error_and_completion_callbacks_are_isolated() {
        let completed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&completed);
        let obs = FnObserver::new(|_: u8| ())
            .with_on_error(|_: &StreamError| -> () { panic!("error handler broke") })
            .with_on_completed(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .with_name("isolated");

        obs.on_error(&StreamError::transport("down"));
        obs.on_completed();
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(Observer::<u8>::name(&obs), "isolated");
    }
}
