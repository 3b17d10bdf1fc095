//! # Failure isolation for user callbacks.
//!
//! Every place that calls into user code (observer callbacks, cleanup actions)
//! goes through [`isolate`], which turns both an `Err` return and a panic into
//! a [`Failure`] value the caller can log.
//!
//! ```text
//! isolate(|| callback(item))
//!     ├─ returns ()/Ok(())  ─► Ok(())
//!     ├─ returns Err(e)     ─► Err(Failure::Error(e.to_string()))
//!     └─ panics             ─► Err(Failure::Panicked(payload))
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if the callback uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Result type a callback may return.
///
/// Implemented for `()` (infallible callbacks) and `Result<(), E>` for any
/// displayable `E`, so closures can be written either way.
pub trait CallbackOutcome {
    /// Converts the callback's return value into a plain result.
    fn into_outcome(self) -> Result<(), String>;
}

impl CallbackOutcome for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> CallbackOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

/// Why an isolated call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    Error(String),
    Panicked(String),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(msg) => write!(f, "{msg}"),
            Failure::Panicked(info) => write!(f, "panicked: {info}"),
        }
    }
}

/// Runs `f`, catching panics and mapping an `Err` outcome into [`Failure`].
pub(crate) fn isolate<F, R>(f: F) -> Result<(), Failure>
where
    F: FnOnce() -> R,
    R: CallbackOutcome,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome.into_outcome().map_err(Failure::Error),
        Err(payload) => Err(Failure::Panicked(panic_message(payload.as_ref()))),
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
