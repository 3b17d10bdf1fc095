//! # CollectingSink: accumulate every item.
//!
//! Keeps each received item in arrival order. Mostly useful in tests and for
//! short-lived pipelines whose output is read once they complete.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::StreamError;
use crate::observers::Observer;

/// Terminal sink that stores items in arrival order.
pub struct CollectingSink<T> {
    collected: Mutex<Vec<T>>,
    error: Mutex<Option<StreamError>>,
    completed: AtomicBool,
}

impl<T> Default for CollectingSink<T> {
    fn default() -> Self {
        Self {
            collected: Mutex::new(Vec::new()),
            error: Mutex::new(None),
            completed: AtomicBool::new(false),
        }
    }
}

impl<T> CollectingSink<T> {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    pub fn collected(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.collected.lock().clone()
    }

    /// Moves the received items out, leaving the sink empty.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.collected.lock())
    }

    /// Number of items received so far.
    pub fn len(&self) -> usize {
        self.collected.lock().len()
    }

    /// True if no item is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once completion was received.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// The stream error received, if any.
    pub fn error(&self) -> Option<StreamError> {
        self.error.lock().clone()
    }
}

impl<T> Observer<T> for CollectingSink<T>
where
    T: Send + 'static,
{
    fn on_item(&self, item: T) {
        self.collected.lock().push(item);
    }

    fn on_error(&self, error: &StreamError) {
        tracing::error!(subscriber = "CollectingSink", "Received error: {error}");
        *self.error.lock() = Some(error.clone());
    }

    fn on_completed(&self) {
        self.completed.store(true, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "CollectingSink"
    }
}
