//! # CaptureFirst: remember the first item that passes.
//!
//! Used as a pass-through stage (`capture_if_first`) or subscribed directly as an
//! observer. Only the first item is kept; everything after is ignored, and the
//! capture happens at most once even with concurrent callers.
//!
//! ## Example
//! ```rust
//! use eventcast::CaptureFirst;
//!
//! let first = CaptureFirst::<u32>::new();
//! let passed: Vec<u32> = [5, 7, 9].into_iter().map(|n| first.capture_if_first(n)).collect();
//!
//! assert_eq!(passed, vec![5, 7, 9]);
//! assert_eq!(first.captured(), Some(&5));
//! ```

use std::sync::OnceLock;

use crate::error::StreamError;
use crate::observers::Observer;

/// Pass-through tap that keeps a copy of the first item.
#[derive(Debug)]
pub struct CaptureFirst<T> {
    first: OnceLock<T>,
}

impl<T> Default for CaptureFirst<T> {
    fn default() -> Self {
        Self {
            first: OnceLock::new(),
        }
    }
}

impl<T> CaptureFirst<T> {
    /// Creates an empty tap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured item, if one passed already.
    pub fn captured(&self) -> Option<&T> {
        self.first.get()
    }

    /// True once an item was captured.
    pub fn has_captured(&self) -> bool {
        self.first.get().is_some()
    }
}

impl<T: Clone> CaptureFirst<T> {
    /// Stores a copy of `item` if nothing was captured yet, then returns `item` unchanged.
    pub fn capture_if_first(&self, item: T) -> T {
        if self.first.get().is_none() {
            let _ = self.first.set(item.clone());
        }
        item
    }
}

impl<T> Observer<T> for CaptureFirst<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_item(&self, item: T) {
        let _ = self.first.set(item);
    }

    fn on_error(&self, _error: &StreamError) {}

    fn on_completed(&self) {}

    fn name(&self) -> &str {
        "CaptureFirst"
    }
}
