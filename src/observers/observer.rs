//! # Observer contract.
//!
//! [`Observer`] is the three-method capability set every sink and every wrapper
//! satisfies. Sources call it synchronously, on the publishing thread.
//!
//! ## Rules
//! - `on_error` and `on_completed` are terminal: a well-behaved source delivers
//!   nothing afterwards. Implementations must still tolerate a late `on_item`.
//! - Failures inside an observer never reach the publisher: sources and adapters
//!   catch them and log (see [`FnObserver`](crate::FnObserver)).
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use eventcast::{Observer, StreamError};
//!
//! struct TickCounter(AtomicUsize);
//!
//! impl Observer<f64> for TickCounter {
//!     fn on_item(&self, _price: f64) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!     fn on_error(&self, _error: &StreamError) {}
//!     fn on_completed(&self) {}
//!     fn name(&self) -> &str { "tick-counter" }
//! }
//! ```

use std::sync::Arc;

use crate::error::StreamError;

/// Receiver of a stream of items.
pub trait Observer<T>: Send + Sync + 'static {
    /// Receives the next item.
    fn on_item(&self, item: T);

    /// Receives a terminal stream error.
    fn on_error(&self, error: &StreamError);

    /// Receives the terminal completion signal.
    fn on_completed(&self);

    /// Returns the observer name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a type-erased observer.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

impl<T, O> Observer<T> for Arc<O>
where
    O: Observer<T> + ?Sized,
{
    fn on_item(&self, item: T) {
        (**self).on_item(item)
    }

    fn on_error(&self, error: &StreamError) {
        (**self).on_error(error)
    }

    fn on_completed(&self) {
        (**self).on_completed()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
