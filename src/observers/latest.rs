//! # Latest-wins backpressure wrapper.
//!
//! [`Latest`] sits between a fast producer and a slow observer. While the
//! observer is busy with item N, newer items overwrite a single pending slot;
//! once the observer returns, only the most recent pending item is delivered.
//! Intermediate items are dropped, never queued.
//!
//! ## State machine
//! ```text
//!            item                     item (busy)
//!   Idle ───────────► Delivering ◄──────────────── pending = item
//!    ▲                   │
//!    │  returned,        │ returned, pending = Some(next)
//!    │  pending = None   └──────────► deliver(next)
//!    └───────────────────┘
//! ```
//!
//! ## Rules
//! - The Idle→Delivering check and the pending-slot replacement happen under one
//!   lock, so two concurrent publishers can never both start a delivery.
//! - The thread that finds the wrapper Idle performs the delivery and drains the
//!   pending slot before returning; other threads return immediately.
//! - Errors and completion are never dropped. On an idle wrapper they are
//!   forwarded at once; during a delivery they are parked and the delivering
//!   thread forwards them after the pending item.
//! - After a terminal signal every later item or terminal signal is ignored.
//! - A panicking observer is caught and logged; the wrapper returns to Idle.
//! - [`Latest::dispose`] lets an in-flight delivery finish, discards the pending
//!   item and starts no new deliveries.
//!
//! ## Example
//! ```rust
//! use eventcast::{latest_fn, EventSource};
//!
//! let source = EventSource::<u64>::new();
//! let _sub = source.subscribe(latest_fn(|block: u64| {
//!     // slow work: only the newest block height is processed after it returns
//!     let _ = block;
//! }));
//! source.publish(1);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::disposal::Dispose;
use crate::error::{DisposeError, StreamError};
use crate::isolate::{isolate, CallbackOutcome};
use crate::observers::{FnObserver, Observer};

enum Terminal {
    Error(StreamError),
    Completed,
}

struct Slot<T> {
    delivering: bool,
    pending: Option<T>,
    terminal: Option<Terminal>,
    closed: bool,
}

/// Observer wrapper applying the "keep latest, drop the rest" policy.
pub struct Latest<T, O> {
    inner: O,
    slot: Mutex<Slot<T>>,
    dropped: AtomicU64,
    disposed: AtomicBool,
}

impl<T, O> Latest<T, O>
where
    O: Observer<T>,
{
    /// Wraps `inner`.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            slot: Mutex::new(Slot {
                delivering: false,
                pending: None,
                terminal: None,
                closed: false,
            }),
            dropped: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Number of items overwritten in the pending slot so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// True while a delivery to the wrapped observer is in progress.
    pub fn is_delivering(&self) -> bool {
        self.slot.lock().delivering
    }

    /// Stops further deliveries; an in-flight delivery is allowed to finish.
    ///
    /// A pending item or parked terminal signal is discarded.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let mut slot = self.slot.lock();
        slot.pending = None;
        slot.terminal = None;
    }

    /// Returns the wrapped observer.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Forwards `terminal` now if idle, otherwise parks it for the delivering thread.
    fn close_with(&self, terminal: Terminal) {
        {
            let mut slot = self.slot.lock();
            if slot.closed || self.disposed.load(Ordering::SeqCst) {
                return;
            }
            slot.closed = true;
            if slot.delivering {
                slot.terminal = Some(terminal);
                return;
            }
        }
        self.forward(terminal);
    }

    fn forward(&self, terminal: Terminal) {
        let outcome = match &terminal {
            Terminal::Error(error) => isolate(|| self.inner.on_error(error)),
            Terminal::Completed => isolate(|| self.inner.on_completed()),
        };
        if let Err(failure) = outcome {
            tracing::warn!(
                subscriber = %self.inner.name(),
                "terminal callback failed: {failure}"
            );
        }
    }

    fn deliver(&self, item: T) {
        if let Err(failure) = isolate(|| self.inner.on_item(item)) {
            tracing::warn!(
                subscriber = %self.inner.name(),
                "latest-wins delivery failed: {failure}"
            );
        }
    }
}

impl<T, O> Observer<T> for Latest<T, O>
where
    T: Send + 'static,
    O: Observer<T>,
{
    fn on_item(&self, item: T) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        {
            let mut slot = self.slot.lock();
            if slot.closed {
                return;
            }
            if slot.delivering {
                if slot.pending.replace(item).is_some() {
                    let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::trace!(subscriber = %self.inner.name(), dropped, "item skipped");
                }
                return;
            }
            slot.delivering = true;
        }

        let mut next = item;
        loop {
            self.deliver(next);

            let terminal = {
                let mut slot = self.slot.lock();
                if self.disposed.load(Ordering::SeqCst) {
                    slot.pending = None;
                    slot.terminal = None;
                }
                if let Some(item) = slot.pending.take() {
                    next = item;
                    continue;
                }
                slot.delivering = false;
                slot.terminal.take()
            };
            if let Some(terminal) = terminal {
                self.forward(terminal);
            }
            return;
        }
    }

    fn on_error(&self, error: &StreamError) {
        self.close_with(Terminal::Error(error.clone()));
    }

    fn on_completed(&self) {
        self.close_with(Terminal::Completed);
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<T, O> Dispose for Latest<T, O>
where
    T: Send + 'static,
    O: Observer<T>,
{
    fn dispose(&self) -> Result<(), DisposeError> {
        Latest::dispose(self);
        Ok(())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Builds a latest-wins observer from an item callback.
///
/// Shorthand for `Arc::new(Latest::new(FnObserver::new(on_item)))`.
pub fn latest_fn<T, F, R>(on_item: F) -> Arc<Latest<T, FnObserver<T>>>
where
    T: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
    R: CallbackOutcome,
{
    Arc::new(Latest::new(FnObserver::new(on_item).with_name("latest")))
}
