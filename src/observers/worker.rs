//! # Latest-wins delivery on a dedicated tokio task.
//!
//! [`LatestWorker`] is the asynchronous flavour of [`Latest`](crate::Latest):
//! the producer side is a plain [`Observer`] that never waits, while a spawned
//! worker drives an [`AsyncObserver`] one item at a time.
//!
//! ## Architecture
//! ```text
//! publish(item) ──► LatestWorker::on_item ──► [pending slot] ──notify──► worker task
//!                   (never blocks)             (1 item, newest wins)        │
//!                                                                           ▼
//!                                                          AsyncObserver::on_item().await
//!                                                           └─► panic caught → warn!
//! ```
//!
//! ## Rules
//! - At most one item waits; a newer item overwrites it (counted in [`LatestWorker::dropped`]).
//! - A terminal signal (error/completion) is never dropped: the worker delivers the
//!   pending item first, then the terminal signal, then exits.
//! - [`LatestWorker::dispose`] cancels the worker: an in-flight `on_item` finishes,
//!   nothing new starts.
//! - Dropping the handle closes the slot: the worker delivers what is already
//!   waiting, then exits and releases the observer. A token passed to
//!   [`LatestWorker::spawn_with_token`] is left untouched.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use eventcast::{AsyncObserver, EventSource, LatestWorker};
//!
//! struct Repricer;
//!
//! #[async_trait]
//! impl AsyncObserver<f64> for Repricer {
//!     async fn on_item(&self, price: f64) {
//!         // place/cancel orders; may take longer than the tick interval
//!         let _ = price;
//!     }
//!     fn name(&self) -> &str { "repricer" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = EventSource::<f64>::new();
//! let worker = Arc::new(LatestWorker::<f64>::spawn(Arc::new(Repricer)));
//! let _sub = source.subscribe(worker.clone());
//! source.publish(101.25);
//! source.signal_completion();
//! worker.join().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::disposal::Dispose;
use crate::error::{DisposeError, StreamError};
use crate::isolate::panic_message;
use crate::observers::Observer;

/// Asynchronous observer driven by a [`LatestWorker`].
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; panics are caught and logged.
#[async_trait]
pub trait AsyncObserver<T>: Send + Sync + 'static {
    /// Processes one item. Items arriving meanwhile collapse to the newest.
    async fn on_item(&self, item: T);

    /// Receives the terminal stream error. Default: no-op.
    async fn on_error(&self, _error: &StreamError) {}

    /// Receives the terminal completion signal. Default: no-op.
    async fn on_completed(&self) {}

    /// Returns the observer name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

enum Terminal {
    Error(StreamError),
    Completed,
}

enum Next<T> {
    Item(T),
    Terminal(Terminal),
    /// Slot closed with nothing left to deliver.
    Closed,
}

struct Slot<T> {
    pending: Option<T>,
    terminal: Option<Terminal>,
    closed: bool,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    notify: Notify,
    dropped: AtomicU64,
}

impl<T> Shared<T> {
    fn take_next(&self) -> Option<Next<T>> {
        let mut slot = self.slot.lock();
        if let Some(item) = slot.pending.take() {
            return Some(Next::Item(item));
        }
        if let Some(terminal) = slot.terminal.take() {
            return Some(Next::Terminal(terminal));
        }
        slot.closed.then_some(Next::Closed)
    }
}

/// Producer handle of a latest-wins worker task.
pub struct LatestWorker<T> {
    name: String,
    shared: Arc<Shared<T>>,
    token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T> LatestWorker<T>
where
    T: Send + 'static,
{
    /// Spawns the worker task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime (as [`tokio::spawn`] does).
    pub fn spawn(observer: Arc<dyn AsyncObserver<T>>) -> Self {
        Self::spawn_with_token(observer, CancellationToken::new())
    }

    /// Spawns the worker task bound to an existing cancellation token.
    ///
    /// Cancelling `token` (or a parent of it) stops the worker like [`Self::dispose`].
    pub fn spawn_with_token(observer: Arc<dyn AsyncObserver<T>>, token: CancellationToken) -> Self {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                pending: None,
                terminal: None,
                closed: false,
            }),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        });
        let name = observer.name().to_string();
        let handle = tokio::spawn(run_worker(observer, Arc::clone(&shared), token.clone()));

        Self {
            name,
            shared,
            token,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Number of items overwritten before the worker could take them.
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// True once the worker stopped accepting items (terminal signal or disposal).
    pub fn is_closed(&self) -> bool {
        self.shared.slot.lock().closed || self.token.is_cancelled()
    }

    /// Cancels the worker; an in-flight delivery finishes, nothing new starts.
    pub fn dispose(&self) {
        self.shared.slot.lock().closed = true;
        self.token.cancel();
    }

    /// Waits for the worker task to exit.
    ///
    /// Returns immediately if already joined.
    pub async fn join(&self) {
        let handle = self.handle.lock().take();
        if let Some(h) = handle {
            let _ = h.await;
        }
    }

    /// Disposes the worker and waits for it to exit.
    pub async fn shutdown(&self) {
        self.dispose();
        self.join().await;
    }

    fn close_with(&self, terminal: Terminal) {
        {
            let mut slot = self.shared.slot.lock();
            if slot.closed {
                return;
            }
            slot.closed = true;
            slot.terminal = Some(terminal);
        }
        self.shared.notify.notify_one();
    }
}

impl<T> Observer<T> for LatestWorker<T>
where
    T: Send + 'static,
{
    fn on_item(&self, item: T) {
        {
            let mut slot = self.shared.slot.lock();
            if slot.closed {
                return;
            }
            if slot.pending.replace(item).is_some() {
                let dropped = self.shared.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(subscriber = %self.name, dropped, "item skipped");
            }
        }
        self.shared.notify.notify_one();
    }

    fn on_error(&self, error: &StreamError) {
        self.close_with(Terminal::Error(error.clone()));
    }

    fn on_completed(&self) {
        self.close_with(Terminal::Completed);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Drop for LatestWorker<T> {
    fn drop(&mut self) {
        self.shared.slot.lock().closed = true;
        self.shared.notify.notify_one();
    }
}

impl<T> Dispose for LatestWorker<T>
where
    T: Send + 'static,
{
    fn dispose(&self) -> Result<(), DisposeError> {
        LatestWorker::dispose(self);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

async fn run_worker<T: Send + 'static>(
    observer: Arc<dyn AsyncObserver<T>>,
    shared: Arc<Shared<T>>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = shared.notify.notified() => {}
        }

        while let Some(next) = shared.take_next() {
            if token.is_cancelled() {
                return;
            }
            match next {
                Next::Item(item) => {
                    let fut = observer.on_item(item);
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::warn!(
                            subscriber = %observer.name(),
                            "on_item panicked: {}",
                            panic_message(panic_err.as_ref())
                        );
                    }
                }
                Next::Terminal(terminal) => {
                    let fut = async {
                        match &terminal {
                            Terminal::Error(e) => observer.on_error(e).await,
                            Terminal::Completed => observer.on_completed().await,
                        }
                    };
                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        tracing::warn!(
                            subscriber = %observer.name(),
                            "terminal callback panicked: {}",
                            panic_message(panic_err.as_ref())
                        );
                    }
                    return;
                }
                Next::Closed => return,
            }
        }
    }
}
