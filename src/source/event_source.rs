//! # Multicast event source.
//!
//! [`EventSource`] is a hot publisher: every `publish` is delivered, on the
//! calling thread, to each observer subscribed at that moment. Nothing is
//! replayed to late subscribers.
//!
//! ## Architecture
//! ```text
//! producer ── publish(item) ──► EventSource
//!                                  │  snapshot subscribers (read lock), release lock
//!                                  ├──► observer 1.on_item(item.clone())
//!                                  ├──► observer 2.on_item(item.clone())  ── panics/Err → warn!, continue
//!                                  └──► observer N.on_item(item.clone())
//! ```
//!
//! ## Rules
//! - **Isolation**: a failing observer is logged and skipped; the publisher and
//!   the other observers are unaffected.
//! - **Per-subscriber order**: each observer sees items in publish order.
//! - **Snapshot delivery**: the subscriber set is copied under a read lock and
//!   delivered to outside of it, so observers may subscribe/unsubscribe from
//!   inside callbacks. An observer unsubscribed mid-publish is skipped.
//! - **Terminal signals**: after [`signal_error`](EventSource::signal_error) or
//!   [`signal_completion`](EventSource::signal_completion) the source is stopped;
//!   later subscribers receive the stored terminal signal immediately.
//! - **Disposal**: after [`dispose`](EventSource::dispose) every call is a logged no-op.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventcast::{CollectingSink, EventSource, SourceConfig};
//!
//! let ticks = EventSource::<f64>::with_config(SourceConfig::named("ticks"));
//! let sink = Arc::new(CollectingSink::<f64>::new());
//! let _sub = ticks.subscribe(sink.clone());
//!
//! ticks.publish(101.5_f64);
//! ticks.publish(101.75);
//! ticks.signal_completion();
//!
//! assert_eq!(sink.collected(), vec![101.5, 101.75]);
//! assert!(sink.is_completed());
//! ```

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::disposal::Dispose;
use crate::error::{DisposeError, StreamError};
use crate::isolate::{isolate, CallbackOutcome};
use crate::observers::{FnObserver, Observer, ObserverRef};
use crate::source::subscription::{Detach, Subscription};
use crate::source::SourceConfig;

struct Entry<T> {
    id: u64,
    observer: ObserverRef<T>,
    active: Arc<AtomicBool>,
}

#[derive(Clone)]
enum Status {
    Active,
    Completed,
    Failed(StreamError),
    Disposed,
}

struct State<T> {
    entries: Vec<Arc<Entry<T>>>,
    status: Status,
}

struct Inner<T> {
    name: Cow<'static, str>,
    state: RwLock<State<T>>,
    next_id: AtomicU64,
}

impl<T: 'static> Detach for Inner<T> {
    fn detach(&self, id: u64) {
        self.state.write().entries.retain(|e| e.id != id);
    }
}

/// Hot multicast publisher with per-subscriber failure isolation.
///
/// Cloning is cheap and yields another handle to the same source.
pub struct EventSource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventSource<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSource<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a source with the default [`SourceConfig`].
    pub fn new() -> Self {
        Self::with_config(SourceConfig::default())
    }

    /// Creates a source with the given configuration.
    pub fn with_config(cfg: SourceConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: cfg.name,
                state: RwLock::new(State {
                    entries: Vec::with_capacity(cfg.initial_capacity),
                    status: Status::Active,
                }),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Name used in log lines.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Registers an observer; it receives items published from now on.
    ///
    /// - On a stopped source the stored terminal signal is delivered immediately
    ///   and an inactive handle is returned.
    /// - On a disposed source nothing is delivered and an inactive handle is returned.
    pub fn subscribe(&self, observer: ObserverRef<T>) -> Subscription {
        let status = {
            let mut state = self.inner.state.write();
            if let Status::Active = state.status {
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                let active = Arc::new(AtomicBool::new(true));
                state.entries.push(Arc::new(Entry {
                    id,
                    observer,
                    active: Arc::clone(&active),
                }));
                let weak: Weak<dyn Detach> = Arc::downgrade(&self.inner) as Weak<dyn Detach>;
                return Subscription::new(id, active, weak);
            }
            state.status.clone()
        };

        match status {
            Status::Completed => self.notify(&observer, "on_completed", || observer.on_completed()),
            Status::Failed(error) => self.notify(&observer, "on_error", || observer.on_error(&error)),
            Status::Disposed => {
                tracing::warn!(
                    source = %self.inner.name,
                    subscriber = %observer.name(),
                    "subscribe on disposed source ignored"
                );
            }
            Status::Active => {}
        }
        Subscription::inactive()
    }

    /// Registers a closure as an observer (see [`FnObserver`]).
    pub fn subscribe_fn<F, R>(&self, on_item: F) -> Subscription
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        self.subscribe(Arc::new(FnObserver::new(on_item)))
    }

    /// Delivers `item` to every current subscriber.
    ///
    /// Never fails: observer errors/panics are logged at WARN and skipped.
    /// On a stopped or disposed source this is a no-op logged at DEBUG.
    pub fn publish(&self, item: T) {
        let Some(entries) = self.snapshot("publish") else {
            return;
        };

        for entry in &entries {
            if !entry.active.load(Ordering::SeqCst) {
                continue;
            }
            let observer = &entry.observer;
            if let Err(failure) = isolate(|| observer.on_item(item.clone())) {
                tracing::warn!(
                    source = %self.inner.name,
                    subscriber = %observer.name(),
                    "failed to publish event: {failure}"
                );
            }
        }
    }

    /// Forwards a stream error to every subscriber and stops the source.
    pub fn signal_error(&self, error: StreamError) {
        tracing::debug!(source = %self.inner.name, label = error.as_label(), "stream error signalled");
        for entry in self.stop(Status::Failed(error.clone()), "signal_error") {
            let observer = &entry.observer;
            self.notify(observer, "on_error", || observer.on_error(&error));
        }
    }

    /// Forwards completion to every subscriber and stops the source.
    pub fn signal_completion(&self) {
        for entry in self.stop(Status::Completed, "signal_completion") {
            let observer = &entry.observer;
            self.notify(observer, "on_completed", || observer.on_completed());
        }
    }

    /// Releases all subscribers; later calls on this source are no-ops.
    ///
    /// A publish already running on another thread finishes the observer it is
    /// calling but skips the rest.
    pub fn dispose(&self) {
        let entries = {
            let mut state = self.inner.state.write();
            if let Status::Disposed = state.status {
                return;
            }
            state.status = Status::Disposed;
            std::mem::take(&mut state.entries)
        };
        for entry in &entries {
            entry.active.store(false, Ordering::SeqCst);
        }
        tracing::debug!(source = %self.inner.name, released = entries.len(), "source disposed");
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.read().entries.len()
    }

    /// True once [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        matches!(self.inner.state.read().status, Status::Disposed)
    }

    /// True once a terminal signal was sent (or the source was disposed).
    pub fn is_stopped(&self) -> bool {
        !matches!(self.inner.state.read().status, Status::Active)
    }

    fn snapshot(&self, op: &'static str) -> Option<Vec<Arc<Entry<T>>>> {
        let state = self.inner.state.read();
        match state.status {
            Status::Active => Some(state.entries.clone()),
            _ => {
                tracing::debug!(source = %self.inner.name, op, "source stopped; call ignored");
                None
            }
        }
    }

    /// Moves the source into a terminal status and returns the subscribers to notify.
    fn stop(&self, status: Status, op: &'static str) -> Vec<Arc<Entry<T>>> {
        let entries = {
            let mut state = self.inner.state.write();
            if !matches!(state.status, Status::Active) {
                tracing::debug!(source = %self.inner.name, op, "source stopped; call ignored");
                return Vec::new();
            }
            state.status = status;
            std::mem::take(&mut state.entries)
        };
        entries
            .into_iter()
            .filter(|e| e.active.swap(false, Ordering::SeqCst))
            .collect()
    }

    fn notify<F>(&self, observer: &ObserverRef<T>, callback: &'static str, f: F)
    where
        F: FnOnce(),
    {
        if let Err(failure) = isolate(f) {
            tracing::warn!(
                source = %self.inner.name,
                subscriber = %observer.name(),
                callback,
                "subscriber raised: {failure}"
            );
        }
    }
}

impl<T> Observer<T> for EventSource<T>
where
    T: Clone + Send + 'static,
{
    fn on_item(&self, item: T) {
        self.publish(item);
    }

    fn on_error(&self, error: &StreamError) {
        self.signal_error(error.clone());
    }

    fn on_completed(&self) {
        self.signal_completion();
    }

    fn name(&self) -> &str {
        &self.inner.name
    }
}

impl<T> Dispose for EventSource<T>
where
    T: Clone + Send + 'static,
{
    fn dispose(&self) -> Result<(), DisposeError> {
        EventSource::dispose(self);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.inner.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::thread;

    use parking_lot::Mutex;
    use proptest::prelude::*;

    use crate::sinks::CollectingSink;

    #[test]
    fn test_single_subscriber_sees_publish_order() {
        let source = EventSource::<i32>::new();
        let sink = Arc::new(CollectingSink::<i32>::new());
        let sub = source.subscribe(sink.clone());
        for n in [3, 1, 4, 1, 5] {
            source.publish(n);
        }
        assert_eq!(sink.collected(), vec![3, 1, 4, 1, 5]);
        assert!(sub.is_active());
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_two_collecting_sinks_end_to_end() {
        let source = EventSource::<&str>::with_config(SourceConfig::named("letters"));
        let first = Arc::new(CollectingSink::<&str>::new());
        let second = Arc::new(CollectingSink::<&str>::new());
        let _a = source.subscribe(first.clone());
        let _b = source.subscribe(second.clone());

        for item in ["A", "B", "C"] {
            source.publish(item);
        }
        source.signal_completion();

        for sink in [&first, &second] {
            assert_eq!(sink.collected(), vec!["A", "B", "C"]);
            assert!(sink.is_completed());
        }
        assert!(source.is_stopped());
    }

    #[test]
    fn test_failing_subscriber_does_not_starve_sibling() {
        let source = EventSource::<u32>::new();
        let _bad = source.subscribe_fn(|n: u32| -> () { panic!("cannot handle {n}") });
        let _err = source.subscribe_fn(|_: u32| Err::<(), _>("always rejects"));
        let good = Arc::new(CollectingSink::<u32>::new());
        let _good = source.subscribe(good.clone());

        for n in 0..5 {
            source.publish(n);
        }
        assert_eq!(good.collected(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let source = EventSource::<u32>::new();
        let sink = Arc::new(CollectingSink::<u32>::new());
        let sub = source.subscribe(sink.clone());
        source.publish(1);
        sub.unsubscribe();
        sub.unsubscribe();
        source.publish(2);

        assert_eq!(sink.collected(), vec![1]);
        assert!(!sub.is_active());
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_during_publish_skips_removed_observer() {
        let source = EventSource::<u32>::new();
        let victim_sub: Arc<OnceLock<Subscription>> = Arc::new(OnceLock::new());

        let v = Arc::clone(&victim_sub);
        let _killer = source.subscribe_fn(move |_: u32| {
            if let Some(sub) = v.get() {
                sub.unsubscribe();
            }
        });
        let victim = Arc::new(CollectingSink::<u32>::new());
        let _ = victim_sub.set(source.subscribe(victim.clone()));

        source.publish(1);
        source.publish(2);
        assert!(victim.collected().is_empty());
        assert_eq!(source.subscriber_count(), 1);
    }

    #[test]
    fn test_subscribe_during_publish_sees_only_later_items() {
        let source = EventSource::<u32>::new();
        let late = Arc::new(CollectingSink::<u32>::new());
        let subscribed = Arc::new(AtomicBool::new(false));

        let (src, l, s) = (source.clone(), late.clone(), subscribed.clone());
        let _hook = source.subscribe_fn(move |_: u32| {
            if !s.swap(true, Ordering::SeqCst) {
                let _ = src.subscribe(l.clone());
            }
        });

        source.publish(1);
        source.publish(2);
        assert_eq!(late.collected(), vec![2]);
    }

    #[test]
    fn test_dispose_makes_calls_noops() {
        let source = EventSource::<&str>::new();
        let sink = Arc::new(CollectingSink::<&str>::new());
        let sub = source.subscribe(sink.clone());
        source.publish("before");
        source.dispose();
        source.dispose();

        source.publish("after");
        source.signal_completion();
        let late = source.subscribe(Arc::new(CollectingSink::<&str>::new()));

        assert_eq!(sink.collected(), vec!["before"]);
        assert!(!sink.is_completed());
        assert!(!sub.is_active());
        assert!(!late.is_active());
        assert!(source.is_disposed());
    }

    #[test]
    fn test_late_subscriber_gets_terminal_signal() {
        let completed = EventSource::<u8>::new();
        completed.signal_completion();
        let sink = Arc::new(CollectingSink::<u8>::new());
        let sub = completed.subscribe(sink.clone());
        assert!(sink.is_completed());
        assert!(!sub.is_active());

        let failed = EventSource::<u8>::new();
        failed.signal_error(StreamError::transport("feed down"));
        failed.publish(1);
        let sink = Arc::new(CollectingSink::<u8>::new());
        let _ = failed.subscribe(sink.clone());
        assert_eq!(sink.error(), Some(StreamError::transport("feed down")));
        assert!(sink.collected().is_empty());
    }

    #[test]
    fn test_error_is_forwarded_once_to_each_subscriber() {
        let source = EventSource::<u8>::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let e = Arc::clone(&errors);
            source.subscribe(Arc::new(
                FnObserver::new(|_: u8| ()).with_on_error(move |err: &StreamError| {
                    e.lock().push(err.as_label());
                }),
            ));
        }
        source.signal_error(StreamError::fatal("market closed"));
        source.signal_error(StreamError::fatal("again"));
        assert_eq!(*errors.lock(), vec!["stream_fatal"; 3]);
    }

    #[test]
    fn test_source_can_observe_another_source() {
        let upstream = EventSource::<u32>::new();
        let downstream = EventSource::<u32>::new();
        let sink = Arc::new(CollectingSink::<u32>::new());
        let _ = downstream.subscribe(sink.clone());
        let _ = upstream.subscribe(Arc::new(downstream.clone()));

        upstream.publish(10);
        upstream.signal_completion();
        assert_eq!(sink.collected(), vec![10]);
        assert!(sink.is_completed());
        assert!(downstream.is_stopped());
    }

    #[test]
    fn test_concurrent_publish_and_subscribe() {
        let source = EventSource::<usize>::new();
        let total = Arc::new(AtomicU64::new(0));

        let publishers: Vec<_> = (0..4)
            .map(|_| {
                let s = source.clone();
                thread::spawn(move || {
                    for n in 0..500 {
                        s.publish(n);
                    }
                })
            })
            .collect();
        let subscribers: Vec<_> = (0..4)
            .map(|_| {
                let s = source.clone();
                let t = Arc::clone(&total);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let t = Arc::clone(&t);
                        let sub = s.subscribe_fn(move |_: usize| {
                            t.fetch_add(1, Ordering::Relaxed);
                        });
                        sub.unsubscribe();
                    }
                })
            })
            .collect();

        for h in publishers.into_iter().chain(subscribers) {
            h.join().unwrap();
        }
        assert_eq!(source.subscriber_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_single_subscriber_observes_exact_sequence(items in proptest::collection::vec(any::<i64>(), 0..200)) {
            let source = EventSource::<i64>::new();
            let sink = Arc::new(CollectingSink::<i64>::new());
            let _sub = source.subscribe(sink.clone());
            for item in &items {
                source.publish(*item);
            }
            prop_assert_eq!(sink.collected(), items);
        }
    }
}
