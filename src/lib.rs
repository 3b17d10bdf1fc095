//! # eventcast
//!
//! **eventcast** is the event-distribution core of a market-data client.
//!
//! It provides a hot multicast source with per-subscriber failure isolation,
//! latest-wins backpressure for slow consumers, fan-out disposal for teardown,
//! and a handful of ready-made sinks. Transports (websockets, RPC polling) feed
//! it; strategies and printers consume it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  transport callback (any thread)
//!            │ publish(item)
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventSource<T>                                                   │
//! │  - snapshot of subscribers taken under a read lock                │
//! │  - delivery outside the lock, one observer after another          │
//! │  - failing observer → warn!, next observer                        │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!  ┌────────────┐   ┌───────────────┐   ┌──────────────────────────┐
//!  │ FnObserver │   │  Latest<O>    │   │  LatestWorker<T>         │
//!  │ (closures) │   │ (sync, drops  │   │ (slot + tokio task,      │
//!  │            │   │  stale items) │   │  AsyncObserver::on_item) │
//!  └─────┬──────┘   └──────┬────────┘   └────────────┬─────────────┘
//!        ▼                 ▼                         ▼
//!   user callback    CollectingSink /          async consumer
//!                    PrintingSink / ...
//!
//!  DisposePropagator ──► [Subscription, EventSource, transport, closures...]
//!        dispose() runs every entry once, in order, failures logged and collected
//! ```
//!
//! ### Lifecycle of a source
//! ```text
//! Active ──publish──► Active
//!   ├─ signal_error(e)     ─► Failed(e)   late subscribers get on_error(e)
//!   ├─ signal_completion() ─► Completed   late subscribers get on_completed()
//!   └─ dispose()           ─► Disposed    every call is a logged no-op
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                          |
//! |-----------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Observers**   | Receiving contract, closure adapter, latest-wins wrappers.   | [`Observer`], [`FnObserver`], [`Latest`], [`LatestWorker`] |
//! | **Source**      | Hot multicast publisher and subscription handles.            | [`EventSource`], [`Subscription`], [`SourceConfig`] |
//! | **Disposal**    | One call tears down many resources.                          | [`Dispose`], [`DisposePropagator`]          |
//! | **Sinks**       | Collect, print, capture, debug-log.                          | [`CollectingSink`], [`PrintingSink`], [`CaptureFirst`], [`debug_tap`] |
//! | **Pipeline**    | Error interception and retry with backoff.                   | [`Reporting`], [`intercept`], [`retry`], [`RetryPolicy`] |
//! | **Errors**      | Typed errors for streams, teardown and retries.              | [`StreamError`], [`DisposeError`], [`RetryError`] |
//!
//! ## Optional features
//! - `logging`: exports [`logging::init`], a `tracing-subscriber` setup honouring `RUST_LOG`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventcast::{
//!     latest_fn, CollectingSink, DisposePropagator, EventSource, SourceConfig,
//! };
//!
//! let prices = EventSource::<f64>::with_config(SourceConfig::named("SOL/USDC"));
//! let history = Arc::new(CollectingSink::<f64>::new());
//! let teardown = DisposePropagator::named("price-feed");
//!
//! let sub = prices.subscribe(history.clone());
//! let quoter = prices.subscribe(latest_fn(|price: f64| {
//!     if price <= 0.0 {
//!         return Err(format!("refusing to quote at {price}"));
//!     }
//!     Ok(())
//! }));
//! teardown.register_resource(Arc::new(sub));
//! teardown.register_resource(Arc::new(quoter));
//! teardown.register_resource(Arc::new(prices.clone()));
//!
//! prices.publish(24.51);
//! prices.publish(-1.0); // the quoter rejects it; the history still records it
//! prices.publish(24.53);
//!
//! teardown.dispose().expect("all cleanups succeed");
//! prices.publish(99.0); // no-op after disposal
//!
//! assert_eq!(history.collected(), vec![24.51, -1.0, 24.53]);
//! assert!(prices.is_disposed());
//! ```

mod disposal;
mod error;
mod isolate;
mod observers;
mod pipeline;
mod sinks;
mod source;

#[cfg(feature = "logging")]
pub mod logging;

// ---- Public re-exports ----

pub use disposal::{Dispose, DisposePropagator};
pub use error::{DisposeError, RetryError, StreamError};
pub use isolate::CallbackOutcome;
pub use observers::{latest_fn, AsyncObserver, FnObserver, Latest, LatestWorker, Observer, ObserverRef};
pub use pipeline::{
    intercept, log_subscription_error, report_pipeline_error, retry, retry_stream, BackoffPolicy,
    Jitter, Reporting, RetryPolicy,
};
pub use sinks::{debug_tap, CaptureFirst, CollectingSink, PrintConfig, PrintingSink, NO_ITEMS_MESSAGE};
pub use source::{EventSource, SourceConfig, Subscription};
