//! # Multicast event source and its subscriptions.
//!
//! ## Contents
//! - [`EventSource`] hot publisher fanning items out to observers
//! - [`Subscription`] handle to remove one observer
//! - [`SourceConfig`] per-source settings
//!
//! ## Quick wiring
//! ```text
//! transport callback ──► EventSource::publish(item)
//!                              ├─► subscribe(observer) ─► Subscription
//!                              └─► dispose()  (usually via DisposePropagator)
//! ```

mod config;
mod event_source;
mod subscription;

pub use config::SourceConfig;
pub use event_source::EventSource;
pub use subscription::Subscription;
