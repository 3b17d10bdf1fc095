//! # Observers: the receiving side of a source.
//!
//! This module provides the [`Observer`] trait and the adapters/wrappers that
//! compose around it.
//!
//! ## Architecture
//! ```text
//! EventSource::publish(item)
//!     ├──► Observer::on_item(item)                    (sinks, user types)
//!     ├──► FnObserver ──► closure(item)               (ad hoc callbacks, isolated)
//!     ├──► Latest<O>  ──► O::on_item(latest item)     (sync, latest wins)
//!     └──► LatestWorker ──► [slot] ──► worker task ──► AsyncObserver::on_item().await
//! ```
//!
//! ## Observer kinds
//! - **Terminal sinks** - consume items for effect (see [`sinks`](crate::sinks)).
//! - **Adapters** - turn closures into observers ([`FnObserver`]).
//! - **Wrappers** - sit in front of another observer and change delivery
//!   ([`Latest`], [`LatestWorker`], [`Reporting`](crate::Reporting)).

mod fn_observer;
mod latest;
mod observer;
mod worker;

pub use fn_observer::FnObserver;
pub use latest::{latest_fn, Latest};
pub use observer::{Observer, ObserverRef};
pub use worker::{AsyncObserver, LatestWorker};
