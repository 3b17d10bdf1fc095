//! # Teardown of pipelines.
//!
//! ## Contents
//! - [`Dispose`] - a resource that can be released (subscriptions, sources, sockets).
//! - [`DisposePropagator`] - fans one `dispose()` call out to many cleanups.
//!
//! ## Quick wiring
//! ```text
//! DisposePropagator
//!   ├─► Resource(transport client)   ── dispose() closes the socket
//!   ├─► Resource(EventSource)        ── dispose() drops all subscribers
//!   └─► Action("unsubscribe", ..)    ── closure
//! ```

mod dispose;
mod propagator;

pub use dispose::Dispose;
pub use propagator::DisposePropagator;
