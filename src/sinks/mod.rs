//! # Terminal sinks and pass-through taps.
//!
//! Ready-made observers for the end of a pipeline, plus small taps that can sit
//! in the middle of one.
//!
//! ## Contents
//! - [`CollectingSink`] stores every item (tests, batch reads)
//! - [`PrintingSink`] prints items, optionally timestamped ([`PrintConfig`])
//! - [`CaptureFirst`] keeps the first item that passes
//! - [`debug_tap`] logs items at DEBUG and passes them through
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventcast::{EventSource, PrintConfig, PrintingSink};
//!
//! let fills = EventSource::<String>::new();
//! let _printer = fills.subscribe(Arc::new(PrintingSink::new(PrintConfig::default())));
//!
//! fills.signal_completion(); // prints "No items to show."
//! ```

mod capture;
mod collecting;
mod printing;
mod tap;

pub use capture::CaptureFirst;
pub use collecting::CollectingSink;
pub use printing::{PrintConfig, PrintingSink, NO_ITEMS_MESSAGE};
pub use tap::debug_tap;
