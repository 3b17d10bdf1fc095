//! # PrintingSink: simple item printer
//!
//! A minimal sink that writes every item to stdout (or any writer).
//! Use it for scripts, tests or demos.
//!
//! ## Example output
//! ```text
//! 101.25
//! 101.5
//! transport failed: socket closed
//! ```
//! With `timestamps = true`:
//! ```text
//! 2026-10-19 14:03:07.412345: 101.25
//! ```
//! On completion without any item (and `report_no_output = true`):
//! ```text
//! No items to show.
//! ```

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::StreamError;
use crate::observers::Observer;

/// Message written on an empty completion.
pub const NO_ITEMS_MESSAGE: &str = "No items to show.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Configuration for a [`PrintingSink`].
#[derive(Clone, Copy, Debug)]
pub struct PrintConfig {
    /// Write [`NO_ITEMS_MESSAGE`] when completing without having seen an item.
    pub report_no_output: bool,
    /// Prefix each item with the local time.
    pub timestamps: bool,
}

impl Default for PrintConfig {
    /// Returns a configuration with:
    /// - `report_no_output = true`;
    /// - `timestamps = false`.
    fn default() -> Self {
        Self {
            report_no_output: true,
            timestamps: false,
        }
    }
}

/// Terminal sink that prints items, optionally timestamped.
pub struct PrintingSink {
    cfg: PrintConfig,
    seen_item: AtomicBool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl PrintingSink {
    /// Creates a sink writing to stdout.
    #[must_use]
    pub fn new(cfg: PrintConfig) -> Self {
        Self::with_writer(cfg, io::stdout())
    }

    /// Creates a timestamped sink writing to stdout.
    #[must_use]
    pub fn timestamped(report_no_output: bool) -> Self {
        Self::new(PrintConfig {
            report_no_output,
            timestamps: true,
        })
    }

    /// Creates a sink writing to `out`.
    pub fn with_writer(cfg: PrintConfig, out: impl Write + Send + 'static) -> Self {
        Self {
            cfg,
            seen_item: AtomicBool::new(false),
            out: Mutex::new(Box::new(out)),
        }
    }

    /// True once at least one item was received.
    pub fn has_seen_item(&self) -> bool {
        self.seen_item.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &dyn Display) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            tracing::warn!(subscriber = "PrintingSink", "write failed: {e}");
        }
    }
}

impl<T> Observer<T> for PrintingSink
where
    T: Display + 'static,
{
    fn on_item(&self, item: T) {
        self.seen_item.store(true, Ordering::SeqCst);
        if self.cfg.timestamps {
            let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
            self.write_line(&format_args!("{now}: {item}"));
        } else {
            self.write_line(&item);
        }
    }

    fn on_error(&self, error: &StreamError) {
        self.write_line(error);
    }

    fn on_completed(&self) {
        if self.cfg.report_no_output && !self.has_seen_item() {
            self.write_line(&NO_ITEMS_MESSAGE);
        }
    }

    fn name(&self) -> &str {
        "PrintingSink"
    }
}
