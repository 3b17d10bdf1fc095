//! # Optional log output setup (feature `logging`).
//!
//! The library only emits `tracing` events and never installs a subscriber on
//! its own. Binaries and scripts that want readable output can call [`init`]
//! once at startup:
//!
//! ```rust,no_run
//! eventcast::logging::init("eventcast=debug,info").ok();
//! ```
//!
//! `RUST_LOG`, when set, takes precedence over `default_filter`.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Why the log output could not be installed.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// `default_filter` is not a valid filter directive.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("log output already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` or `default_filter`.
///
/// # Errors
/// - [`LoggingError::Filter`] if `default_filter` does not parse;
/// - [`LoggingError::AlreadyInitialized`] if a global subscriber already exists.
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}
