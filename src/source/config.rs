//! # Event source configuration.
//!
//! [`SourceConfig`] holds the per-source settings. The name shows up as the
//! `source` field on every log line the source emits.

use std::borrow::Cow;

/// Configuration for an [`EventSource`](crate::EventSource).
///
/// ## Field semantics
/// - `name`: label for logs (default `"EventSource"`)
/// - `initial_capacity`: preallocated subscriber slots (`0` = allocate lazily)
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Name used in log lines emitted by the source.
    pub name: Cow<'static, str>,

    /// Number of subscriber slots to reserve up front.
    pub initial_capacity: usize,
}

impl SourceConfig {
    /// Returns a config with the given name and default capacity.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for SourceConfig {
    /// Returns a configuration with:
    /// - `name = "EventSource"`;
    /// - `initial_capacity = 0`.
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("EventSource"),
            initial_capacity: 0,
        }
    }
}
