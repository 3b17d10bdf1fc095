//! Error types used by event sources, observers and disposal.
//!
//! This module defines the error enums of the crate:
//!
//! - [`StreamError`] - a structural failure of the data stream itself, delivered
//!   to subscribers through [`Observer::on_error`](crate::Observer::on_error).
//! - [`DisposeError`] - a cleanup action that failed during teardown.
//! - [`RetryError`] - why the retry stage gave up on an operation.
//!
//! Each type provides helper methods (`as_label`, `as_message`) for logging/metrics
//! and additional utilities such as [`StreamError::is_retryable`].
//!
//! Failures raised *inside* a subscriber callback are not represented here: they are
//! caught at the adapter/source boundary and only surface as log output.

use thiserror::Error;

/// # Errors signalled through a stream.
///
/// These travel from a producer to every subscriber of a source via
/// [`EventSource::signal_error`](crate::EventSource::signal_error).
/// Some errors are retryable (`Transport`, `Fail`), others are considered fatal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The transport feeding the stream failed (socket closed, reconnect gave up, ...).
    #[error("transport failed: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// A pipeline stage failed but a retry may succeed.
    #[error("stream failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error (should not be retried).
    #[error("fatal stream error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl StreamError {
    /// Shorthand for [`StreamError::Transport`].
    pub fn transport(error: impl Into<String>) -> Self {
        StreamError::Transport {
            error: error.into(),
        }
    }

    /// Shorthand for [`StreamError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        StreamError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`StreamError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        StreamError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventcast::StreamError;
    ///
    /// let err = StreamError::transport("socket closed");
    /// assert_eq!(err.as_label(), "stream_transport");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Transport { .. } => "stream_transport",
            StreamError::Fail { .. } => "stream_failed",
            StreamError::Fatal { .. } => "stream_fatal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Transport { error } => format!("transport: {error}"),
            StreamError::Fail { error } => format!("error: {error}"),
            StreamError::Fatal { error } => format!("fatal: {error}"),
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`StreamError::Transport`] and [`StreamError::Fail`],
    /// `false` otherwise.
    ///
    /// # Example
    /// ```
    /// use eventcast::StreamError;
    ///
    /// assert!(StreamError::fail("boom").is_retryable());
    /// assert!(!StreamError::fatal("nope").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::Transport { .. } | StreamError::Fail { .. }
        )
    }
}

/// # Errors produced while tearing resources down.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisposeError {
    /// A cleanup action returned an error.
    #[error("cleanup '{name}' failed: {error}")]
    Action {
        /// Name the action was registered under.
        name: String,
        /// The underlying error message.
        error: String,
    },

    /// A cleanup action panicked.
    #[error("cleanup '{name}' panicked: {info}")]
    Panicked {
        /// Name the action was registered under.
        name: String,
        /// Panic payload rendered as text.
        info: String,
    },

    /// Some actions of a fan-out disposal failed; the others still ran.
    #[error("{} cleanup action(s) failed: {failed:?}", failed.len())]
    Partial {
        /// Names of the failed actions, in registration order.
        failed: Vec<String>,
    },
}

impl DisposeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventcast::DisposeError;
    ///
    /// let err = DisposeError::Partial { failed: vec!["socket".into()] };
    /// assert_eq!(err.as_label(), "dispose_partial");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DisposeError::Action { .. } => "dispose_action_failed",
            DisposeError::Panicked { .. } => "dispose_action_panicked",
            DisposeError::Partial { .. } => "dispose_partial",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DisposeError::Action { name, error } => format!("{name}: {error}"),
            DisposeError::Panicked { name, info } => format!("{name}: panicked: {info}"),
            DisposeError::Partial { failed } => format!("failed cleanups={failed:?}"),
        }
    }
}

/// # Errors returned by the retry stage.
///
/// `E` is the error type of the retried operation; the last error seen is kept.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every allowed attempt failed.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the final attempt.
        last: E,
    },

    /// The error was classified as non-retryable.
    #[error("not retryable (attempt {attempts}): {last}")]
    Rejected {
        /// Number of attempts made.
        attempts: u32,
        /// The non-retryable error.
        last: E,
    },

    /// The cancellation token fired before an attempt or during backoff.
    #[error("retry cancelled after {attempts} attempt(s)")]
    Cancelled {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the last attempt, if one ran.
        last: Option<E>,
    },
}

impl<E> RetryError<E> {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Exhausted { .. } => "retry_exhausted",
            RetryError::Rejected { .. } => "retry_rejected",
            RetryError::Cancelled { .. } => "retry_cancelled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String
    where
        E: std::fmt::Display,
    {
        match self {
            RetryError::Exhausted { attempts, last } => format!("attempts={attempts}: {last}"),
            RetryError::Rejected { attempts, last } => format!("rejected at {attempts}: {last}"),
            RetryError::Cancelled { attempts, .. } => format!("cancelled after {attempts}"),
        }
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Rejected { attempts, .. }
            | RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// Consumes the error, returning the last operation error if any.
    pub fn into_last(self) -> Option<E> {
        match self {
            RetryError::Exhausted { last, .. } | RetryError::Rejected { last, .. } => Some(last),
            RetryError::Cancelled { last, .. } => last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_error_accessors() {
        let err = RetryError::Exhausted {
            attempts: 3,
            last: StreamError::transport("timeout"),
        };
        assert_eq!(err.as_label(), "retry_exhausted");
        assert_eq!(err.attempts(), 3);
        assert_eq!(
            err.to_string(),
            "gave up after 3 attempt(s): transport failed: timeout"
        );
        assert_eq!(err.into_last(), Some(StreamError::transport("timeout")));

        let cancelled: RetryError<StreamError> = RetryError::Cancelled {
            attempts: 0,
            last: None,
        };
        assert_eq!(cancelled.into_last(), None);
    }

    #[test]
    fn test_stream_error_display() {
        assert_eq!(
            StreamError::transport("closed").to_string(),
            "transport failed: closed"
        );
        assert_eq!(
            StreamError::fatal("bad market").to_string(),
            "fatal stream error (no retry): bad market"
        );
    }

    #[test]
    fn test_dispose_partial_display() {
        let err = DisposeError::Partial {
            failed: vec!["socket".into(), "subscription".into()],
        };
        assert_eq!(
            err.to_string(),
            "2 cleanup action(s) failed: [\"socket\", \"subscription\"]"
        );
    }
}
