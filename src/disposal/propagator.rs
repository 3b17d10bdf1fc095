//! # Fan-out disposal.
//!
//! [`DisposePropagator`] collects teardown work (closures and owned
//! [`Dispose`] resources) and runs all of it from a single `dispose()` call.
//!
//! ## Rules
//! - Entries run **once**, in registration order.
//! - A failing entry (error or panic) is logged at ERROR and does not stop the
//!   entries after it; `dispose()` then returns [`DisposeError::Partial`].
//! - A second `dispose()` is a no-op returning `Ok(())`.
//! - Registering after disposal runs the entry immediately.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventcast::{DisposePropagator, EventSource};
//!
//! let source = Arc::new(EventSource::<String>::new());
//! let teardown = DisposePropagator::new();
//! teardown.register("close-socket", || println!("socket closed"));
//! teardown.register_resource(source.clone());
//!
//! teardown.dispose().unwrap();
//! assert!(source.is_disposed());
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::disposal::Dispose;
use crate::error::DisposeError;
use crate::isolate::{isolate, CallbackOutcome, Failure};

type Action = Box<dyn FnOnce() -> Result<(), String> + Send>;

/// One unit of teardown work.
enum Entry {
    /// Ad hoc closure.
    Action { name: Cow<'static, str>, run: Action },
    /// Resource owned by the propagator until disposal.
    Resource(Arc<dyn Dispose>),
}

impl Entry {
    fn name(&self) -> String {
        match self {
            Entry::Action { name, .. } => name.to_string(),
            Entry::Resource(res) => res.name().to_string(),
        }
    }

    fn run(self) -> Result<(), DisposeError> {
        let name = self.name();
        let outcome = match self {
            Entry::Action { run, .. } => isolate(run),
            Entry::Resource(res) => isolate(|| res.dispose()),
        };
        match outcome {
            Ok(()) => Ok(()),
            Err(Failure::Error(error)) => Err(DisposeError::Action { name, error }),
            Err(Failure::Panicked(info)) => Err(DisposeError::Panicked { name, info }),
        }
    }
}

#[derive(Default)]
struct State {
    entries: Vec<Entry>,
    disposed: bool,
}

/// Composite teardown: one `dispose()` releases everything registered.
#[derive(Default)]
pub struct DisposePropagator {
    name: Option<Cow<'static, str>>,
    state: Mutex<State>,
}

impl DisposePropagator {
    /// Creates an empty propagator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty propagator with a name (used when nested in another one).
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
            state: Mutex::default(),
        }
    }

    /// Appends a cleanup closure.
    ///
    /// The closure may return `()` or `Result<(), E>` with `E: Display`.
    pub fn register<F, R>(&self, name: impl Into<Cow<'static, str>>, action: F)
    where
        F: FnOnce() -> R + Send + 'static,
        R: CallbackOutcome,
    {
        self.push(Entry::Action {
            name: name.into(),
            run: Box::new(move || action().into_outcome()),
        });
    }

    /// Takes shared ownership of a resource and disposes it on teardown.
    pub fn register_resource(&self, resource: Arc<dyn Dispose>) {
        self.push(Entry::Resource(resource));
    }

    /// Number of entries still waiting for disposal.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True if nothing is waiting for disposal.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once `dispose()` has been called.
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Runs every registered entry in registration order.
    ///
    /// # Errors
    /// Returns [`DisposeError::Partial`] naming the entries that failed; all
    /// other entries still ran.
    pub fn dispose(&self) -> Result<(), DisposeError> {
        let entries = {
            let mut state = self.state.lock();
            if state.disposed {
                return Ok(());
            }
            state.disposed = true;
            std::mem::take(&mut state.entries)
        };

        let mut failed = Vec::new();
        for entry in entries {
            let name = entry.name();
            if let Err(err) = entry.run() {
                tracing::error!(cleanup = %name, label = err.as_label(), "cleanup failed: {err}");
                failed.push(name);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DisposeError::Partial { failed })
        }
    }

    fn push(&self, entry: Entry) {
        {
            let mut state = self.state.lock();
            if !state.disposed {
                state.entries.push(entry);
                return;
            }
        }
        let name = entry.name();
        tracing::debug!(cleanup = %name, "registered after disposal; running now");
        if let Err(err) = entry.run() {
            tracing::error!(cleanup = %name, label = err.as_label(), "cleanup failed: {err}");
        }
    }
}

impl Dispose for DisposePropagator {
    fn dispose(&self) -> Result<(), DisposeError> {
        DisposePropagator::dispose(self)
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("DisposePropagator")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let make = move |tag: &'static str| -> Box<dyn FnOnce() + Send> {
            let l = Arc::clone(&l);
            Box::new(move || l.lock().push(tag))
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_registration_order() {
        let (log, make) = recorder();
        let p = DisposePropagator::new();
        p.register("c1", make("c1"));
        p.register("c2", make("c2"));
        p.register("c3", make("c3"));
        assert_eq!(p.len(), 3);

        assert_eq!(p.dispose(), Ok(()));
        assert_eq!(*log.lock(), vec!["c1", "c2", "c3"]);
        assert!(p.is_empty());
    }

    #[test]
    fn test_failure_does_not_block_later_cleanups() {
        let (log, make) = recorder();
        let p = DisposePropagator::new();
        p.register("c1", make("c1"));
        p.register("c2", || -> () { panic!("socket already closed") });
        p.register("c2b", || Err::<(), _>("unsubscribe rejected"));
        p.register("c3", make("c3"));

        let err = p.dispose().unwrap_err();
        assert_eq!(
            err,
            DisposeError::Partial {
                failed: vec!["c2".into(), "c2b".into()]
            }
        );
        assert_eq!(*log.lock(), vec!["c1", "c3"]);
    }

    #[test]
    fn test_second_dispose_is_noop() {
        let (log, make) = recorder();
        let p = DisposePropagator::new();
        p.register("once", make("once"));
        p.dispose().unwrap();
        p.dispose().unwrap();
        assert_eq!(*log.lock(), vec!["once"]);
        assert!(p.is_disposed());
    }

    #[test]
    fn test_register_after_dispose_runs_immediately() {
        let (log, make) = recorder();
        let p = DisposePropagator::new();
        p.dispose().unwrap();
        p.register("late", make("late"));
        assert_eq!(*log.lock(), vec!["late"]);
        assert!(p.is_empty());
    }

    #[test]
    fn test_nested_propagators_and_resources() {
        struct Socket(Arc<Mutex<Vec<&'static str>>>);
        impl Dispose for Socket {
            fn dispose(&self) -> Result<(), DisposeError> {
                self.0.lock().push("socket");
                Ok(())
            }
            fn name(&self) -> &str {
                "socket"
            }
        }

        let (log, make) = recorder();
        let inner = Arc::new(DisposePropagator::named("feed"));
        inner.register_resource(Arc::new(Socket(Arc::clone(&log))));
        inner.register("feed-source", make("feed-source"));

        let outer = DisposePropagator::new();
        outer.register_resource(inner.clone());
        outer.register("strategy", make("strategy"));

        outer.dispose().unwrap();
        assert_eq!(*log.lock(), vec!["socket", "feed-source", "strategy"]);
        assert!(inner.is_disposed());
    }

    #[test]
    fn test_failed_resource_is_named_in_error() {
        struct Stuck;
        impl Dispose for Stuck {
            fn dispose(&self) -> Result<(), DisposeError> {
                Err(DisposeError::Action {
                    name: "stuck".into(),
                    error: "timeout".into(),
                })
            }
            fn name(&self) -> &str {
                "stuck"
            }
        }

        let p = DisposePropagator::new();
        p.register_resource(Arc::new(Stuck));
        assert_eq!(
            p.dispose(),
            Err(DisposeError::Partial {
                failed: vec!["stuck".into()]
            })
        );
    }
}
