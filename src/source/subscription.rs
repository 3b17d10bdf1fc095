//! # Subscription handle.
//!
//! [`Subscription`] is returned by [`EventSource::subscribe`](crate::EventSource::subscribe).
//! It is not generic over the item type, so handles from different sources can
//! be stored together (for example inside a [`DisposePropagator`](crate::DisposePropagator)).
//!
//! Dropping a `Subscription` does **not** unsubscribe; call [`Subscription::unsubscribe`]
//! or register it for disposal.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::disposal::Dispose;
use crate::error::DisposeError;

/// Removal hook implemented by the source's shared state.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

/// Handle to one observer registered with a source.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    source: Option<Weak<dyn Detach>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, active: Arc<AtomicBool>, source: Weak<dyn Detach>) -> Self {
        Self {
            id,
            active,
            source: Some(source),
        }
    }

    /// A handle that is already inactive (source stopped or disposed).
    pub(crate) fn inactive() -> Self {
        Self {
            id: 0,
            active: Arc::new(AtomicBool::new(false)),
            source: None,
        }
    }

    /// True while the observer still receives items.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Removes the observer from its source.
    ///
    /// Idempotent. A publish already running on another thread will skip this
    /// observer if it has not reached it yet.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(source) = self.source.as_ref().and_then(Weak::upgrade) {
            source.detach(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Dispose for Subscription {
    fn dispose(&self) -> Result<(), DisposeError> {
        self.unsubscribe();
        Ok(())
    }

    fn name(&self) -> &str {
        "Subscription"
    }
}
