//! # Disposable resources.
//!
//! [`Dispose`] is implemented by everything that holds something to release:
//! subscriptions, sources, backpressure wrappers, propagators themselves, and
//! user resources such as a websocket client.
//!
//! ## Example
//! ```rust
//! use eventcast::{Dispose, DisposeError};
//!
//! struct Socket;
//!
//! impl Dispose for Socket {
//!     fn dispose(&self) -> Result<(), DisposeError> {
//!         // close the connection
//!         Ok(())
//!     }
//!     fn name(&self) -> &str { "ticker-socket" }
//! }
//! ```

use crate::error::DisposeError;

/// A resource that can be released.
///
/// ### Implementation requirements
/// - Calling `dispose` twice must not panic; the second call may do nothing.
/// - Report failures through the returned error rather than panicking.
pub trait Dispose: Send + Sync + 'static {
    /// Releases the resource.
    fn dispose(&self) -> Result<(), DisposeError>;

    /// Returns the name used in logs and in [`DisposeError::Partial`].
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
