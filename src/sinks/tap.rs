//! Pass-through debug tap.
//!
//! [`debug_tap`] returns a closure that logs each item under a title at DEBUG and
//! hands it back unchanged, so it can sit between two stages of a pipeline:
//!
//! ```rust
//! use eventcast::debug_tap;
//!
//! let before = debug_tap("unfiltered:");
//! let after = debug_tap("filtered:");
//! let kept: Vec<i32> = [1, -2, 3]
//!     .into_iter()
//!     .map(before)
//!     .filter(|n| *n > 0)
//!     .map(after)
//!     .collect();
//! assert_eq!(kept, vec![1, 3]);
//! ```

use std::borrow::Cow;
use std::fmt::Debug;

/// Builds an identity closure that logs `title` and the item at DEBUG.
pub fn debug_tap<T: Debug>(title: impl Into<Cow<'static, str>>) -> impl Fn(T) -> T + Clone {
    let title = title.into();
    move |item| {
        tracing::debug!(title = %title, ?item, "tap");
        item
    }
}
