//! # Backoff between retry attempts.
//!
//! [`BackoffPolicy`] computes the wait before the next attempt of a failed
//! pipeline stage: `first × factor^attempt`, clamped to `max`, then randomized by
//! [`Jitter`]. The base is derived from the attempt number alone, so jitter never
//! compounds across attempts.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use eventcast::{BackoffPolicy, Jitter};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(250),
//!     max: Duration::from_secs(5),
//!     factor: 2.0,
//!     jitter: Jitter::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(250));
//! assert_eq!(backoff.next(2), Duration::from_secs(1));
//! assert_eq!(backoff.next(8), Duration::from_secs(5));
//! ```

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Exact delay.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// `delay/2` plus uniform in `[0, delay/2]`.
    Equal,
}

impl Jitter {
    /// Applies the jitter to `delay`.
    pub fn apply(self, delay: Duration) -> Duration {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        match self {
            Jitter::None => delay,
            Jitter::Full if ms == 0 => Duration::ZERO,
            Jitter::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            Jitter::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }
}

/// Delay schedule between retry attempts.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor per attempt (`1.0` keeps the delay constant).
    pub factor: f64,
    /// Randomization applied after clamping.
    pub jitter: Jitter,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 500ms`;
    /// - `max = 30s`;
    /// - `factor = 2.0`;
    /// - `jitter = Equal`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: Jitter::Equal,
        }
    }
}

impl BackoffPolicy {
    /// A constant delay without jitter.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: Jitter::None,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (0-indexed).
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(jitter: Jitter) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter,
        }
    }

    #[test]
    fn test_exponential_growth_is_capped() {
        let p = policy(Jitter::None);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(3), Duration::from_millis(800));
        assert_eq!(p.next(10), Duration::from_secs(10));
        assert_eq!(p.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_first_above_max_is_clamped() {
        let p = BackoffPolicy {
            first: Duration::from_secs(20),
            ..policy(Jitter::None)
        };
        assert_eq!(p.next(0), Duration::from_secs(10));
    }

    #[test]
    fn test_constant() {
        let p = BackoffPolicy::constant(Duration::from_millis(40));
        for attempt in 0..5 {
            assert_eq!(p.next(attempt), Duration::from_millis(40));
        }
    }

    #[test]
    fn test_jitter_bounds() {
        let full = policy(Jitter::Full);
        let equal = policy(Jitter::Equal);
        for attempt in 0..12 {
            let base = policy(Jitter::None).next(attempt);
            assert!(full.next(attempt) <= base);
            let d = equal.next(attempt);
            assert!(d >= base / 2 && d <= base, "attempt {attempt}: {d:?} vs {base:?}");
        }
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        assert_eq!(Jitter::Full.apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(Jitter::Equal.apply(Duration::ZERO), Duration::ZERO);
    }
}
