//! Time source abstraction.
//!
//! The engine only needs a monotonic "now" to run its debounce window. Keeping
//! it behind a trait lets tests drive time by hand instead of sleeping.

use std::time::Instant;

/// A monotonic time source.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
