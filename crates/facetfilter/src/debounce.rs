//! Trailing-edge debounce.
//!
//! A [`Debouncer`] holds at most one pending value. Every [`Debouncer::push`]
//! replaces the pending value and restarts the quiet period; the value is
//! released by [`Debouncer::poll`] only once the quiet period has elapsed with
//! no further input. Superseded values are dropped without notice.
//!
//! Nothing here blocks or spawns: the owner calls `poll` from whatever loop
//! already drives it.

use std::time::{Duration, Instant};

use crate::clock::Clock;

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Coalesces rapid updates into a single trailing release.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, clock: &impl Clock) {
        self.pending = Some(Pending {
            value,
            deadline: clock.now() + self.window,
        });
    }

    /// Release the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, clock: &impl Clock) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| clock.now() >= pending.deadline);
        if due {
            self.take()
        } else {
            None
        }
    }

    /// Release the pending value immediately, regardless of the deadline.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|pending| &pending.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending value is released, if any.
    pub fn remaining(&self, clock: &impl Clock) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|pending| pending.deadline.saturating_duration_since(clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ManualClock;

    fn debouncer() -> Debouncer<String> {
        Debouncer::new(Duration::from_millis(200))
    }

    #[test]
    fn test_holds_value_until_quiet_period_elapses() {
        let clock = ManualClock::new();
        let mut d = debouncer();

        d.push("a".to_string(), &clock);
        assert_eq!(d.poll(&clock), None);

        clock.advance(Duration::from_millis(199));
        assert_eq!(d.poll(&clock), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(d.poll(&clock), Some("a".to_string()));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_new_input_restarts_the_window_and_wins() {
        let clock = ManualClock::new();
        let mut d = debouncer();

        d.push("a".to_string(), &clock);
        clock.advance(Duration::from_millis(150));
        d.push("ab".to_string(), &clock);
        clock.advance(Duration::from_millis(150));
        assert_eq!(d.poll(&clock), None);
        assert_eq!(d.pending().map(String::as_str), Some("ab"));

        clock.advance(Duration::from_millis(50));
        assert_eq!(d.poll(&clock), Some("ab".to_string()));
        assert_eq!(d.poll(&clock), None);
    }

    #[test]
    fn test_take_and_cancel() {
        let clock = ManualClock::new();
        let mut d = debouncer();

        d.push("x".to_string(), &clock);
        assert_eq!(d.remaining(&clock), Some(Duration::from_millis(200)));
        assert_eq!(d.take(), Some("x".to_string()));

        d.push("y".to_string(), &clock);
        d.cancel();
        clock.advance(Duration::from_secs(1));
        assert_eq!(d.poll(&clock), None);
        assert_eq!(d.remaining(&clock), None);
    }
}
