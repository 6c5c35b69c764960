//! Trailing-edge debouncing of events and values.
//!
//! Nothing here spawns timers: callers poll from their own loop, and the
//! passage of time comes from an injected [`Clock`].

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::utils::clock::{Clock, SystemClock};

/// A simple debouncer that tracks when an action should be triggered
/// after a period of inactivity
#[derive(Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// When the last event occurred
    last_event: Option<Instant>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("last_event", &self.last_event)
            .finish()
    }
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self::with_clock(Duration::from_millis(delay_ms), Arc::new(SystemClock))
    }

    pub fn with_clock(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            delay,
            last_event: None,
            clock,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register that an event occurred, restarting the quiet window
    pub fn trigger(&mut self) {
        self.last_event = Some(self.clock.now());
    }

    /// Check if enough time has passed to execute the debounced action.
    /// Returns true at most once per burst of triggers.
    pub fn should_execute(&mut self) -> bool {
        match self.last_event {
            Some(last) if self.clock.now().saturating_duration_since(last) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    /// Get the time remaining before the action will trigger
    /// Returns None if no action is pending
    pub fn time_remaining(&self) -> Option<Duration> {
        self.last_event.map(|last| {
            let elapsed = self.clock.now().saturating_duration_since(last);
            self.delay.saturating_sub(elapsed)
        })
    }

    /// Reset the debouncer, canceling any pending action
    pub fn reset(&mut self) {
        self.last_event = None;
    }

    /// Check if there's a pending action
    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }
}

/// A value that lags its input until the input has been stable for `delay`.
///
/// Each [`set`](Debounced::set) replaces whatever was pending, so a value
/// superseded inside the window is never emitted.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    current: T,
    pending: Option<T>,
    debouncer: Debouncer,
}

impl<T> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self::with_clock(initial, delay, Arc::new(SystemClock))
    }

    pub fn with_clock(initial: T, delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: initial,
            pending: None,
            debouncer: Debouncer::with_clock(delay, clock),
        }
    }

    /// Feed a new input value
    pub fn set(&mut self, value: T) {
        self.pending = Some(value);
        self.debouncer.trigger();
    }

    /// Promote the pending input once its quiet window has elapsed.
    ///
    /// Returns the newly emitted value, or `None` if nothing changed.
    pub fn poll(&mut self) -> Option<&T> {
        if !self.debouncer.should_execute() {
            return None;
        }
        let value = self.pending.take()?;
        self.current = value;
        tracing::trace!(target: "debounce", "Debounced value emitted");
        Some(&self.current)
    }

    /// The last emitted value
    pub fn value(&self) -> &T {
        &self.current
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.debouncer.time_remaining()
    }

    /// Drop the pending input without emitting it
    pub fn cancel(&mut self) {
        self.pending = None;
        self.debouncer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    const DELAY: Duration = Duration::from_millis(300);

    fn debounced(clock: &ManualClock) -> Debounced<&'static str> {
        Debounced::with_clock("", DELAY, Arc::new(clock.clone()))
    }

    #[test]
    fn test_only_last_value_in_burst_is_emitted() {
        let clock = ManualClock::new();
        let mut value = debounced(&clock);

        value.set("a");
        clock.advance(Duration::from_millis(100));
        assert_eq!(value.poll(), None);
        value.set("b");
        clock.advance(Duration::from_millis(100));
        assert_eq!(value.poll(), None);
        value.set("c");

        // 299ms after "c": still quiet window
        clock.advance(Duration::from_millis(299));
        assert_eq!(value.poll(), None);
        assert_eq!(*value.value(), "");

        clock.advance(Duration::from_millis(1));
        assert_eq!(value.poll(), Some(&"c"));
        assert_eq!(*value.value(), "c");

        // Nothing further to emit
        clock.advance(DELAY);
        assert_eq!(value.poll(), None);
    }

    #[test]
    fn test_cancel_discards_pending() {
        let clock = ManualClock::new();
        let mut value = debounced(&clock);

        value.set("draft");
        value.cancel();
        clock.advance(DELAY);

        assert_eq!(value.poll(), None);
        assert!(!value.is_pending());
        assert_eq!(*value.value(), "");
    }

    #[test]
    fn test_time_remaining_counts_down() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::with_clock(DELAY, Arc::new(clock.clone()));
        assert_eq!(debouncer.time_remaining(), None);

        debouncer.trigger();
        clock.advance(Duration::from_millis(120));
        assert_eq!(debouncer.time_remaining(), Some(Duration::from_millis(180)));

        clock.advance(Duration::from_millis(500));
        assert_eq!(debouncer.time_remaining(), Some(Duration::ZERO));
        assert!(debouncer.should_execute());
        assert!(!debouncer.is_pending());
    }
}
