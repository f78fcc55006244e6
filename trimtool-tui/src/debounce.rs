//! Quiet-period debouncing for filter inputs.

use std::time::{Duration, Instant};

/// Quiet period before a typed filter becomes the tracked request value.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// A value that only settles once it stopped changing for `delay`.
///
/// The host writes with [`set`](Self::set) on every edit and calls
/// [`poll`](Self::poll) from the event loop tick.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    pending: T,
    settled: T,
    changed_at: Option<Instant>,
    delay: Duration,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(value: T) -> Self {
        Self::with_delay(value, DEBOUNCE_DELAY)
    }

    pub fn with_delay(value: T, delay: Duration) -> Self {
        Self {
            pending: value.clone(),
            settled: value,
            changed_at: None,
            delay,
        }
    }

    /// The latest written value (what the input shows).
    pub fn pending(&self) -> &T {
        &self.pending
    }

    /// The last settled value.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn set(&mut self, value: T, now: Instant) {
        if value != self.pending {
            self.pending = value;
            self.changed_at = Some(now);
        }
    }

    /// Edit the pending value in place.
    pub fn update(&mut self, now: Instant, f: impl FnOnce(&mut T)) {
        let mut value = self.pending.clone();
        f(&mut value);
        self.set(value, now);
    }

    /// Returns the newly settled value once the quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let changed_at = self.changed_at?;
        if now.duration_since(changed_at) < self.delay {
            return None;
        }
        self.changed_at = None;
        if self.pending == self.settled {
            return None;
        }
        self.settled = self.pending.clone();
        Some(self.settled.clone())
    }

    /// Settle immediately (e.g. on Enter).
    pub fn flush(&mut self) -> Option<T> {
        self.changed_at = None;
        if self.pending == self.settled {
            return None;
        }
        self.settled = self.pending.clone();
        Some(self.settled.clone())
    }

    /// When the pending value will settle, if an edit is waiting.
    pub fn deadline(&self) -> Option<Instant> {
        self.changed_at.map(|t| t + self.delay)
    }
}
