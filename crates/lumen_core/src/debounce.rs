//! Trailing-edge debounce that keeps the most recent payload.
//!
//! Every [`Debounce::call`] replaces the pending payload and pushes the
//! deadline out to `now + delay`. [`Debounce::poll`] hands the payload over
//! once the deadline has passed. With a zero delay the payload fires at the
//! next poll, so a burst delivered between two polls collapses into one.

use std::time::{Duration, Instant};

/// Collapses bursts of calls into one deferred payload.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
    /// Calls absorbed since the last fire.
    collapsed: u32,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

impl<T> Debounce<T> {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            collapsed: 0,
        }
    }

    /// Records a call. Replaces any pending payload and restarts the window.
    pub fn call(&mut self, payload: T, now: Instant) {
        if self.pending.is_some() {
            self.collapsed += 1;
        }
        self.pending = Some(Pending {
            payload,
            deadline: now + self.delay,
        });
    }

    /// Returns the pending payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => {
                self.collapsed = 0;
                self.pending.take().map(|p| p.payload)
            }
            _ => None,
        }
    }

    /// Drops the pending payload without firing.
    pub fn cancel(&mut self) {
        self.collapsed = 0;
        self.pending = None;
    }

    /// Returns true if a payload is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of calls superseded by a later one since the last fire.
    #[must_use]
    pub fn collapsed(&self) -> u32 {
        self.collapsed
    }
}

impl<T> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_collapses_to_last_payload() {
        let mut debounce = Debounce::default();
        let now = Instant::now();

        for i in 0..5 {
            debounce.call(i, now);
        }
        assert_eq!(debounce.collapsed(), 4);

        assert_eq!(debounce.poll(now), Some(4));
        assert_eq!(debounce.poll(now), None);
    }

    #[test]
    fn test_delay_holds_until_quiet() {
        let mut debounce = Debounce::new(Duration::from_millis(50));
        let t0 = Instant::now();

        debounce.call("a", t0);
        debounce.call("b", t0 + Duration::from_millis(30));

        // The second call pushed the deadline to t0 + 80ms.
        assert_eq!(debounce.poll(t0 + Duration::from_millis(60)), None);
        assert_eq!(debounce.poll(t0 + Duration::from_millis(80)), Some("b"));
    }

    #[test]
    fn test_cancel_drops_payload() {
        let mut debounce = Debounce::default();
        let now = Instant::now();
        debounce.call(1, now);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert_eq!(debounce.poll(now), None);
    }
}
