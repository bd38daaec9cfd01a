//! Debounce timer
//!
//! Single-shot, cancelable deadline that is pushed back on every trigger.
//! Time is passed in explicitly so the owning state machines stay pure.

use std::time::{Duration, Instant};

/// Coalesces bursts of triggers into one firing after a settle delay
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending firing and reschedule from `now`
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.trigger(start);

        assert!(!debouncer.fire(start + Duration::from_millis(299)));
        assert!(debouncer.fire(start + Duration::from_millis(300)));
        assert!(!debouncer.fire(start + Duration::from_millis(900)));
    }

    #[test]
    fn retrigger_pushes_deadline_back() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(200));

        assert!(!debouncer.fire(start + Duration::from_millis(400)));
        assert!(debouncer.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_prevents_firing() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.trigger(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }
}
