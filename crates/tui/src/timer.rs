//! Cancelable one-shot timers driven by an injectable clock.
//!
//! Timers are plain deadlines stored beside the state that owns them. The
//! host polls them on every tick; nothing fires on its own, which keeps the
//! state machine single-threaded and lets tests step time explicitly with a
//! [`ManualClock`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock: fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Single-slot timer: arming replaces any pending deadline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    /// Schedules the slot to fire `delay` after `now`, dropping any earlier schedule.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns `true` when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
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
    fn slot_fires_once_after_deadline() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::default();
        slot.arm(clock.now(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(99));
        assert!(!slot.fire_if_due(clock.now()));
        clock.advance(Duration::from_millis(1));
        assert!(slot.fire_if_due(clock.now()));
        assert!(!slot.fire_if_due(clock.now()));
        assert!(!slot.is_armed());
    }

    #[test]
    fn rearming_replaces_previous_deadline() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::default();
        slot.arm(clock.now(), Duration::from_millis(100));
        clock.advance(Duration::from_millis(50));
        slot.arm(clock.now(), Duration::from_millis(100));

        clock.advance(Duration::from_millis(60));
        assert!(!slot.fire_if_due(clock.now()));
        clock.advance(Duration::from_millis(40));
        assert!(slot.fire_if_due(clock.now()));
    }

    #[test]
    fn canceled_slot_never_fires() {
        let clock = ManualClock::new();
        let mut slot = TimerSlot::default();
        slot.arm(clock.now(), Duration::ZERO);
        slot.cancel();
        assert!(!slot.fire_if_due(clock.now()));
        assert_eq!(slot.deadline(), None);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = other.now();
        clock.advance(Duration::from_secs(1));
        assert_eq!(other.now() - start, Duration::from_secs(1));
    }
}
