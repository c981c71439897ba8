//! Wall-clock gravity timer.
//!
//! The session asks for an interval through [`Scheduler`]; the main loop
//! polls [`GravityTimer::fire`] and delivers ticks when it returns true.

use std::time::{Duration, Instant};

use crate::bridge::Scheduler;

#[derive(Debug, Clone)]
pub struct GravityTimer {
    interval: Option<Duration>,
    next_due: Instant,
}

impl Default for GravityTimer {
    fn default() -> Self {
        Self {
            interval: None,
            next_due: Instant::now(),
        }
    }
}

impl GravityTimer {
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Time left until the next tick, if a timer is running
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.interval
            .map(|_| self.next_due.saturating_duration_since(now))
    }

    /// True if a tick is due at `now`; the next one is scheduled one interval
    /// later.
    pub fn fire(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };
        if now < self.next_due {
            return false;
        }
        self.next_due = now + interval;
        true
    }
}

impl Scheduler for GravityTimer {
    fn set_interval(&mut self, interval_ms: u32) {
        let interval = Duration::from_millis(u64::from(interval_ms));
        self.interval = Some(interval);
        self.next_due = Instant::now() + interval;
    }

    fn clear_interval(&mut self) {
        self.interval = None;
    }
}
