//! Synthetic key-up for terminals that never report key releases.
//!
//! Most terminals only deliver presses and auto-repeats. A held key is
//! considered released once no press or repeat has arrived for the grace
//! period.

use bridge_tetris_bridge::HostEvent;

/// How long a held key survives without a repeat (longer than the usual
/// initial auto-repeat delay)
pub const HOLD_GRACE_MS: u32 = 500;

#[derive(Debug, Clone)]
pub struct HoldTracker {
    code: &'static str,
    grace_ms: u32,
    /// Remaining grace while held
    remaining_ms: Option<u32>,
}

impl HoldTracker {
    pub fn new(code: &'static str) -> Self {
        Self::with_grace(code, HOLD_GRACE_MS)
    }

    pub fn with_grace(code: &'static str, grace_ms: u32) -> Self {
        Self {
            code,
            grace_ms,
            remaining_ms: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.remaining_ms.is_some()
    }

    /// Observe an event. Returns true if it concerned the tracked key.
    pub fn observe(&mut self, event: &HostEvent) -> bool {
        if event.code() != self.code {
            return false;
        }
        match event {
            HostEvent::KeyDown(_) => self.remaining_ms = Some(self.grace_ms),
            HostEvent::KeyUp(_) => self.remaining_ms = None,
        }
        true
    }

    /// Advance time; yields the synthetic key-up once the grace runs out.
    pub fn elapse(&mut self, elapsed_ms: u32) -> Option<HostEvent> {
        let remaining = self.remaining_ms?;
        if remaining > elapsed_ms {
            self.remaining_ms = Some(remaining - elapsed_ms);
            return None;
        }
        self.remaining_ms = None;
        Some(HostEvent::key_up(self.code))
    }
}
