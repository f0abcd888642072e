//! Millisecond timing primitives for the cooperative main loop.
//!
//! ```text
//!  loop pass ──▶ IntervalGate (1000 ms) ──▶ presence + FSM tick
//!                                            └─▶ cadence (5000 ms, in FsmContext)
//!  loop pass ──▶ Deadline (alert buzzer / hold) ──▶ ActuationController::poll
//! ```
//!
//! Nothing here blocks or reads a clock; callers pass `now_ms`.

/// Periodic gate: opens at most once per `interval_ms`.
///
/// The first call always opens, so work gated behind it runs on the very
/// first loop pass after boot.
#[derive(Debug, Clone, Copy)]
pub struct IntervalGate {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl IntervalGate {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Returns `true` (and re-arms) if the interval has elapsed.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

/// One-shot deadline: fires once when `now_ms` reaches the armed instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at_ms: Option<u64>,
}

impl Deadline {
    /// Arm to fire `after_ms` from `now_ms`, replacing any pending instant.
    pub fn arm(&mut self, now_ms: u64, after_ms: u64) {
        self.at_ms = Some(now_ms.saturating_add(after_ms));
    }

    pub fn cancel(&mut self) {
        self.at_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at_ms.is_some()
    }

    /// Returns `true` exactly once, on the first call at or after the
    /// armed instant; the deadline is then disarmed.
    pub fn expired(&mut self, now_ms: u64) -> bool {
        match self.at_ms {
            Some(at) if now_ms >= at => {
                self.at_ms = None;
                true
            }
            _ => false,
        }
    }
}
