//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the "blackboard" the state handlers read from and
//! write to: the latest presence sample, the clock, the cycle position,
//! and the actions requested for the application service to carry out
//! after the tick.

use crate::readings::Mode;

// ---------------------------------------------------------------------------
// Requested actions (written by state handlers; consumed by AppService)
// ---------------------------------------------------------------------------

/// Side effects requested during one tick.  The service applies them in a
/// fixed order: neutralize, idle screen, presence report, mode cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleActions {
    /// Return all actuators to neutral and cancel any alert.
    pub neutralize: bool,
    /// Show the idle screen.
    pub show_idle: bool,
    /// Publish `true` on the presence topic.
    pub report_presence: bool,
    /// Run read → classify → render → actuate → publish for this mode.
    pub run_mode: Option<Mode>,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Inputs, updated before each tick --
    /// Milliseconds since boot.
    pub now_ms: u64,
    /// Latest presence sample.
    pub presence: bool,

    // -- Cycle state --
    /// Next mode to run; always `< Mode::COUNT`.
    pub mode_index: u8,
    /// Instant of the last cadence tick (or of entering `Active`).
    pub last_tick_ms: u64,
    /// Cadence interval between mode reads.
    pub cadence_ms: u64,

    // -- Outputs --
    pub actions: CycleActions,
}

impl FsmContext {
    pub fn new(cadence_ms: u64) -> Self {
        Self {
            now_ms: 0,
            presence: false,
            mode_index: 0,
            last_tick_ms: 0,
            cadence_ms,
            actions: CycleActions::default(),
        }
    }

    /// Whether a full cadence interval has passed since the last tick.
    pub fn cadence_elapsed(&self) -> bool {
        self.now_ms.saturating_sub(self.last_tick_ms) >= self.cadence_ms
    }

    /// Hand the accumulated actions to the caller and reset them.
    pub fn take_actions(&mut self) -> CycleActions {
        core::mem::take(&mut self.actions)
    }
}
