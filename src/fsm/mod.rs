//! Presence-driven cycle state machine.
//!
//! ```text
//!            presence                      cadence elapsed
//!   ┌──────┐ ───────▶ ┌──────────────┐ ───────────────────┐
//!   │ Idle │          │ Active(mode) │                    │
//!   └──────┘ ◀─────── └──────────────┘ ◀──────────────────┘
//!            no presence                mode = (mode+1) % 4
//! ```
//!
//! States live in a table of handler rows indexed by [`StateId`].  Every
//! gate tick calls the current row's `on_update`; a returned id switches
//! rows through `on_exit` then `on_enter`.  Handlers only record requested
//! [`CycleActions`](context::CycleActions) in the [`FsmContext`]; the
//! application service performs the I/O.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Cycle states, numbered by their row in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Nobody in front of the device.
    Idle = 0,
    /// Presence detected; rotating through the sensor modes.
    Active = 1,
}

impl StateId {
    pub const COUNT: usize = 2;

    pub fn from_index(idx: usize) -> Self {
        if idx == Self::Active as usize {
            Self::Active
        } else {
            debug_assert_eq!(idx, 0, "no state row {idx}");
            Self::Idle
        }
    }
}

// ---------------------------------------------------------------------------
// Handler rows
// ---------------------------------------------------------------------------

/// Entry or exit hook.
pub type HookFn = fn(&mut FsmContext);

/// Per-tick handler; `Some(id)` requests a switch to that state.
pub type UpdateFn = fn(&mut FsmContext) -> Option<StateId>;

pub struct StateRow {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<HookFn>,
    pub on_exit: Option<HookFn>,
    pub on_update: UpdateFn,
}

pub type StateTable = [StateRow; StateId::COUNT];

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    rows: StateTable,
    current: StateId,
    /// `ctx.now_ms` when the current state was entered.
    entered_at_ms: u64,
}

impl Fsm {
    pub fn new(rows: StateTable, initial: StateId) -> Self {
        Self {
            rows,
            current: initial,
            entered_at_ms: 0,
        }
    }

    /// Run the initial state's entry hook.  Call once before any `tick`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("Cycle: starting in {}", self.row().name);
        self.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.row().on_enter {
            enter(ctx);
        }
    }

    /// One gate tick against the inputs already stored in `ctx`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        if let Some(next) = (self.row().on_update)(ctx) {
            if next != self.current {
                self.switch_to(next, ctx);
            }
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Milliseconds spent in the current state as of `now_ms`.
    pub fn time_in_state_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_at_ms)
    }

    fn row(&self) -> &StateRow {
        &self.rows[self.current as usize]
    }

    fn switch_to(&mut self, next: StateId, ctx: &mut FsmContext) {
        let from = self.row().name;
        if let Some(exit) = self.row().on_exit {
            exit(ctx);
        }
        self.current = next;
        info!(
            "Cycle: {} -> {} after {} ms",
            from,
            self.row().name,
            self.time_in_state_ms(ctx.now_ms)
        );
        self.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.row().on_enter {
            enter(ctx);
        }
    }
}
