//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  IDLE ──[presence]──▶ ACTIVE(0)
//!    ▲                     │  [cadence elapsed]
//!    │                     ▼
//!    │                  ACTIVE(i) ──▶ ACTIVE((i+1) mod 4)
//!    │                     │
//!    └───[no presence]─────┘
//! ```

use super::context::FsmContext;
use super::{StateId, StateRow, StateTable};
use crate::readings::Mode;
use log::{debug, info};

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> StateTable {
    [
        // Index 0: Idle
        StateRow {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Active
        StateRow {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: None,
            on_update: active_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.actions.neutralize = true;
    ctx.actions.show_idle = true;
    info!("IDLE: no human detected, actuators neutral");
}

fn idle_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.presence {
        return Some(StateId::Active);
    }
    // Re-home every gated poll; a command given while idle does not stick.
    ctx.actions.neutralize = true;
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE state: one sensor mode per cadence interval
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.mode_index = 0;
    // Anchor the cadence at entry: the first read comes one interval later.
    ctx.last_tick_ms = ctx.now_ms;
    ctx.actions.report_presence = true;
    info!("ACTIVE: human detected, cycling every {} ms", ctx.cadence_ms);
}

fn active_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.presence {
        return Some(StateId::Idle);
    }

    if ctx.cadence_elapsed() {
        let mode = Mode::from_index(ctx.mode_index);
        debug!("ACTIVE: cadence tick, mode {:?}", mode);
        ctx.actions.run_mode = Some(mode);
        ctx.mode_index = (ctx.mode_index + 1) % Mode::COUNT;
        ctx.last_tick_ms = ctx.now_ms;
    }

    None
}
