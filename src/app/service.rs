//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the cycle FSM, its context, the poll gate and the
//! actuation controller.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌────────────────────────┐ ──▶ TelemetryPort
//!  ActuatorPort ◀──│      AppService        │ ──▶ EventSink
//!   DisplayPort ◀──│  FSM · Gate · Actuation│
//!                  └────────────────────────┘
//! ```
//!
//! A cadence tick always runs read → classify → render → actuate →
//! publish, in that order, for exactly one mode.

use log::{debug, info};

use crate::actuation::{ActuationController, ActuatorState, AlertProgress};
use crate::config::SystemConfig;
use crate::fsm::context::{CycleActions, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::readings::{self, Mode, Reading, ReadingValue, SensorKind};
use crate::scheduler::IntervalGate;
use crate::telemetry::Topic;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort, TelemetryPort};

/// Idle screen text.
pub const IDLE_LINE_1: &str = "No human detected";
pub const IDLE_LINE_2: &str = "Waiting...";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    gate: IntervalGate,
    actuation: ActuationController,
    config: SystemConfig,
    cycles: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(u64::from(config.timing.cadence_ms));
        let gate = IntervalGate::new(u64::from(config.timing.poll_interval_ms));
        let actuation = ActuationController::new(config.servo, config.alert);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);

        Self {
            fsm,
            ctx,
            gate,
            actuation,
            config,
            cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run Idle's entry action: actuators neutral, idle screen shown.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ActuatorPort + DisplayPort),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        let actions = self.ctx.take_actions();
        self.apply_state_actions(actions, hw, telemetry);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// One main-loop pass.  Sensor upkeep and the alert timeline run every
    /// pass; presence and the FSM run only when the poll gate opens.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        hw.service();

        if self.actuation.poll(now_ms, hw) == AlertProgress::Finished {
            sink.emit(&AppEvent::Alert(false));
        }

        if !self.gate.ready(now_ms) {
            return;
        }

        let prev_state = self.fsm.current_state();
        self.ctx.now_ms = now_ms;
        self.ctx.presence = hw.presence();
        self.fsm.tick(&mut self.ctx);
        let actions = self.ctx.take_actions();

        self.apply_state_actions(actions, hw, telemetry);
        if let Some(mode) = actions.run_mode {
            self.run_cycle(mode, now_ms, hw, telemetry, sink);
        }

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an inbound command immediately.  A servo override is
    /// superseded by the next mode-driven positioning.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetServo(angle) => {
                let applied = self.actuation.set_position(angle, hw);
                info!("Servo command {}° {}", angle, if applied { "applied" } else { "rejected" });
                sink.emit(&AppEvent::ServoCommand { angle, applied });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Next mode the Active state will run.
    pub fn mode_index(&self) -> u8 {
        self.ctx.mode_index
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuation.state()
    }

    /// Completed cadence ticks since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_state_actions(
        &mut self,
        actions: CycleActions,
        hw: &mut (impl ActuatorPort + DisplayPort),
        telemetry: &mut impl TelemetryPort,
    ) {
        if actions.neutralize {
            self.actuation.reset_neutral(hw);
        }
        if actions.show_idle {
            hw.show(IDLE_LINE_1, IDLE_LINE_2);
        }
        if actions.report_presence {
            telemetry.publish(Topic::IrSensor, readings::format_flag(true));
        }
    }

    fn run_cycle(
        &mut self,
        mode: Mode,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort + DisplayPort),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        // 1. Read
        let reading = match mode.kind() {
            SensorKind::Temperature => Reading::temperature(hw.read_temperature(), now_ms),
            SensorKind::Ecg => Reading::ecg(hw.read_ecg(), now_ms),
            SensorKind::Pressure => Reading::pressure(hw.read_pressure(), now_ms),
            SensorKind::Oximetry => {
                let (spo2, heart_rate) = hw.read_oximetry();
                Reading::oximetry(spo2, heart_rate, now_ms)
            }
        };

        // 2. Classify
        let classification = reading.classify(&self.config.thresholds);

        // 3. Render
        let (line1, line2) = reading.display_lines(classification);
        hw.show(&line1, &line2);

        // 4. Actuate
        self.actuation.position_for_mode(mode, hw);
        self.actuation.indicate(classification.is_normal(), hw);
        if self.config.alert.alert_on_abnormal
            && !classification.is_normal()
            && !self.actuation.state().alert_active
        {
            self.actuation.enter_alert(now_ms, hw);
            sink.emit(&AppEvent::Alert(true));
        }

        // 5. Publish
        let values = match reading.value {
            ReadingValue::Single(v) => [Some(v), None],
            ReadingValue::Oximetry { spo2, heart_rate } => [Some(heart_rate), Some(spo2)],
        };
        for (topic, value) in Topic::for_mode(mode).iter().zip(values.into_iter().flatten()) {
            telemetry.publish(*topic, &readings::format_value(value));
        }

        self.cycles += 1;
        debug!("Cycle {} done ({:?} = {})", self.cycles, mode, classification);
        sink.emit(&AppEvent::Cycle {
            mode,
            reading,
            classification,
        });
    }
}
