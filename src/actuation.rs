//! Actuation controller, the single owner of [`ActuatorState`].
//!
//! Mode-driven positioning, the alert window and inbound servo commands
//! all go through this controller, so the last writer wins and the cached
//! state always matches what was last sent to the [`ActuatorPort`].
//!
//! The alert window is a non-blocking timeline advanced by [`poll`]:
//!
//! ```text
//!  enter_alert(t) ─▶ red + buzzer on, servo open
//!  t + buzzer_ms  ─▶ buzzer off
//!  t + hold_ms    ─▶ neutral (LEDs off, servo neutral)
//! ```
//!
//! [`poll`]: ActuationController::poll

use log::{debug, info, warn};

use crate::app::ports::ActuatorPort;
use crate::config::{AlertConfig, ServoConfig};
use crate::readings::Mode;
use crate::scheduler::Deadline;

/// Last commanded actuator outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub servo_angle: u8,
    pub alert_active: bool,
    pub green: bool,
    pub red: bool,
    pub buzzer: bool,
}

impl ActuatorState {
    pub fn neutral(angle: u8) -> Self {
        Self {
            servo_angle: angle,
            alert_active: false,
            green: false,
            red: false,
            buzzer: false,
        }
    }
}

/// Outcome of one [`ActuationController::poll`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertProgress {
    /// No alert, or nothing changed this pass.
    Unchanged,
    /// The buzzer phase ended.
    BuzzerReleased,
    /// The hold window ended and the actuators are neutral again.
    Finished,
}

pub struct ActuationController {
    state: ActuatorState,
    servo: ServoConfig,
    alert: AlertConfig,
    buzzer_off: Deadline,
    hold_end: Deadline,
}

impl ActuationController {
    /// The cache starts neutral; call [`reset_neutral`](Self::reset_neutral)
    /// once to push that state to the hardware.
    pub fn new(servo: ServoConfig, alert: AlertConfig) -> Self {
        Self {
            state: ActuatorState::neutral(servo.neutral_angle),
            servo,
            alert,
            buzzer_off: Deadline::default(),
            hold_end: Deadline::default(),
        }
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Move the servo.  Angles above 180 are rejected and leave the state
    /// unchanged.
    pub fn set_position(&mut self, angle: u8, hw: &mut impl ActuatorPort) -> bool {
        if angle > ServoConfig::MAX_ANGLE {
            warn!("Servo angle {} rejected (max {})", angle, ServoConfig::MAX_ANGLE);
            return false;
        }
        hw.set_servo(angle);
        self.state.servo_angle = angle;
        true
    }

    /// Position the servo for `mode`.  Suppressed while an alert holds the
    /// servo open; returns whether the servo moved.
    pub fn position_for_mode(&mut self, mode: Mode, hw: &mut impl ActuatorPort) -> bool {
        if self.state.alert_active {
            debug!("Mode positioning suppressed during alert");
            return false;
        }
        let angle = self.servo.mode_angles[mode.index() as usize];
        self.set_position(angle, hw)
    }

    /// Light green for a normal classification, red otherwise.  The alert
    /// window owns the LEDs while it is active.
    pub fn indicate(&mut self, normal: bool, hw: &mut impl ActuatorPort) {
        if self.state.alert_active {
            return;
        }
        self.write_indicators(normal, !normal, hw);
    }

    /// Open the alert window at `now_ms`.  Re-entering while active restarts
    /// the timeline.
    pub fn enter_alert(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) {
        info!(
            "Alert: buzzer {} ms, hold {} ms",
            self.alert.buzzer_ms, self.alert.hold_ms
        );
        self.state.alert_active = true;
        self.write_indicators(false, true, hw);
        self.write_buzzer(true, hw);
        self.set_position(self.servo.alert_angle, hw);
        self.buzzer_off.arm(now_ms, u64::from(self.alert.buzzer_ms));
        self.hold_end.arm(now_ms, u64::from(self.alert.hold_ms));
    }

    /// Cancel any alert and return to neutral.
    pub fn clear_alert(&mut self, hw: &mut impl ActuatorPort) {
        if self.state.alert_active {
            info!("Alert cleared");
            self.reset_neutral(hw);
        }
    }

    /// LEDs off, buzzer off, servo neutral, alert cancelled.
    pub fn reset_neutral(&mut self, hw: &mut impl ActuatorPort) {
        self.buzzer_off.cancel();
        self.hold_end.cancel();
        self.state.alert_active = false;
        self.write_indicators(false, false, hw);
        self.write_buzzer(false, hw);
        self.set_position(self.servo.neutral_angle, hw);
    }

    /// Advance the alert timeline.  Call on every loop pass.
    pub fn poll(&mut self, now_ms: u64, hw: &mut impl ActuatorPort) -> AlertProgress {
        if !self.state.alert_active {
            return AlertProgress::Unchanged;
        }
        if self.hold_end.expired(now_ms) {
            info!("Alert hold elapsed, returning to neutral");
            self.reset_neutral(hw);
            return AlertProgress::Finished;
        }
        if self.buzzer_off.expired(now_ms) {
            self.write_buzzer(false, hw);
            return AlertProgress::BuzzerReleased;
        }
        AlertProgress::Unchanged
    }

    fn write_indicators(&mut self, green: bool, red: bool, hw: &mut impl ActuatorPort) {
        hw.set_indicators(green, red);
        self.state.green = green;
        self.state.red = red;
    }

    fn write_buzzer(&mut self, on: bool, hw: &mut impl ActuatorPort) {
        hw.set_buzzer(on);
        self.state.buzzer = on;
    }
}
