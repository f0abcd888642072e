//! Mock adapters for integration tests.
//!
//! Records every actuator, display and publish call so tests can assert on
//! the full output history without touching real peripherals.

use vitalmon::app::events::AppEvent;
use vitalmon::app::ports::{ActuatorPort, DisplayPort, EventSink, SensorPort, TelemetryPort};
use vitalmon::app::service::AppService;
use vitalmon::config::SystemConfig;
use vitalmon::telemetry::Topic;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Servo(u8),
    Indicators { green: bool, red: bool },
    Buzzer(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Scripted sensors plus recorded outputs.
pub struct MockHardware {
    pub presence: bool,
    pub temperature: f32,
    pub ecg: f32,
    pub pressure: f32,
    pub spo2: f32,
    pub heart_rate: f32,
    pub calls: Vec<ActuatorCall>,
    pub screens: Vec<(String, String)>,
}

#[allow(dead_code)]
impl MockHardware {
    /// All readings inside their normal bands.
    pub fn new() -> Self {
        Self {
            presence: false,
            temperature: 36.6,
            ecg: 300.0,
            pressure: 420.0,
            spo2: 98.0,
            heart_rate: 72.0,
            calls: Vec::new(),
            screens: Vec::new(),
        }
    }

    pub fn servo(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Servo(a) => Some(*a),
            _ => None,
        })
    }

    pub fn servo_moves(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Servo(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn indicators(&self) -> Option<(bool, bool)> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Indicators { green, red } => Some((*green, *red)),
            _ => None,
        })
    }

    pub fn buzzer(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Buzzer(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn screen(&self) -> Option<(&str, &str)> {
        self.screens.last().map(|(a, b)| (a.as_str(), b.as_str()))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn presence(&mut self) -> bool {
        self.presence
    }

    fn read_temperature(&mut self) -> f32 {
        self.temperature
    }

    fn read_ecg(&mut self) -> f32 {
        self.ecg
    }

    fn read_pressure(&mut self) -> f32 {
        self.pressure
    }

    fn read_oximetry(&mut self) -> (f32, f32) {
        (self.spo2, self.heart_rate)
    }

    fn service(&mut self) {}
}

impl ActuatorPort for MockHardware {
    fn set_servo(&mut self, angle: u8) {
        self.calls.push(ActuatorCall::Servo(angle));
    }

    fn set_indicators(&mut self, green: bool, red: bool) {
        self.calls.push(ActuatorCall::Indicators { green, red });
    }

    fn set_buzzer(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Buzzer(on));
    }
}

impl DisplayPort for MockHardware {
    fn show(&mut self, line1: &str, line2: &str) {
        self.screens.push((line1.to_string(), line2.to_string()));
    }
}

// ── MockTelemetry ─────────────────────────────────────────────

pub struct MockTelemetry {
    pub connected: bool,
    pub published: Vec<(Topic, String)>,
}

#[allow(dead_code)]
impl MockTelemetry {
    pub fn new() -> Self {
        Self {
            connected: true,
            published: Vec::new(),
        }
    }

    /// Published payloads on cadence reading topics, in order.
    pub fn readings(&self) -> Vec<(Topic, String)> {
        self.published
            .iter()
            .filter(|(t, _)| !matches!(t, Topic::IrSensor | Topic::Status))
            .cloned()
            .collect()
    }

    pub fn on(&self, topic: Topic) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryPort for MockTelemetry {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: Topic, payload: &str) {
        if self.connected {
            self.published.push((topic, payload.to_string()));
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Service plus mocks, driven on a simulated millisecond clock.
pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub wire: MockTelemetry,
    pub sink: RecordingSink,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            hw: MockHardware::new(),
            wire: MockTelemetry::new(),
            sink: RecordingSink::new(),
            now_ms: 0,
        };
        rig.app
            .start(0, &mut rig.hw, &mut rig.wire, &mut rig.sink);
        rig
    }

    /// One loop pass at the current time.
    pub fn pass(&mut self) {
        self.app
            .poll(self.now_ms, &mut self.hw, &mut self.wire, &mut self.sink);
    }

    /// Poll every `step_ms` up to and including `until_ms`.  The clock is
    /// left at the first unpolled instant.
    pub fn run_until(&mut self, until_ms: u64, step_ms: u64) {
        while self.now_ms <= until_ms {
            self.pass();
            self.now_ms += step_ms;
        }
    }
}
