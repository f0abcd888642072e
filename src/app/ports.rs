//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, display, telemetry, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::telemetry::Topic;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
///
/// Reads never fail from the caller's point of view; an adapter that
/// cannot produce a value logs the cause and returns the sentinel `0.0`.
pub trait SensorPort {
    /// IR proximity sensor: `true` when a person is in front of the device.
    fn presence(&mut self) -> bool;

    /// Body temperature in °C.  May block for the conversion settle time.
    fn read_temperature(&mut self) -> f32;

    /// Raw ECG ADC value.
    fn read_ecg(&mut self) -> f32;

    /// Raw pressure ADC value.
    fn read_pressure(&mut self) -> f32;

    /// Latest `(spo2_percent, heart_rate_bpm)` estimate, unclamped.
    fn read_oximetry(&mut self) -> (f32, f32);

    /// Background upkeep, called on every loop pass (oximeter FIFO drain).
    fn service(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Move the servo to `angle` degrees (0–180, already validated).
    fn set_servo(&mut self, angle: u8);

    /// Drive the green/red indicator pair.
    fn set_indicators(&mut self, green: bool, red: bool);

    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character display)
// ───────────────────────────────────────────────────────────────

/// Two-line text output.  Implementations clear the previous content and
/// fit each line to the display width.
pub trait DisplayPort {
    fn show(&mut self, line1: &str, line2: &str);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → broker)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget publishing.
pub trait TelemetryPort {
    fn is_connected(&self) -> bool;

    /// Publish `payload` on `topic`.  Dropped silently when disconnected.
    fn publish(&mut self, topic: Topic, payload: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.
pub trait ClockPort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading the device configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("device config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
