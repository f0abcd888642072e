//! Unified error types for the VitalMon firmware.
//!
//! A single `Error` enum that every subsystem converts into, with a
//! [`Severity`] that splits failures into the two outcomes the firmware
//! knows: keep running on degraded data, or halt.  All variants are `Copy`
//! so they pass through the control loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// What the control loop does with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log and continue (sentinel reading, dropped publish, retry later).
    Degraded,
    /// Do not operate: log and halt the firmware.
    Fatal,
}

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// An actuator or display bus write failed.
    Actuator(ActuatorError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(InitError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl Error {
    /// Classify this error for the control loop.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Init(InitError::OximeterUnavailable) => Severity::Fatal,
            Self::Config(_) => Severity::Fatal,
            _ => Severity::Degraded,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No device answered the 1-Wire reset pulse.
    NoPresencePulse,
    /// Scratchpad or FIFO data failed its CRC.
    CrcMismatch,
    /// I²C transaction failed.
    BusFault,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPresencePulse => write!(f, "no 1-Wire presence pulse"),
            Self::CrcMismatch => write!(f, "CRC mismatch"),
            Self::BusFault => write!(f, "bus transaction failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Requested servo angle outside 0..=180.
    AngleOutOfRange,
    /// Display I²C write failed.
    DisplayWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AngleOutOfRange => write!(f, "servo angle out of range"),
            Self::DisplayWriteFailed => write!(f, "display write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    BrokerConnectFailed,
    NotConnected,
    PublishFailed,
    SubscribeFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::BrokerConnectFailed => write!(f, "MQTT broker connect failed"),
            Self::NotConnected => write!(f, "MQTT session not connected"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Initialisation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The MAX30100 did not answer or reported the wrong part id.
    /// The monitor must not run without its oximeter.
    OximeterUnavailable,
    /// The character display did not acknowledge on the bus.
    DisplayUnavailable,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OximeterUnavailable => write!(f, "pulse oximeter not detected"),
            Self::DisplayUnavailable => write!(f, "display not detected"),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
