//! Reading types, the degraded-reading policy, and text formatting.
//!
//! A [`Reading`] lives for exactly one cadence tick.  Out-of-domain
//! oximeter values are replaced by [`SENTINEL`] when the reading is built,
//! which guarantees the clamp always runs before classification.

use core::fmt::Write;

use heapless::String;

use crate::classifier::{self, Classification};
use crate::config::Thresholds;

/// Fallback substituted for an invalid reading.
pub const SENTINEL: f32 = 0.0;

/// One line of display text or one MQTT payload.
pub type TextLine = String<32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Temperature,
    Ecg,
    Pressure,
    /// SpO2 and heart rate from the pulse oximeter.
    Oximetry,
}

/// The four rotating display/publish configurations, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    Temperature = 0,
    Ecg = 1,
    Pressure = 2,
    Oximetry = 3,
}

impl Mode {
    pub const COUNT: u8 = 4;

    /// Mode for a cycle index; indices wrap modulo [`Mode::COUNT`].
    pub fn from_index(idx: u8) -> Self {
        match idx % Self::COUNT {
            0 => Self::Temperature,
            1 => Self::Ecg,
            2 => Self::Pressure,
            _ => Self::Oximetry,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn kind(self) -> SensorKind {
        match self {
            Self::Temperature => SensorKind::Temperature,
            Self::Ecg => SensorKind::Ecg,
            Self::Pressure => SensorKind::Pressure,
            Self::Oximetry => SensorKind::Oximetry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingValue {
    Single(f32),
    Oximetry { spo2: f32, heart_rate: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub kind: SensorKind,
    pub value: ReadingValue,
    /// Monotonic milliseconds since boot.
    pub at_ms: u64,
}

impl Reading {
    pub fn temperature(celsius: f32, at_ms: u64) -> Self {
        Self::single(SensorKind::Temperature, celsius, at_ms)
    }

    pub fn ecg(raw: f32, at_ms: u64) -> Self {
        Self::single(SensorKind::Ecg, raw, at_ms)
    }

    pub fn pressure(raw: f32, at_ms: u64) -> Self {
        Self::single(SensorKind::Pressure, raw, at_ms)
    }

    /// Oximeter reading with the sentinel clamp applied.
    pub fn oximetry(spo2: f32, heart_rate: f32, at_ms: u64) -> Self {
        Self {
            kind: SensorKind::Oximetry,
            value: ReadingValue::Oximetry {
                spo2: clamp_spo2(spo2),
                heart_rate: clamp_heart_rate(heart_rate),
            },
            at_ms,
        }
    }

    fn single(kind: SensorKind, value: f32, at_ms: u64) -> Self {
        Self {
            kind,
            value: ReadingValue::Single(value),
            at_ms,
        }
    }

    /// The value the classifier sees (SpO2 for oximetry).
    pub fn primary(&self) -> f32 {
        match self.value {
            ReadingValue::Single(v) => v,
            ReadingValue::Oximetry { spo2, .. } => spo2,
        }
    }

    pub fn classify(&self, thresholds: &Thresholds) -> Classification {
        classifier::classify(self.kind, self.primary(), thresholds)
    }

    /// Two display lines for this reading.
    pub fn display_lines(&self, class: Classification) -> (TextLine, TextLine) {
        let mut top = TextLine::new();
        let mut bottom = TextLine::new();
        // Lines are sized for the longest label plus a formatted f32;
        // overflow only truncates what the 16-column display cannot show.
        let _ = match (self.kind, self.value) {
            (SensorKind::Oximetry, ReadingValue::Oximetry { spo2, heart_rate }) => {
                let _ = write!(top, "SpO2: {:.2} %", spo2);
                write!(bottom, "HR: {:.2}", heart_rate)
            }
            (SensorKind::Temperature, _) => {
                let _ = write!(top, "Temp: {:.2} C", self.primary());
                write!(bottom, "Class: {}", class)
            }
            (SensorKind::Ecg, _) => {
                let _ = write!(top, "ECG: {:.2}", self.primary());
                write!(bottom, "Class: {}", class)
            }
            (SensorKind::Pressure, _) => {
                let _ = write!(top, "Pressure: {:.2} mmHg", self.primary());
                write!(bottom, "Class: {}", class)
            }
            (SensorKind::Oximetry, ReadingValue::Single(v)) => write!(top, "SpO2: {:.2} %", v),
        };
        (top, bottom)
    }
}

/// SpO2 outside `[0, 100]` (or NaN) becomes the sentinel.
pub fn clamp_spo2(percent: f32) -> f32 {
    if (0.0..=100.0).contains(&percent) {
        percent
    } else {
        SENTINEL
    }
}

/// Non-positive (or NaN) heart rate becomes the sentinel.
pub fn clamp_heart_rate(bpm: f32) -> f32 {
    if bpm > 0.0 { bpm } else { SENTINEL }
}

/// Decimal payload text with two fractional digits.
pub fn format_value(value: f32) -> TextLine {
    let mut out = TextLine::new();
    let _ = write!(out, "{:.2}", value);
    out
}

/// Boolean payload text.
pub fn format_flag(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}
