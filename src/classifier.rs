//! Threshold classification of vital-sign readings.
//!
//! Pure and total: every `f32`, including NaN, maps to a category.  NaN
//! is treated as an unusable reading and lands in the abnormal category
//! of its kind, so a broken sensor never shows up as "Normal".

use core::fmt;

use crate::config::Thresholds;
use crate::readings::SensorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureClass {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcgClass {
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureClass {
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spo2Class {
    Low,
    Normal,
}

/// Category assigned to one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Temperature(TemperatureClass),
    Ecg(EcgClass),
    Pressure(PressureClass),
    Spo2(Spo2Class),
}

impl Classification {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Temperature(TemperatureClass::Low) | Self::Spo2(Spo2Class::Low) => "Low",
            Self::Temperature(TemperatureClass::High)
            | Self::Ecg(EcgClass::High)
            | Self::Pressure(PressureClass::High) => "High",
            _ => "Normal",
        }
    }

    pub fn is_normal(self) -> bool {
        matches!(
            self,
            Self::Temperature(TemperatureClass::Normal)
                | Self::Ecg(EcgClass::Normal)
                | Self::Pressure(PressureClass::Normal)
                | Self::Spo2(Spo2Class::Normal)
        )
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify_temperature(celsius: f32, t: &Thresholds) -> TemperatureClass {
    if celsius.is_nan() || celsius < t.temperature_low_c {
        TemperatureClass::Low
    } else if celsius > t.temperature_high_c {
        TemperatureClass::High
    } else {
        TemperatureClass::Normal
    }
}

pub fn classify_ecg(raw: f32, t: &Thresholds) -> EcgClass {
    if raw < t.ecg_high {
        EcgClass::Normal
    } else {
        EcgClass::High
    }
}

pub fn classify_pressure(raw: f32, t: &Thresholds) -> PressureClass {
    if raw < t.pressure_high {
        PressureClass::Normal
    } else {
        PressureClass::High
    }
}

pub fn classify_spo2(percent: f32, t: &Thresholds) -> Spo2Class {
    if percent >= t.spo2_low_percent {
        Spo2Class::Normal
    } else {
        Spo2Class::Low
    }
}

/// Classify `value` as a reading of `kind`.  For oximetry the value is the
/// SpO2 percentage; heart rate is reported but not classified.
pub fn classify(kind: SensorKind, value: f32, t: &Thresholds) -> Classification {
    match kind {
        SensorKind::Temperature => Classification::Temperature(classify_temperature(value, t)),
        SensorKind::Ecg => Classification::Ecg(classify_ecg(value, t)),
        SensorKind::Pressure => Classification::Pressure(classify_pressure(value, t)),
        SensorKind::Oximetry => Classification::Spo2(classify_spo2(value, t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn th() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn temperature_bands_are_boundary_exact() {
        let t = th();
        assert_eq!(classify_temperature(36.0, &t), TemperatureClass::Low);
        assert_eq!(classify_temperature(36.1, &t), TemperatureClass::Normal);
        assert_eq!(classify_temperature(36.8, &t), TemperatureClass::Normal);
        assert_eq!(classify_temperature(37.2, &t), TemperatureClass::Normal);
        assert_eq!(classify_temperature(37.21, &t), TemperatureClass::High);
    }

    #[test]
    fn ecg_boundary_is_high() {
        let t = th();
        assert_eq!(classify_ecg(511.0, &t), EcgClass::Normal);
        assert_eq!(classify_ecg(512.0, &t), EcgClass::High);
    }

    #[test]
    fn pressure_boundary_is_high() {
        let t = th();
        assert_eq!(classify_pressure(499.9, &t), PressureClass::Normal);
        assert_eq!(classify_pressure(500.0, &t), PressureClass::High);
    }

    #[test]
    fn spo2_boundary_is_normal() {
        let t = th();
        assert_eq!(classify_spo2(94.9, &t), Spo2Class::Low);
        assert_eq!(classify_spo2(95.0, &t), Spo2Class::Normal);
        assert_eq!(classify_spo2(0.0, &t), Spo2Class::Low);
    }

    #[test]
    fn nan_maps_to_abnormal_category() {
        let t = th();
        let nan = f32::NAN;
        assert_eq!(classify_temperature(nan, &t), TemperatureClass::Low);
        assert_eq!(classify_ecg(nan, &t), EcgClass::High);
        assert_eq!(classify_pressure(nan, &t), PressureClass::High);
        assert_eq!(classify_spo2(nan, &t), Spo2Class::Low);
    }

    #[test]
    fn dispatch_and_labels() {
        let t = th();
        let c = classify(SensorKind::Temperature, 38.5, &t);
        assert_eq!(c, Classification::Temperature(TemperatureClass::High));
        assert_eq!(c.label(), "High");
        assert!(!c.is_normal());

        let c = classify(SensorKind::Oximetry, 98.0, &t);
        assert_eq!(c.label(), "Normal");
        assert!(c.is_normal());

        assert_eq!(classify(SensorKind::Ecg, 100.0, &t).to_string(), "Normal");
        assert_eq!(classify(SensorKind::Oximetry, 80.0, &t).to_string(), "Low");
    }
}
