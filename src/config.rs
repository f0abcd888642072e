//! System configuration parameters
//!
//! All tunable parameters for the VitalMon system.  Classification
//! thresholds and timing are fixed at build time; network settings are
//! injected from the device configuration document (`config/device.json`)
//! so credentials never live in source.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Classification boundaries for every sensor kind.
///
/// Boundaries are exclusive on the "below" side: a value strictly below
/// `*_low`/`*_high` falls into the lower class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Body temperature below this is `Low` (°C).
    pub temperature_low_c: f32,
    /// Body temperature above this is `High` (°C).
    pub temperature_high_c: f32,
    /// Raw ECG ADC value at or above this is `High`.
    pub ecg_high: f32,
    /// Raw pressure ADC value at or above this is `High`.
    pub pressure_high: f32,
    /// SpO2 below this is `Low` (%).
    pub spo2_low_percent: f32,
}

impl Thresholds {
    pub const TEMPERATURE_LOW_C: f32 = 36.1;
    pub const TEMPERATURE_HIGH_C: f32 = 37.2;
    pub const ECG_HIGH: f32 = 512.0;
    pub const PRESSURE_HIGH: f32 = 500.0;
    pub const SPO2_LOW_PERCENT: f32 = 95.0;
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature_low_c: Self::TEMPERATURE_LOW_C,
            temperature_high_c: Self::TEMPERATURE_HIGH_C,
            ecg_high: Self::ECG_HIGH,
            pressure_high: Self::PRESSURE_HIGH,
            spo2_low_percent: Self::SPO2_LOW_PERCENT,
        }
    }
}

/// Two-tier loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Presence / FSM gate (milliseconds).
    pub poll_interval_ms: u32,
    /// Sensor cadence, one mode per interval (milliseconds).
    pub cadence_ms: u32,
    /// DS18B20 conversion settle delay (milliseconds).
    pub temperature_settle_ms: u32,
    /// Fixed delay between broker connection attempts (milliseconds).
    pub reconnect_delay_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            cadence_ms: 5_000,
            temperature_settle_ms: 1_000,
            reconnect_delay_ms: 5_000,
        }
    }
}

/// Alert window timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// How long the buzzer sounds at the start of an alert.
    pub buzzer_ms: u32,
    /// How long the servo is held open before returning to neutral.
    pub hold_ms: u32,
    /// Enter the alert window when a cycle reading is abnormal.
    pub alert_on_abnormal: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            buzzer_ms: 500,
            hold_ms: 120_000,
            alert_on_abnormal: false,
        }
    }
}

/// Servo positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Angle per mode: temperature, ECG, pressure, oximetry.
    pub mode_angles: [u8; 4],
    /// Neutral (idle) angle.
    pub neutral_angle: u8,
    /// Angle held during an alert window.
    pub alert_angle: u8,
}

impl ServoConfig {
    pub const MAX_ANGLE: u8 = 180;
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            mode_angles: [45, 90, 135, 180],
            neutral_angle: 0,
            alert_angle: 180,
        }
    }
}

/// MQTT broker session parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String<64>,
    /// TLS port (8883 for MQTTS).
    pub port: u16,
    pub username: String<32>,
    pub password: String<64>,
    pub client_id: String<32>,
    /// Prefix for every published topic (`<prefix>/temperature`, ...).
    pub device_prefix: String<16>,
    /// Inbound servo command topic.
    pub command_topic: String<32>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8883,
            username: String::new(),
            password: String::new(),
            client_id: fixed("ESP32Client"),
            device_prefix: fixed("ESP32"),
            command_topic: fixed("servo/control"),
        }
    }
}

/// Wi-Fi station credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String<32>,
    pub password: String<64>,
}

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub thresholds: Thresholds,
    pub timing: TimingConfig,
    pub alert: AlertConfig,
    pub servo: ServoConfig,
    pub broker: BrokerConfig,
    pub wifi: WifiConfig,
}

impl SystemConfig {
    /// Parse and validate a JSON configuration document.  Missing sections
    /// fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let finite = [
            t.temperature_low_c,
            t.temperature_high_c,
            t.ecg_high,
            t.pressure_high,
            t.spo2_low_percent,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("thresholds must be finite"));
        }
        if t.temperature_low_c > t.temperature_high_c {
            return Err(ConfigError::ValidationFailed(
                "temperature_low_c must not exceed temperature_high_c",
            ));
        }
        if !(0.0..=100.0).contains(&t.spo2_low_percent) {
            return Err(ConfigError::ValidationFailed("spo2_low_percent outside 0..=100"));
        }

        let timing = &self.timing;
        if timing.poll_interval_ms == 0 || timing.cadence_ms == 0 {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if timing.poll_interval_ms > timing.cadence_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must not exceed cadence_ms",
            ));
        }
        if timing.reconnect_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("reconnect_delay_ms must be non-zero"));
        }

        if self.alert.buzzer_ms > self.alert.hold_ms {
            return Err(ConfigError::ValidationFailed("buzzer_ms must not exceed hold_ms"));
        }

        let servo = &self.servo;
        let mut angles = servo
            .mode_angles
            .iter()
            .chain([&servo.neutral_angle, &servo.alert_angle]);
        if angles.any(|&a| a > ServoConfig::MAX_ANGLE) {
            return Err(ConfigError::ValidationFailed("servo angle above 180"));
        }

        if self.broker.port == 0 {
            return Err(ConfigError::ValidationFailed("broker port must be non-zero"));
        }
        if self.broker.device_prefix.is_empty() || self.broker.command_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("topic names must be non-empty"));
        }
        Ok(())
    }
}

/// Build a heapless string from a literal known to fit.
fn fixed<const N: usize>(s: &str) -> String<N> {
    debug_assert!(s.len() <= N, "default literal {s:?} exceeds {N} bytes");
    String::try_from(s).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.timing.cadence_ms, 5_000);
        assert_eq!(c.timing.poll_interval_ms, 1_000);
        assert_eq!(c.servo.mode_angles, [45, 90, 135, 180]);
        assert_eq!(c.broker.port, 8883);
        assert_eq!(c.broker.device_prefix.as_str(), "ESP32");
        assert_eq!(c.broker.command_topic.as_str(), "servo/control");
        assert_eq!(c.broker.client_id.as_str(), "ESP32Client");
    }

    #[test]
    fn thresholds_match_named_constants() {
        let t = Thresholds::default();
        assert_eq!(t.temperature_low_c, 36.1);
        assert_eq!(t.temperature_high_c, 37.2);
        assert_eq!(t.ecg_high, 512.0);
        assert_eq!(t.pressure_high, 500.0);
        assert_eq!(t.spo2_low_percent, 95.0);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.timing.poll_interval_ms < c.timing.cadence_ms,
            "presence poll should be faster than the sensor cadence"
        );
        assert!(c.alert.buzzer_ms < c.alert.hold_ms);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "broker": {
                "host": "broker.example.net",
                "port": 8883,
                "username": "dev",
                "password": "secret",
                "client_id": "bed-7",
                "device_prefix": "ward3",
                "command_topic": "servo/control"
            },
            "wifi": { "ssid": "clinic", "password": "hunter22" }
        }"#;
        let c = SystemConfig::from_json(json).unwrap();
        assert_eq!(c.broker.host.as_str(), "broker.example.net");
        assert_eq!(c.broker.device_prefix.as_str(), "ward3");
        assert_eq!(c.wifi.ssid.as_str(), "clinic");
        assert_eq!(c.timing, TimingConfig::default());
    }

    #[test]
    fn garbage_json_is_corrupted() {
        assert!(matches!(
            SystemConfig::from_json("{ not json"),
            Err(ConfigError::Corrupted)
        ));
    }

    #[test]
    fn inverted_temperature_band_rejected() {
        let mut c = SystemConfig::default();
        c.thresholds.temperature_low_c = 38.0;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn out_of_range_servo_angle_rejected() {
        let mut c = SystemConfig::default();
        c.servo.mode_angles[2] = 200;
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn zero_cadence_rejected() {
        let mut c = SystemConfig::default();
        c.timing.cadence_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = SystemConfig::from_json(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn fixed_copies_literal_that_fits_exactly() {
        let s: String<5> = fixed("ESP32");
        assert_eq!(s.as_str(), "ESP32");
    }
}
