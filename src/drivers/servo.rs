//! Hobby servo driver on LEDC channel 0.
//!
//! 50 Hz frame, pulse width linear in angle between
//! [`pins::SERVO_MIN_PULSE_US`] (0°) and [`pins::SERVO_MAX_PULSE_US`] (180°).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the LEDC duty register via hw_init helpers.
//! On host/test: tracks the commanded angle in-memory only.

use crate::config::ServoConfig;
use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

/// PWM frame period at 50 Hz.
const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;

/// Pulse width for `angle` degrees.  Angles past the mechanical limit are
/// saturated; callers reject them before this point.
pub fn pulse_width_us(angle: u8) -> u32 {
    let angle = u32::from(angle.min(ServoConfig::MAX_ANGLE));
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    pins::SERVO_MIN_PULSE_US + angle * span / u32::from(ServoConfig::MAX_ANGLE)
}

/// LEDC duty value for a pulse of `pulse_us` within one frame.
pub fn duty_for_pulse(pulse_us: u32) -> u32 {
    let full_scale = 1u32 << hw_init::SERVO_DUTY_BITS;
    pulse_us * full_scale / FRAME_US
}

pub struct ServoDriver {
    angle: Option<u8>,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { angle: None }
    }

    pub fn set_angle(&mut self, angle: u8) -> Result<(), ActuatorError> {
        if angle > ServoConfig::MAX_ANGLE {
            return Err(ActuatorError::AngleOutOfRange);
        }
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty_for_pulse(pulse_width_us(angle)));
        self.angle = Some(angle);
        Ok(())
    }

    /// Last commanded angle, `None` before the first move.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
