//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the shared I²C bus, the delay provider, the [`SensorHub`] and all
//! output drivers, exposing them through [`SensorPort`], [`ActuatorPort`]
//! and [`DisplayPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{ActuatorPort, DisplayPort, SensorPort};
use crate::drivers::indicators::{IndicatorLevels, Indicators};
use crate::drivers::lcd::Lcd;
use crate::drivers::servo::ServoDriver;
use crate::error::InitError;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, P, D> {
    i2c: I,
    delay: D,
    sensor_hub: SensorHub<P>,
    lcd: Lcd,
    lcd_ready: bool,
    servo: ServoDriver,
    indicators: Indicators,
}

impl<I, P, D> HardwareAdapter<I, P, D>
where
    I: I2c,
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D, sensor_hub: SensorHub<P>, lcd: Lcd) -> Self {
        Self {
            i2c,
            delay,
            sensor_hub,
            lcd,
            lcd_ready: false,
            servo: ServoDriver::new(),
            indicators: Indicators::new(),
        }
    }

    /// Bring up the bus devices.  A missing display only degrades the
    /// monitor; a missing oximeter is returned to the caller.  Indicators
    /// are forced dark first so a halted board stays silent.
    pub fn init(&mut self) -> Result<(), InitError> {
        self.indicators.all_off();
        match self.lcd.init(&mut self.i2c, &mut self.delay) {
            Ok(()) => self.lcd_ready = true,
            Err(e) => warn!("LCD: {}, continuing without display", e),
        }
        self.sensor_hub.init_oximeter(&mut self.i2c)
    }

    pub fn display_ready(&self) -> bool {
        self.lcd_ready
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.angle()
    }

    pub fn indicator_levels(&self) -> IndicatorLevels {
        self.indicators.levels()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I, P, D> SensorPort for HardwareAdapter<I, P, D>
where
    I: I2c,
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn presence(&mut self) -> bool {
        self.sensor_hub.presence()
    }

    fn read_temperature(&mut self) -> f32 {
        self.sensor_hub.read_temperature(&mut self.delay)
    }

    fn read_ecg(&mut self) -> f32 {
        self.sensor_hub.read_ecg()
    }

    fn read_pressure(&mut self) -> f32 {
        self.sensor_hub.read_pressure()
    }

    fn read_oximetry(&mut self) -> (f32, f32) {
        self.sensor_hub.read_oximetry()
    }

    fn service(&mut self) {
        self.sensor_hub.service(&mut self.i2c);
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I, P, D> ActuatorPort for HardwareAdapter<I, P, D>
where
    I: I2c,
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn set_servo(&mut self, angle: u8) {
        if let Err(e) = self.servo.set_angle(angle) {
            warn!("Servo {}°: {}", angle, e);
        }
    }

    fn set_indicators(&mut self, green: bool, red: bool) {
        self.indicators.set_leds(green, red);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.indicators.set_buzzer(on);
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<I, P, D> DisplayPort for HardwareAdapter<I, P, D>
where
    I: I2c,
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn show(&mut self, line1: &str, line2: &str) {
        if !self.lcd_ready {
            return;
        }
        if let Err(e) = self.lcd.show(&mut self.i2c, line1, line2) {
            warn!("LCD: {}", e);
        }
    }
}
