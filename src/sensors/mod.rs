//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and turns driver errors into the
//! logged-sentinel behaviour the cycle expects: a failed read yields `0.0`
//! and never stops the loop.

pub mod analog;
pub mod onewire;
pub mod oximeter;
pub mod presence;
pub mod temperature;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::warn;

use crate::error::InitError;
use crate::readings::SENTINEL;
use analog::{AnalogChannel, AnalogSensor};
use oximeter::Max30100;
use presence::PresenceSensor;
use temperature::Ds18b20;

/// Aggregates all sensor drivers.  Bus handles and the delay provider are
/// passed per call; the LCD shares the I²C bus.
pub struct SensorHub<P> {
    pub temperature: Ds18b20<P>,
    pub ecg: AnalogSensor,
    pub pressure: AnalogSensor,
    pub presence: PresenceSensor,
    pub oximeter: Max30100,
    oximeter_fault: bool,
}

impl<P: InputPin + OutputPin> SensorHub<P> {
    /// `onewire_pin` carries the DS18B20; `oximeter_addr` is the MAX30100's
    /// I²C address.
    pub fn new(onewire_pin: P, oximeter_addr: u8, settle_ms: u32) -> Self {
        Self {
            temperature: Ds18b20::new(onewire_pin, settle_ms),
            ecg: AnalogSensor::new(AnalogChannel::Ecg),
            pressure: AnalogSensor::new(AnalogChannel::Pressure),
            presence: PresenceSensor::new(),
            oximeter: Max30100::new(oximeter_addr),
            oximeter_fault: false,
        }
    }

    pub fn init_oximeter<I: I2c>(&mut self, i2c: &mut I) -> Result<(), InitError> {
        self.oximeter.init(i2c)
    }

    pub fn presence(&mut self) -> bool {
        self.presence.read()
    }

    /// Blocks for the conversion settle time.
    pub fn read_temperature(&mut self, delay: &mut impl DelayNs) -> f32 {
        match self.temperature.read(delay) {
            Ok(celsius) => celsius,
            Err(e) => {
                warn!("DS18B20 read failed: {}", e);
                SENTINEL
            }
        }
    }

    pub fn read_ecg(&mut self) -> f32 {
        self.ecg.read()
    }

    pub fn read_pressure(&mut self) -> f32 {
        self.pressure.read()
    }

    pub fn read_oximetry(&self) -> (f32, f32) {
        self.oximeter.latest()
    }

    /// Drain the oximeter FIFO.  Bus faults are logged once per outage.
    pub fn service<I: I2c>(&mut self, i2c: &mut I) {
        match self.oximeter.service(i2c) {
            Ok(_) if self.oximeter_fault => {
                log::info!("MAX30100 bus recovered");
                self.oximeter_fault = false;
            }
            Ok(_) => {}
            Err(e) if !self.oximeter_fault => {
                warn!("MAX30100 service failed: {}", e);
                self.oximeter_fault = true;
            }
            Err(_) => {}
        }
    }
}
