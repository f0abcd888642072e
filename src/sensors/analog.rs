//! ECG front end and pressure bridge, both single-ended on ADC1.
//!
//! Values are reported as raw 12-bit counts (0–4095); the classifier
//! thresholds are expressed in the same units.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from static atomics for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_ECG_ADC: AtomicU16 = AtomicU16::new(0);
static SIM_PRESSURE_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ecg_adc(raw: u16) {
    SIM_ECG_ADC.store(raw, Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressure_adc(raw: u16) {
    SIM_PRESSURE_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale count of the 12-bit converter.
pub const ADC_MAX: u16 = 4095;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    Ecg,
    Pressure,
}

pub struct AnalogSensor {
    channel: AnalogChannel,
    last_raw: u16,
}

impl AnalogSensor {
    pub fn new(channel: AnalogChannel) -> Self {
        Self {
            channel,
            last_raw: 0,
        }
    }

    pub fn read(&mut self) -> f32 {
        self.last_raw = self.read_adc().min(ADC_MAX);
        f32::from(self.last_raw)
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        match self.channel {
            AnalogChannel::Ecg => hw_init::adc1_read(pins::ECG_ADC_CHANNEL),
            AnalogChannel::Pressure => hw_init::adc1_read(pins::PRESSURE_ADC_CHANNEL),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        match self.channel {
            AnalogChannel::Ecg => SIM_ECG_ADC.load(Ordering::Relaxed),
            AnalogChannel::Pressure => SIM_PRESSURE_ADC.load(Ordering::Relaxed),
        }
    }
}
