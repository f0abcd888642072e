//! DS18B20 digital thermometer on the 1-Wire bus.
//!
//! Single device, so every transaction addresses it with SKIP ROM.  A read
//! is convert → settle → read scratchpad → CRC check.  The settle wait is
//! the one long blocking point in the sensor path; the delay provider in
//! `main` feeds the watchdog through it.
//!
//! ## Dual-target design
//!
//! The bus pin and delay are generic, so host tests drive the full
//! protocol against a scripted line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;
use crate::sensors::onewire::{self, OneWire};

const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Worst-case 12-bit conversion is 750 ms; the board waits a full second
/// unless configured otherwise.
pub const SETTLE_MS: u32 = 1_000;

pub const SCRATCHPAD_LEN: usize = 9;

/// Validate a scratchpad and extract the temperature in °C.
///
/// Bytes 0..1 are the signed 12-bit reading in 1/16 °C, byte 8 is the
/// CRC-8 of bytes 0..8.
pub fn decode_scratchpad(sp: &[u8; SCRATCHPAD_LEN]) -> Result<f32, SensorError> {
    if onewire::crc8(&sp[..8]) != sp[8] {
        return Err(SensorError::CrcMismatch);
    }
    let raw = i16::from_le_bytes([sp[0], sp[1]]);
    Ok(f32::from(raw) / 16.0)
}

pub struct Ds18b20<P> {
    bus: OneWire<P>,
    settle_ms: u32,
}

impl<P: InputPin + OutputPin> Ds18b20<P> {
    pub fn new(pin: P, settle_ms: u32) -> Self {
        Self {
            bus: OneWire::new(pin),
            settle_ms,
        }
    }

    /// Blocking conversion and read.
    pub fn read(&mut self, delay: &mut impl DelayNs) -> Result<f32, SensorError> {
        self.bus.reset(delay)?;
        self.bus.write_byte(onewire::CMD_SKIP_ROM, delay)?;
        self.bus.write_byte(CMD_CONVERT_T, delay)?;
        delay.delay_ms(self.settle_ms);

        self.bus.reset(delay)?;
        self.bus.write_byte(onewire::CMD_SKIP_ROM, delay)?;
        self.bus.write_byte(CMD_READ_SCRATCHPAD, delay)?;
        let mut sp = [0u8; SCRATCHPAD_LEN];
        self.bus.read_bytes(&mut sp, delay)?;
        decode_scratchpad(&sp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::onewire::testing::ScriptedLine;

    struct RecordingDelay {
        longest_ms: u32,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {}
        fn delay_ms(&mut self, ms: u32) {
            self.longest_ms = self.longest_ms.max(ms);
        }
    }

    fn scratchpad(raw: u16) -> [u8; SCRATCHPAD_LEN] {
        let [lo, hi] = raw.to_le_bytes();
        let mut sp = [lo, hi, 0x4B, 0x46, 0x7F, 0xFF, 0x0F, 0x10, 0];
        sp[8] = onewire::crc8(&sp[..8]);
        sp
    }

    #[test]
    fn decodes_positive_and_negative() {
        assert_eq!(decode_scratchpad(&scratchpad(0x0191)), Ok(25.0625));
        assert_eq!(decode_scratchpad(&scratchpad(0xFF5E)), Ok(-10.125));
    }

    #[test]
    fn corrupted_scratchpad_is_rejected() {
        let mut sp = scratchpad(0x0191);
        sp[0] ^= 0x01;
        assert_eq!(decode_scratchpad(&sp), Err(SensorError::CrcMismatch));
    }

    #[test]
    fn full_read_waits_for_conversion() {
        let mut sensor = Ds18b20::new(ScriptedLine::new(true, &scratchpad(0x024D)), SETTLE_MS);
        let mut delay = RecordingDelay { longest_ms: 0 };
        assert_eq!(sensor.read(&mut delay), Ok(36.8125));
        assert_eq!(delay.longest_ms, SETTLE_MS);
    }

    #[test]
    fn missing_probe_reports_no_presence() {
        let mut sensor = Ds18b20::new(ScriptedLine::new(false, &[]), SETTLE_MS);
        let mut delay = RecordingDelay { longest_ms: 0 };
        assert_eq!(sensor.read(&mut delay), Err(SensorError::NoPresencePulse));
        assert_eq!(delay.longest_ms, 0);
    }
}
