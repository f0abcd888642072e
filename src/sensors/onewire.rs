//! Bit-banged 1-Wire master on a single open-drain line.
//!
//! Standard-speed slot timings (Maxim AN126).  The line is generic over any
//! `embedded-hal` pin that can both drive low and be sampled, so the
//! protocol is exercised on host against a scripted pin.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

pub const CMD_SKIP_ROM: u8 = 0xCC;

// Slot timings, microseconds.
const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;
const WRITE_ONE_LOW_US: u32 = 6;
const WRITE_ONE_RELEASE_US: u32 = 64;
const WRITE_ZERO_LOW_US: u32 = 60;
const WRITE_ZERO_RELEASE_US: u32 = 10;
const READ_LOW_US: u32 = 6;
const READ_SAMPLE_US: u32 = 9;
const READ_RECOVERY_US: u32 = 55;

/// Dallas/Maxim CRC-8 (polynomial x⁸ + x⁵ + x⁴ + 1, reflected 0x8C).
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

pub struct OneWire<P> {
    pin: P,
}

impl<P: InputPin + OutputPin> OneWire<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Reset pulse.  Fails if no device pulls the line low afterwards.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        self.pin.set_low().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(RESET_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(PRESENCE_SAMPLE_US);
        let present = self.pin.is_low().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(RESET_RECOVERY_US);
        if present {
            Ok(())
        } else {
            Err(SensorError::NoPresencePulse)
        }
    }

    /// Write one byte, LSB first.
    pub fn write_byte(&mut self, byte: u8, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        for bit in 0..8 {
            self.write_bit(byte & (1 << bit) != 0, delay)?;
        }
        Ok(())
    }

    /// Read one byte, LSB first.
    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, SensorError> {
        let mut byte = 0u8;
        for bit in 0..8 {
            if self.read_bit(delay)? {
                byte |= 1 << bit;
            }
        }
        Ok(byte)
    }

    pub fn read_bytes(&mut self, buf: &mut [u8], delay: &mut impl DelayNs) -> Result<(), SensorError> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte(delay)?;
        }
        Ok(())
    }

    fn write_bit(&mut self, one: bool, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        let (low, release) = if one {
            (WRITE_ONE_LOW_US, WRITE_ONE_RELEASE_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_RELEASE_US)
        };
        self.pin.set_low().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(low);
        self.pin.set_high().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(release);
        Ok(())
    }

    fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, SensorError> {
        self.pin.set_low().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(READ_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(READ_SAMPLE_US);
        let high = self.pin.is_high().map_err(|_| SensorError::BusFault)?;
        delay.delay_us(READ_RECOVERY_US);
        Ok(high)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted 1-Wire slave for host tests.

    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

    /// Answers every reset with `present` and read slots with the bits of
    /// `reply`, LSB first (0xFF once exhausted).  The master samples resets
    /// with `is_low` and read slots with `is_high`.
    pub struct ScriptedLine {
        present: bool,
        reply: std::vec::Vec<u8>,
        read_bit: usize,
        lows: u32,
    }

    impl ScriptedLine {
        pub fn new(present: bool, reply: &[u8]) -> Self {
            Self {
                present,
                reply: reply.to_vec(),
                read_bit: 0,
                lows: 0,
            }
        }

        pub fn low_pulses(&self) -> u32 {
            self.lows
        }
    }

    impl ErrorType for ScriptedLine {
        type Error = Infallible;
    }

    impl OutputPin for ScriptedLine {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.lows += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl InputPin for ScriptedLine {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            let byte = self.reply.get(self.read_bit / 8).copied().unwrap_or(0xFF);
            self.read_bit += 1;
            Ok(byte & (1 << ((self.read_bit - 1) % 8)) != 0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.present)
        }
    }
}
