//! HD44780 16x2 character display behind a PCF8574 I²C backpack.
//!
//! Backpack wiring (the common "LCM1602" module):
//!
//! ```text
//!  PCF8574  P7 P6 P5 P4 | P3 | P2 | P1 | P0
//!  HD44780  D7 D6 D5 D4 | BL | EN | RW | RS
//! ```
//!
//! The controller runs in 4-bit mode; every byte is sent as two nibbles,
//! each latched by an EN high→low edge.  The I²C bus is passed per call
//! because the oximeter shares it.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{ActuatorError, InitError};

pub const COLUMNS: usize = 16;
pub const ROWS: usize = 2;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40];

/// Pad or truncate `text` to exactly one display row.  Characters outside
/// printable ASCII render as `?`.
pub fn fit_line(text: &str) -> [u8; COLUMNS] {
    let mut row = [b' '; COLUMNS];
    for (slot, ch) in row.iter_mut().zip(text.chars()) {
        *slot = if ch.is_ascii() && !ch.is_ascii_control() {
            ch as u8
        } else {
            b'?'
        };
    }
    row
}

pub struct Lcd {
    addr: u8,
    backlight: bool,
}

impl Lcd {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            backlight: true,
        }
    }

    /// Power-on initialisation into 4-bit, two-line mode, cleared, cursor
    /// hidden.
    pub fn init<I: I2c>(&mut self, i2c: &mut I, delay: &mut impl DelayNs) -> Result<(), InitError> {
        self.init_sequence(i2c, delay)
            .map_err(|_| InitError::DisplayUnavailable)
    }

    /// Replace both rows.  Each row is rewritten in full, so no separate
    /// clear is needed.
    pub fn show<I: I2c>(&mut self, i2c: &mut I, line1: &str, line2: &str) -> Result<(), ActuatorError> {
        self.write_row(i2c, 0, &fit_line(line1))
            .and_then(|()| self.write_row(i2c, 1, &fit_line(line2)))
            .map_err(|_| ActuatorError::DisplayWriteFailed)
    }

    pub fn set_backlight<I: I2c>(&mut self, i2c: &mut I, on: bool) -> Result<(), ActuatorError> {
        self.backlight = on;
        i2c.write(self.addr, &[self.backlight_bit()])
            .map_err(|_| ActuatorError::DisplayWriteFailed)
    }

    fn init_sequence<I: I2c>(&mut self, i2c: &mut I, delay: &mut impl DelayNs) -> Result<(), I::Error> {
        delay.delay_ms(50);
        // Reset-by-instruction: three 8-bit function sets, then 4-bit.
        self.write_nibble(i2c, 0x30, 0)?;
        delay.delay_us(4_500);
        self.write_nibble(i2c, 0x30, 0)?;
        delay.delay_us(4_500);
        self.write_nibble(i2c, 0x30, 0)?;
        delay.delay_us(150);
        self.write_nibble(i2c, 0x20, 0)?;

        self.command(i2c, CMD_FUNCTION_4BIT_2LINE)?;
        self.command(i2c, CMD_DISPLAY_ON)?;
        self.command(i2c, CMD_CLEAR)?;
        delay.delay_us(2_000);
        self.command(i2c, CMD_ENTRY_MODE_INC)
    }

    fn write_row<I: I2c>(&mut self, i2c: &mut I, row: usize, text: &[u8; COLUMNS]) -> Result<(), I::Error> {
        self.command(i2c, CMD_SET_DDRAM | ROW_OFFSETS[row])?;
        for &ch in text {
            self.send(i2c, ch, RS)?;
        }
        Ok(())
    }

    fn command<I: I2c>(&mut self, i2c: &mut I, cmd: u8) -> Result<(), I::Error> {
        self.send(i2c, cmd, 0)
    }

    fn send<I: I2c>(&mut self, i2c: &mut I, byte: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(i2c, byte & 0xF0, mode)?;
        self.write_nibble(i2c, (byte << 4) & 0xF0, mode)
    }

    /// Present `high_nibble` (already in bits 7..4) and strobe EN.
    fn write_nibble<I: I2c>(&mut self, i2c: &mut I, high_nibble: u8, mode: u8) -> Result<(), I::Error> {
        let v = high_nibble | mode | self.backlight_bit();
        i2c.write(self.addr, &[v | EN, v])
    }

    fn backlight_bit(&self) -> u8 {
        if self.backlight { BACKLIGHT } else { 0 }
    }
}
