//! GPIO / peripheral pin assignments for the VitalMon bedside board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DS18B20 body-temperature probe, 1-Wire data line (external 4.7 kΩ pull-up).
pub const DS18B20_GPIO: i32 = 4;

/// AD8232 ECG front end, analog output.  ADC1 channel 6 on GPIO 34.
pub const ECG_ADC_GPIO: i32 = 34;
pub const ECG_ADC_CHANNEL: u32 = 6;

/// MPS20N0040D pressure bridge amplifier, analog output.  ADC1 channel 7 on GPIO 35.
pub const PRESSURE_ADC_GPIO: i32 = 35;
pub const PRESSURE_ADC_CHANNEL: u32 = 7;

/// IR proximity sensor, digital output.  LOW = person detected.
pub const IR_PRESENCE_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// I²C bus (LCD backpack + MAX30100)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
/// Standard-mode bus clock; the PCF8574 backpack tops out at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// PCF8574 backpack of the 16x2 HD44780 display.
pub const LCD_I2C_ADDR: u8 = 0x27;
/// MAX30100 pulse oximeter (fixed address).
pub const OXIMETER_I2C_ADDR: u8 = 0x57;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Hobby servo signal (LEDC PWM).
pub const SERVO_GPIO: i32 = 26;
/// 50 Hz servo frame.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width at 0° and 180° (microseconds).
pub const SERVO_MIN_PULSE_US: u32 = 500;
pub const SERVO_MAX_PULSE_US: u32 = 2_500;

/// Indicator LEDs, active HIGH.
pub const GREEN_LED_GPIO: i32 = 23;
pub const RED_LED_GPIO: i32 = 27;

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 25;
