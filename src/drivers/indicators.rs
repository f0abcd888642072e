//! Green/red status LEDs and the alert buzzer.
//!
//! All three are plain push-pull outputs, active HIGH.  The driver caches
//! the last written level so the host build can be inspected.

use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorLevels {
    pub green: bool,
    pub red: bool,
    pub buzzer: bool,
}

#[derive(Default)]
pub struct Indicators {
    levels: IndicatorLevels,
}

impl Indicators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_leds(&mut self, green: bool, red: bool) {
        hw_init::gpio_write(pins::GREEN_LED_GPIO, green);
        hw_init::gpio_write(pins::RED_LED_GPIO, red);
        self.levels.green = green;
        self.levels.red = red;
    }

    pub fn set_buzzer(&mut self, on: bool) {
        hw_init::gpio_write(pins::BUZZER_GPIO, on);
        self.levels.buzzer = on;
    }

    /// Everything dark and silent.
    pub fn all_off(&mut self) {
        self.set_leds(false, false);
        self.set_buzzer(false);
    }

    pub fn levels(&self) -> IndicatorLevels {
        self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_track_writes() {
        let mut ind = Indicators::new();
        ind.set_leds(true, false);
        ind.set_buzzer(true);
        assert_eq!(
            ind.levels(),
            IndicatorLevels {
                green: true,
                red: false,
                buzzer: true
            }
        );
        ind.all_off();
        assert_eq!(ind.levels(), IndicatorLevels::default());
    }
}
