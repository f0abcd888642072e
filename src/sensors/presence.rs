//! IR proximity sensor.  The module pulls its output LOW while something
//! is in front of it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO level via hw_init helpers.
//! On host/test: reads a static flag, default "nobody there".

use core::sync::atomic::AtomicBool;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

static SIM_PRESENT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_present(present: bool) {
    SIM_PRESENT.store(present, Ordering::Relaxed);
}

#[derive(Default)]
pub struct PresenceSensor {
    last: bool,
}

impl PresenceSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self) -> bool {
        let present = self.sample();
        if present != self.last {
            log::debug!("presence {}", if present { "detected" } else { "lost" });
        }
        self.last = present;
        present
    }

    #[cfg(target_os = "espidf")]
    fn sample(&self) -> bool {
        !hw_init::gpio_read(pins::IR_PRESENCE_GPIO)
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&self) -> bool {
        SIM_PRESENT.load(Ordering::Relaxed)
    }
}
