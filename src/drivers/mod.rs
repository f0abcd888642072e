//! Actuator and display drivers, hardware initialisation, and the watchdog.

pub mod hw_init;
pub mod indicators;
pub mod lcd;
pub mod servo;
pub mod watchdog;
