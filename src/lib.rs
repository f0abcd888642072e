//! VitalMon firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuation;
pub mod app;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod readings;
pub mod scheduler;
pub mod telemetry;

// Hardware-facing modules compile on every target; the real peripheral
// access inside them is cfg-gated.
pub mod adapters;
pub mod drivers;
pub mod sensors;
