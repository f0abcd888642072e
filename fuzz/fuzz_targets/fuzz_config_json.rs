//! Fuzz target: `SystemConfig::from_json`
//!
//! Arbitrary text must either be rejected or produce a configuration that
//! passes its own validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitalmon::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(cfg) = SystemConfig::from_json(text) {
        assert!(cfg.validate().is_ok());
        assert!(cfg.thresholds.temperature_low_c <= cfg.thresholds.temperature_high_c);
    }
});
