//! Fuzz target: inbound servo command path
//!
//! Wraps arbitrary bytes as a broker message and parses the payload the
//! way the main loop does.  Must never panic, and any accepted command
//! must be within the servo's mechanical range.
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitalmon::app::commands::AppCommand;
use vitalmon::telemetry::InboundMessage;

fuzz_target!(|data: &[u8]| {
    if let Some(AppCommand::SetServo(angle)) = AppCommand::parse_servo(data) {
        assert!(angle <= 180, "accepted out-of-range angle {angle}");
    }

    // Oversized payloads are rejected at the queue boundary.
    if let Some(msg) = InboundMessage::new("servo/control", data) {
        assert_eq!(msg.payload.as_slice(), data);
        assert_eq!(AppCommand::parse_servo(&msg.payload), AppCommand::parse_servo(data));
    }
});
