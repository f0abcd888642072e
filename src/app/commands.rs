//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (currently the
//! broker's command topic) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Move the servo to an absolute angle, overriding the mode position.
    SetServo(u8),
}

impl AppCommand {
    /// Parse a servo command payload: a decimal integer in `0..=180`,
    /// surrounding whitespace allowed.  Anything else is `None`.
    pub fn parse_servo(payload: &[u8]) -> Option<Self> {
        let text = core::str::from_utf8(payload).ok()?.trim();
        let angle: i32 = text.parse().ok()?;
        let angle = u8::try_from(angle).ok()?;
        (angle <= crate::config::ServoConfig::MAX_ANGLE).then_some(Self::SetServo(angle))
    }
}
