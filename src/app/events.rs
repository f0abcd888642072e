//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log today).

use crate::classifier::Classification;
use crate::fsm::StateId;
use crate::readings::{Mode, Reading};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The cycle FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// One cadence tick completed for `mode`.
    Cycle {
        mode: Mode,
        reading: Reading,
        classification: Classification,
    },

    /// The alert window opened (`true`) or closed (`false`).
    Alert(bool),

    /// An inbound servo command was applied (`applied`) or rejected.
    ServoCommand { angle: u8, applied: bool },
}
