//! Inbound servo commands against a running cycle.

use crate::mock_hw::Rig;

use vitalmon::app::commands::AppCommand;
use vitalmon::app::events::AppEvent;

fn deliver(rig: &mut Rig, payload: &[u8]) -> bool {
    match AppCommand::parse_servo(payload) {
        Some(cmd) => {
            rig.app.handle_command(cmd, &mut rig.hw, &mut rig.sink);
            true
        }
        None => false,
    }
}

#[test]
fn valid_command_moves_servo_immediately() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(5_000, 1_000);
    assert_eq!(rig.hw.servo(), Some(45));

    assert!(deliver(&mut rig, b"90"));
    assert_eq!(rig.hw.servo(), Some(90));
    assert_eq!(rig.app.actuator_state().servo_angle, 90);
    assert!(rig.sink.events.contains(&AppEvent::ServoCommand {
        angle: 90,
        applied: true,
    }));
}

#[test]
fn invalid_payloads_change_nothing() {
    let mut rig = Rig::new();
    let before = rig.hw.calls.len();

    for payload in [&b"200"[..], b"abc", b"", b"-1", b"90.5"] {
        assert!(!deliver(&mut rig, payload), "{:?} accepted", payload);
    }

    assert_eq!(rig.hw.calls.len(), before);
    assert_eq!(rig.app.actuator_state().servo_angle, 0);
    assert!(!rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::ServoCommand { .. })));
}

#[test]
fn next_cadence_tick_supersedes_override() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(7_000, 1_000);

    assert!(deliver(&mut rig, b"10"));
    assert_eq!(rig.hw.servo(), Some(10));

    rig.run_until(10_000, 1_000);
    assert_eq!(rig.hw.servo(), Some(90));
}

#[test]
fn command_while_idle_is_rehomed_by_next_poll() {
    let mut rig = Rig::new();
    rig.run_until(3_000, 1_000);

    assert!(deliver(&mut rig, b"120"));
    assert_eq!(rig.hw.servo(), Some(120));

    rig.run_until(63_000, 1_000);
    assert_eq!(rig.hw.servo(), Some(0));
    assert_eq!(rig.app.actuator_state().servo_angle, 0);
    assert_eq!(rig.hw.indicators(), Some((false, false)));
}
