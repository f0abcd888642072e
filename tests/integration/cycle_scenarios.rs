//! End-to-end cycle scenarios: presence → FSM → read → classify → render
//! → actuate → publish, driven on a simulated clock.

use crate::mock_hw::Rig;

use vitalmon::app::events::AppEvent;
use vitalmon::app::service::{IDLE_LINE_1, IDLE_LINE_2};
use vitalmon::config::SystemConfig;
use vitalmon::fsm::StateId;
use vitalmon::readings::Mode;
use vitalmon::telemetry::Topic;

fn cycle_modes(rig: &Rig) -> Vec<Mode> {
    rig.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Cycle { mode, .. } => Some(*mode),
            _ => None,
        })
        .collect()
}

// ── Idle ──────────────────────────────────────────────────────

#[test]
fn no_presence_shows_idle_and_publishes_nothing() {
    let mut rig = Rig::new();
    rig.run_until(20_000, 1_000);

    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.hw.screen(), Some((IDLE_LINE_1, IDLE_LINE_2)));
    assert_eq!(rig.hw.servo(), Some(0));
    assert!(rig.wire.published.is_empty());
    assert_eq!(rig.app.cycle_count(), 0);
}

// ── Active cadence ────────────────────────────────────────────

#[test]
fn three_cadence_ticks_publish_three_readings_in_mode_order() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(15_000, 1_000);

    assert_eq!(
        rig.wire.readings(),
        vec![
            (Topic::Temperature, "36.60".to_string()),
            (Topic::Ecg, "300.00".to_string()),
            (Topic::Pressure, "420.00".to_string()),
        ]
    );
    // Neutral at boot, then one move per tick.
    assert_eq!(rig.hw.servo_moves(), vec![0, 45, 90, 135]);
    assert_eq!(rig.wire.on(Topic::IrSensor), vec!["true"]);
}

#[test]
fn first_reading_comes_one_cadence_after_presence() {
    let mut rig = Rig::new();
    rig.run_until(2_000, 1_000);

    rig.hw.presence = true;
    rig.run_until(7_000, 1_000);
    assert_eq!(rig.app.state(), StateId::Active);
    assert!(rig.wire.readings().is_empty());

    rig.pass(); // t = 8000, five seconds after detection
    assert_eq!(rig.wire.readings().len(), 1);
    assert_eq!(cycle_modes(&rig), vec![Mode::Temperature]);
}

#[test]
fn modes_rotate_and_wrap_without_skipping() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(30_000, 1_000);

    assert_eq!(
        cycle_modes(&rig),
        vec![
            Mode::Temperature,
            Mode::Ecg,
            Mode::Pressure,
            Mode::Oximetry,
            Mode::Temperature,
            Mode::Ecg,
        ]
    );
}

#[test]
fn oximetry_publishes_heart_rate_then_spo2() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(20_000, 1_000);

    let readings = rig.wire.readings();
    assert_eq!(
        &readings[3..],
        &[
            (Topic::HeartRate, "72.00".to_string()),
            (Topic::Spo2, "98.00".to_string()),
        ]
    );
    assert_eq!(rig.hw.screen(), Some(("SpO2: 98.00 %", "HR: 72.00")));
    assert_eq!(rig.hw.servo(), Some(180));
}

#[test]
fn fast_polling_does_not_speed_up_the_cycle() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(15_000, 50);
    assert_eq!(rig.app.cycle_count(), 3);
}

// ── Classification effects ────────────────────────────────────

#[test]
fn abnormal_reading_lights_red_and_normal_lights_green() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.hw.ecg = 512.0;

    rig.run_until(5_000, 1_000);
    assert_eq!(rig.hw.indicators(), Some((true, false)));
    assert_eq!(rig.hw.screen(), Some(("Temp: 36.60 C", "Class: Normal")));

    rig.run_until(10_000, 1_000);
    assert_eq!(rig.hw.indicators(), Some((false, true)));
    assert_eq!(rig.hw.screen(), Some(("ECG: 512.00", "Class: High")));
}

#[test]
fn out_of_range_spo2_is_published_as_zero() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.hw.spo2 = 104.0;
    rig.hw.heart_rate = -3.0;
    rig.run_until(20_000, 1_000);

    assert_eq!(rig.wire.on(Topic::Spo2), vec!["0.00"]);
    assert_eq!(rig.wire.on(Topic::HeartRate), vec!["0.00"]);
    assert_eq!(rig.hw.indicators(), Some((false, true)));
}

// ── Presence loss ─────────────────────────────────────────────

#[test]
fn presence_loss_returns_to_idle_and_neutral() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(10_000, 1_000);
    assert_eq!(rig.hw.servo(), Some(90));

    rig.hw.presence = false;
    rig.pass();

    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.hw.servo(), Some(0));
    assert_eq!(rig.hw.indicators(), Some((false, false)));
    assert!(!rig.hw.buzzer());
    assert_eq!(rig.hw.screen(), Some((IDLE_LINE_1, IDLE_LINE_2)));
    assert!(rig.sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Active,
        to: StateId::Idle,
    }));
}

#[test]
fn absence_publishes_nothing() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(2_000, 1_000);
    let before = rig.wire.published.len();

    rig.hw.presence = false;
    rig.run_until(5_000, 1_000);

    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.wire.published.len(), before);
    assert_eq!(rig.wire.on(Topic::IrSensor), vec!["true"]);
}

#[test]
fn cycle_restarts_at_temperature_after_presence_returns() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.run_until(10_000, 1_000);

    rig.hw.presence = false;
    rig.run_until(12_000, 1_000);
    rig.hw.presence = true;
    rig.run_until(18_000, 1_000);

    assert_eq!(
        cycle_modes(&rig),
        vec![Mode::Temperature, Mode::Ecg, Mode::Temperature]
    );
}

// ── Telemetry outage ──────────────────────────────────────────

#[test]
fn cycle_continues_while_telemetry_is_down() {
    let mut rig = Rig::new();
    rig.wire.connected = false;
    rig.hw.presence = true;
    rig.run_until(15_000, 1_000);

    assert_eq!(rig.app.cycle_count(), 3);
    assert!(rig.wire.published.is_empty());
    assert_eq!(rig.hw.servo(), Some(135));
}

// ── Alert window ──────────────────────────────────────────────

#[test]
fn abnormal_reading_opens_alert_window_when_enabled() {
    let mut config = SystemConfig::default();
    config.alert.alert_on_abnormal = true;
    let mut rig = Rig::with_config(config);
    rig.hw.presence = true;
    rig.hw.spo2 = 90.0;

    rig.run_until(20_000, 100);
    assert!(rig.sink.events.contains(&AppEvent::Alert(true)));
    assert!(rig.hw.buzzer());
    assert_eq!(rig.hw.servo(), Some(180));
    rig.hw.spo2 = 98.0;

    // Buzzer releases after its phase; the servo stays open.
    rig.run_until(20_600, 100);
    assert!(!rig.hw.buzzer());
    assert!(rig.app.actuator_state().alert_active);

    // Mode moves are held off during the window.
    rig.run_until(25_000, 100);
    assert_eq!(rig.hw.servo(), Some(180));

    rig.run_until(139_900, 100);
    assert!(rig.app.actuator_state().alert_active);

    rig.run_until(140_100, 100);
    assert!(rig.sink.events.contains(&AppEvent::Alert(false)));
    assert!(!rig.app.actuator_state().alert_active);
}

#[test]
fn alert_disabled_by_default() {
    let mut rig = Rig::new();
    rig.hw.presence = true;
    rig.hw.spo2 = 90.0;
    rig.run_until(20_000, 1_000);
    assert!(!rig.sink.events.iter().any(|e| matches!(e, AppEvent::Alert(_))));
    assert!(!rig.hw.buzzer());
}
