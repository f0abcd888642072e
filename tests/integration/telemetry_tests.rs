//! Broker session lifecycle and the inbound command path, end to end
//! through [`TelemetryChannel`] and the [`InboundQueue`].

use embedded_hal::delay::DelayNs;

use vitalmon::adapters::mqtt::{InboundQueue, INBOUND_CAPACITY};
use vitalmon::app::commands::AppCommand;
use vitalmon::app::ports::TelemetryPort;
use vitalmon::config::BrokerConfig;
use vitalmon::error::CommsError;
use vitalmon::telemetry::{InboundMessage, MqttSession, TelemetryChannel, Topic};

/// Session whose inbound side reads from a borrowed queue, the way the
/// device session drains the callback queue.
struct QueueSession<'q> {
    queue: &'q InboundQueue,
    refuse: u32,
    connected: bool,
    published: Vec<(String, String)>,
    subscribed: Vec<String>,
}

impl<'q> QueueSession<'q> {
    fn new(queue: &'q InboundQueue, refuse: u32) -> Self {
        Self {
            queue,
            refuse,
            connected: false,
            published: Vec::new(),
            subscribed: Vec::new(),
        }
    }
}

impl MqttSession for QueueSession<'_> {
    fn try_connect(&mut self, _broker: &BrokerConfig) -> Result<(), CommsError> {
        if self.refuse > 0 {
            self.refuse -= 1;
            return Err(CommsError::BrokerConnectFailed);
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ));
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.subscribed.push(topic.to_string());
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.queue.pop()
    }
}

#[derive(Default)]
struct RecordingDelay {
    waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

fn channel(queue: &InboundQueue, refuse: u32) -> TelemetryChannel<QueueSession<'_>> {
    TelemetryChannel::new(QueueSession::new(queue, refuse), BrokerConfig::default(), 5_000)
}

#[test]
fn connects_after_refusals_with_fixed_backoff() {
    let queue = InboundQueue::new();
    let mut ch = channel(&queue, 3);
    let mut delay = RecordingDelay::default();

    ch.connect(&mut delay);

    assert_eq!(ch.attempts(), 4);
    assert_eq!(delay.waits_ms, vec![5_000, 5_000, 5_000]);
    assert_eq!(
        ch.session().published,
        vec![("ESP32/status".to_string(), "connected".to_string())]
    );
    assert_eq!(ch.session().subscribed, vec!["servo/control".to_string()]);
}

#[test]
fn readings_publish_under_device_prefix() {
    let queue = InboundQueue::new();
    let mut ch = channel(&queue, 0);
    ch.connect(&mut RecordingDelay::default());

    ch.publish(Topic::Temperature, "36.60");
    ch.publish(Topic::IrSensor, "true");

    let tail: Vec<_> = ch.session().published[1..].to_vec();
    assert_eq!(
        tail,
        vec![
            ("ESP32/temperature".to_string(), "36.60".to_string()),
            ("ESP32/irSensor".to_string(), "true".to_string()),
        ]
    );
}

#[test]
fn lost_session_is_reestablished_and_resubscribed() {
    let queue = InboundQueue::new();
    let mut ch = channel(&queue, 0);
    let mut delay = RecordingDelay::default();
    ch.connect(&mut delay);

    ch.session_mut().connected = false;
    ch.session_mut().refuse = 1;
    ch.publish(Topic::Ecg, "300.00");
    ch.ensure_connected(&mut delay);

    assert!(ch.is_connected());
    assert_eq!(ch.attempts(), 3);
    assert_eq!(delay.waits_ms, vec![5_000]);
    assert_eq!(ch.session().subscribed.len(), 2);
    // The offline publish was dropped, not buffered.
    assert!(!ch
        .session()
        .published
        .iter()
        .any(|(t, _)| t == "ESP32/ecg"));
}

#[test]
fn queued_commands_are_filtered_then_delivered_in_order() {
    let queue = InboundQueue::new();
    assert!(queue.push("servo/control", b"abc"));
    assert!(queue.push("other/topic", b"45"));
    assert!(queue.push("servo/control", b"90"));
    assert!(queue.push("servo/control", b"181"));
    assert!(queue.push("servo/control", b"0"));

    let mut ch = channel(&queue, 0);
    ch.connect(&mut RecordingDelay::default());

    assert_eq!(ch.poll_command(), Some(AppCommand::SetServo(90)));
    assert_eq!(ch.poll_command(), Some(AppCommand::SetServo(0)));
    assert_eq!(ch.poll_command(), None);
    assert!(queue.is_empty());
}

#[test]
fn burst_beyond_capacity_ends_on_the_last_command() {
    let queue = InboundQueue::new();
    let sent: Vec<u8> = (0..=INBOUND_CAPACITY as u8).map(|i| i * 10).collect();
    for angle in &sent {
        assert!(queue.push("servo/control", angle.to_string().as_bytes()));
    }

    let mut ch = channel(&queue, 0);
    ch.connect(&mut RecordingDelay::default());

    let mut seen = Vec::new();
    while let Some(AppCommand::SetServo(angle)) = ch.poll_command() {
        seen.push(angle);
    }
    // The oldest command was evicted; the rest arrive in order.
    assert_eq!(seen, sent[1..].to_vec());
    assert_eq!(seen.last(), Some(&80));
}

#[test]
fn applied_burst_leaves_servo_at_last_command() {
    use crate::mock_hw::Rig;

    let queue = InboundQueue::new();
    for angle in (0..=80u8).step_by(10) {
        queue.push("servo/control", angle.to_string().as_bytes());
    }

    let mut ch = channel(&queue, 0);
    ch.connect(&mut RecordingDelay::default());
    let mut rig = Rig::new();
    while let Some(cmd) = ch.poll_command() {
        rig.app.handle_command(cmd, &mut rig.hw, &mut rig.sink);
    }
    assert_eq!(rig.hw.servo(), Some(80));
}
