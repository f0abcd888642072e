//! Telemetry channel: MQTT session management, topic naming and the
//! inbound servo command path.
//!
//! ```text
//!   AppService ──▶ TelemetryPort ──▶ TelemetryChannel ──▶ MqttSession ──▶ broker
//!   main loop  ◀── AppCommand   ◀── poll_command()   ◀── inbound queue ◀──┘
//! ```
//!
//! The channel is generic over [`MqttSession`] so the connect/retry policy
//! and command parsing run on the host against a mock session.
//!
//! ## Reconnection policy
//!
//! Fixed delay between attempts (5 s by default), no growth, no attempt
//! cap.  The loop blocks until the broker accepts the session.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use log::{debug, info, warn};

use crate::app::commands::AppCommand;
use crate::app::ports::TelemetryPort;
use crate::config::BrokerConfig;
use crate::error::CommsError;
use crate::readings::Mode;

/// Payload published on [`Topic::Status`] once the session is up.
pub const STATUS_CONNECTED: &str = "connected";

// ───────────────────────────────────────────────────────────────
// Topics
// ───────────────────────────────────────────────────────────────

/// Outbound topics, each published as `<device_prefix>/<suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Temperature,
    Ecg,
    Pressure,
    HeartRate,
    Spo2,
    IrSensor,
    Status,
}

impl Topic {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Ecg => "ecg",
            Self::Pressure => "pressure",
            Self::HeartRate => "heartRate",
            Self::Spo2 => "spO2",
            Self::IrSensor => "irSensor",
            Self::Status => "status",
        }
    }

    /// Topics a cadence tick publishes for `mode`, in publish order.
    pub fn for_mode(mode: Mode) -> &'static [Topic] {
        match mode {
            Mode::Temperature => &[Self::Temperature],
            Mode::Ecg => &[Self::Ecg],
            Mode::Pressure => &[Self::Pressure],
            Mode::Oximetry => &[Self::HeartRate, Self::Spo2],
        }
    }
}

pub type TopicName = String<64>;

/// Full topic name: `<prefix>/<suffix>`.
pub fn topic_name(prefix: &str, topic: Topic) -> TopicName {
    let mut name = TopicName::new();
    // Prefix is capped at 16 bytes, suffixes at 11; this always fits.
    let _ = write!(name, "{}/{}", prefix, topic.suffix());
    name
}

// ───────────────────────────────────────────────────────────────
// Session port
// ───────────────────────────────────────────────────────────────

/// Largest inbound payload kept; command payloads are a few digits.
pub const MAX_INBOUND_PAYLOAD: usize = 32;

/// A message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<64>,
    pub payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
}

impl InboundMessage {
    /// Copy topic and payload; `None` if either exceeds its capacity.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let p = Vec::from_slice(payload).ok()?;
        Some(Self { topic: t, payload: p })
    }
}

/// Transport-level MQTT session (TLS, broker auth, QoS handled below).
pub trait MqttSession {
    /// One connection attempt.
    fn try_connect(&mut self, broker: &BrokerConfig) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Next buffered inbound message, if any.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Channel
// ───────────────────────────────────────────────────────────────

pub struct TelemetryChannel<S: MqttSession> {
    session: S,
    broker: BrokerConfig,
    reconnect_delay_ms: u32,
    attempts: u32,
}

impl<S: MqttSession> TelemetryChannel<S> {
    pub fn new(session: S, broker: BrokerConfig, reconnect_delay_ms: u32) -> Self {
        Self {
            session,
            broker,
            reconnect_delay_ms,
            attempts: 0,
        }
    }

    /// Block until the broker accepts a session, then announce status and
    /// subscribe the command topic.
    pub fn connect(&mut self, delay: &mut impl DelayNs) {
        loop {
            self.attempts = self.attempts.wrapping_add(1);
            info!(
                "MQTT: connecting to {}:{} as '{}' (attempt {})",
                self.broker.host, self.broker.port, self.broker.client_id, self.attempts
            );
            match self.session.try_connect(&self.broker) {
                Ok(()) => break,
                Err(e) => {
                    warn!("MQTT: {}, retrying in {} ms", e, self.reconnect_delay_ms);
                    delay.delay_ms(self.reconnect_delay_ms);
                }
            }
        }

        info!("MQTT: connected");
        self.publish(Topic::Status, STATUS_CONNECTED);
        if let Err(e) = self.session.subscribe(self.broker.command_topic.as_str()) {
            warn!("MQTT: subscribe '{}' failed: {}", self.broker.command_topic, e);
        }
    }

    /// Reconnect if the session dropped.  Call on every loop pass.
    pub fn ensure_connected(&mut self, delay: &mut impl DelayNs) {
        if !self.session.is_connected() {
            warn!("MQTT: session lost, reconnecting");
            self.connect(delay);
        }
    }

    /// Drain inbound messages until one yields a valid command.  Messages on
    /// other topics and unparsable payloads are dropped.
    pub fn poll_command(&mut self) -> Option<AppCommand> {
        while let Some(msg) = self.session.poll_inbound() {
            if msg.topic.as_str() != self.broker.command_topic.as_str() {
                debug!("MQTT: ignoring message on '{}'", msg.topic);
                continue;
            }
            match AppCommand::parse_servo(&msg.payload) {
                Some(cmd) => return Some(cmd),
                None => debug!("MQTT: ignoring invalid servo payload {:?}", msg.payload),
            }
        }
        None
    }

    /// Total connection attempts since construction.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: MqttSession> TelemetryPort for TelemetryChannel<S> {
    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    fn publish(&mut self, topic: Topic, payload: &str) {
        let name = topic_name(self.broker.device_prefix.as_str(), topic);
        if !self.session.is_connected() {
            debug!("MQTT: offline, dropped {} = {}", name, payload);
            return;
        }
        match self.session.publish(name.as_str(), payload.as_bytes()) {
            Ok(()) => debug!("MQTT: {} = {}", name, payload),
            Err(e) => warn!("MQTT: publish {} failed: {}", name, e),
        }
    }
}
