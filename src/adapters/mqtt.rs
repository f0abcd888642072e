//! MQTT-over-TLS session adapter and the inbound message queue.
//!
//! The ESP-IDF client runs its own task and reports events through a
//! callback.  Inbound messages cross into the main loop through a bounded
//! [`InboundQueue`]; the connection flag is shared atomically.
//!
//! ```text
//!   esp-mqtt task ── callback ──▶ InboundQueue ──▶ EspMqttSession::poll_inbound
//!                             └─▶ connected flag
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

use crate::telemetry::InboundMessage;

/// Messages buffered between the MQTT task and the main loop.  Commands
/// arrive at human speed; overflow means the loop has stalled.
pub const INBOUND_CAPACITY: usize = 8;

// ───────────────────────────────────────────────────────────────
// Inbound queue
// ───────────────────────────────────────────────────────────────

pub struct InboundQueue {
    channel: Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_CAPACITY>,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Producer side (MQTT task).  Oversized messages are dropped.  A full
    /// queue evicts its oldest entry, so the latest command always reaches
    /// the loop.  Returns whether the message was queued.
    pub fn push(&self, topic: &str, payload: &[u8]) -> bool {
        let Some(mut msg) = InboundMessage::new(topic, payload) else {
            warn!("MQTT: dropping oversized message on '{}'", topic);
            return false;
        };
        loop {
            match self.channel.try_send(msg) {
                Ok(()) => return true,
                Err(TrySendError::Full(back)) => {
                    if let Ok(stale) = self.channel.try_receive() {
                        warn!("MQTT: inbound queue full, evicting message on '{}'", stale.topic);
                    }
                    msg = back;
                }
            }
        }
    }

    /// Consumer side (main loop).
    pub fn pop(&self) -> Option<InboundMessage> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

/// Queue shared by the ESP-IDF MQTT callback and the main loop.
pub static INBOUND: InboundQueue = InboundQueue::new();

// ───────────────────────────────────────────────────────────────
// ESP-IDF session
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use core::fmt::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use esp_idf_svc::tls::X509;
    use log::{info, warn};

    use super::{INBOUND, InboundQueue};
    use crate::config::BrokerConfig;
    use crate::error::CommsError;
    use crate::telemetry::{InboundMessage, MqttSession};

    /// Broker root of trust (ISRG Root X1), NUL-terminated for mbedTLS.
    const ROOT_CA: &str = concat!(include_str!("../../certs/root_ca.pem"), "\0");

    /// How long one attempt waits for CONNACK.  Kept under the watchdog
    /// timeout since nothing feeds it during the wait.
    const CONNECT_TIMEOUT_MS: u32 = 5_000;
    const CONNECT_POLL_MS: u32 = 100;

    pub struct EspMqttSession {
        client: Option<EspMqttClient<'static>>,
        connected: Arc<AtomicBool>,
        queue: &'static InboundQueue,
    }

    impl Default for EspMqttSession {
        fn default() -> Self {
            Self::new()
        }
    }

    impl EspMqttSession {
        pub fn new() -> Self {
            Self {
                client: None,
                connected: Arc::new(AtomicBool::new(false)),
                queue: &INBOUND,
            }
        }

        fn create_client(&mut self, broker: &BrokerConfig) -> Result<(), CommsError> {
            let mut url: heapless::String<96> = heapless::String::new();
            write!(url, "mqtts://{}:{}", broker.host, broker.port)
                .map_err(|_| CommsError::BrokerConnectFailed)?;

            let conf = MqttClientConfiguration {
                client_id: Some(broker.client_id.as_str()),
                username: Some(broker.username.as_str()),
                password: Some(broker.password.as_str()),
                server_certificate: Some(X509::pem_until_nul(ROOT_CA.as_bytes())),
                ..Default::default()
            };

            let connected = self.connected.clone();
            let queue = self.queue;
            let client = EspMqttClient::new_cb(url.as_str(), &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                    EventPayload::Disconnected => connected.store(false, Ordering::Release),
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        ..
                    } => {
                        queue.push(topic, data);
                    }
                    EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed: {}", e);
                CommsError::BrokerConnectFailed
            })?;

            info!("MQTT: client created for {}", url);
            self.client = Some(client);
            Ok(())
        }
    }

    impl MqttSession for EspMqttSession {
        fn try_connect(&mut self, broker: &BrokerConfig) -> Result<(), CommsError> {
            if self.is_connected() {
                return Ok(());
            }
            if self.client.is_none() {
                self.create_client(broker)?;
            }

            let mut waited = 0;
            while waited < CONNECT_TIMEOUT_MS {
                if self.is_connected() {
                    return Ok(());
                }
                FreeRtos::delay_ms(CONNECT_POLL_MS);
                waited += CONNECT_POLL_MS;
            }
            // Tear down so the next attempt starts a fresh handshake.
            self.client = None;
            Err(CommsError::BrokerConnectFailed)
        }

        fn is_connected(&self) -> bool {
            self.client.is_some() && self.connected.load(Ordering::Acquire)
        }

        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
            let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
            client
                .publish(topic, QoS::AtMostOnce, false, payload)
                .map(|_| ())
                .map_err(|_| CommsError::PublishFailed)
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
            let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
            client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| CommsError::SubscribeFailed)
        }

        fn poll_inbound(&mut self) -> Option<InboundMessage> {
            self.queue.pop()
        }
    }
}

#[cfg(target_os = "espidf")]
pub use esp::EspMqttSession;
