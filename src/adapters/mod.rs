//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `hardware` | SensorPort         | DS18B20, ADC1, IR, MAX30100   |
//! |            | ActuatorPort       | LEDC servo, LEDs, buzzer      |
//! |            | DisplayPort        | HD44780 over PCF8574          |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `mqtt`     | MqttSession        | ESP-IDF MQTT client over TLS  |
//! | `time`     | ClockPort          | ESP32 system timer            |
//! | `wifi`     | (station bring-up) | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
