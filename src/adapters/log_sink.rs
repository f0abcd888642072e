//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one structured line per application
//! event to the ESP-IDF logger (UART in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::readings::ReadingValue;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Cycle {
                mode,
                reading,
                classification,
            } => match reading.value {
                ReadingValue::Single(v) => {
                    info!(
                        "CYCLE | mode={:?} | value={:.2} | class={} | t={}ms",
                        mode, v, classification, reading.at_ms
                    );
                }
                ReadingValue::Oximetry { spo2, heart_rate } => {
                    info!(
                        "CYCLE | mode={:?} | spo2={:.2}% hr={:.2}bpm | class={} | t={}ms",
                        mode, spo2, heart_rate, classification, reading.at_ms
                    );
                }
            },
            AppEvent::Alert(true) => {
                warn!("ALERT | raised");
            }
            AppEvent::Alert(false) => {
                info!("ALERT | cleared");
            }
            AppEvent::ServoCommand { angle, applied } => {
                info!(
                    "CMD   | servo={} | {}",
                    angle,
                    if *applied { "applied" } else { "rejected" }
                );
            }
        }
    }
}
