//! VitalMon firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           LogEventSink     Esp32TimeAdapter   │
//! │  (Sensor+Actuator+Display) (EventSink)      (ClockPort)        │
//! │  WifiAdapter               TelemetryChannel<EspMqttSession>    │
//! │  (station bring-up)        (TelemetryPort + inbound commands)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · IntervalGate · ActuationController              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use log::{error, info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use vitalmon::adapters::hardware::HardwareAdapter;
use vitalmon::adapters::log_sink::LogEventSink;
use vitalmon::adapters::mqtt::EspMqttSession;
use vitalmon::adapters::time::Esp32TimeAdapter;
use vitalmon::adapters::wifi::WifiAdapter;
use vitalmon::app::ports::{ClockPort, DisplayPort};
use vitalmon::app::service::AppService;
use vitalmon::config::SystemConfig;
use vitalmon::drivers::hw_init::{self, OpenDrainPin};
use vitalmon::drivers::lcd::Lcd;
use vitalmon::drivers::watchdog::{FeedingDelay, Watchdog};
use vitalmon::error::{Error, Severity};
use vitalmon::pins;
use vitalmon::sensors::SensorHub;
use vitalmon::telemetry::TelemetryChannel;

/// Device configuration embedded at build time.
const DEVICE_CONFIG: &str = include_str!("../config/device.json");

/// Idle time per main-loop pass; bounds command latency and FIFO drain rate.
const LOOP_PERIOD_MS: u32 = 10;

/// Fixed delay between WiFi association attempts.
const WIFI_RETRY_MS: u32 = 500;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VitalMon v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::from_json(DEVICE_CONFIG).map_err(|e| anyhow!("device config: {}", e))?;

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}, halting", e);
        halt();
    }
    let watchdog = Watchdog::new();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;

    let sensor_hub = SensorHub::new(
        OpenDrainPin(pins::DS18B20_GPIO),
        pins::OXIMETER_I2C_ADDR,
        config.timing.temperature_settle_ms,
    );
    let mut hw = HardwareAdapter::new(
        i2c,
        FeedingDelay::new(Delay::new_default(), &watchdog),
        sensor_hub,
        Lcd::new(pins::LCD_I2C_ADDR),
    );

    // ── 3. Bus devices (oximeter is mandatory) ────────────────
    if let Err(e) = hw.init() {
        let err = Error::from(e);
        if err.severity() == Severity::Fatal {
            error!("{}, halting", err);
            hw.show("Oximeter error", "Halted");
            halt_fed(&watchdog);
        }
        warn!("Init degraded: {}", err);
    }

    // ── 4. Network ────────────────────────────────────────────
    let mut net_delay = FeedingDelay::new(Delay::new_default(), &watchdog);

    let esp_wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(esp_wifi, config.wifi.clone());
    wifi.connect_blocking(&mut net_delay, WIFI_RETRY_MS)
        .map_err(|e| anyhow!("WiFi: {}", e))?;

    let mut telemetry = TelemetryChannel::new(
        EspMqttSession::new(),
        config.broker.clone(),
        config.timing.reconnect_delay_ms,
    );
    telemetry.connect(&mut net_delay);

    // ── 5. Application ────────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config);
    app.start(clock.now_ms(), &mut hw, &mut telemetry, &mut sink);

    info!("System ready. Entering main loop.");

    // ── 6. Main loop ──────────────────────────────────────────
    loop {
        if !wifi.is_connected() {
            warn!("WiFi: link lost, reassociating");
            if let Err(e) = wifi.connect_blocking(&mut net_delay, WIFI_RETRY_MS) {
                warn!("WiFi: {}", e);
            }
        }
        telemetry.ensure_connected(&mut net_delay);

        while let Some(cmd) = telemetry.poll_command() {
            app.handle_command(cmd, &mut hw, &mut sink);
        }

        app.poll(clock.now_ms(), &mut hw, &mut telemetry, &mut sink);

        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}

/// Stop before the watchdog exists; its absence means no reset either.
fn halt() -> ! {
    loop {
        FreeRtos::delay_ms(1_000);
    }
}

/// Stop for good while keeping the watchdog quiet, so the fault stays on
/// screen instead of boot-looping.
fn halt_fed(watchdog: &Watchdog) -> ! {
    loop {
        watchdog.feed();
        FreeRtos::delay_ms(1_000);
    }
}
