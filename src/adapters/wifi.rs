//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! The monitor has nothing useful to do offline at boot, so
//! [`WifiAdapter::connect_blocking`] retries on a fixed delay until the
//! station is up, logging each failed attempt.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::config::WifiConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// SSID must be 1–32 printable ASCII bytes; password empty (open network)
/// or 8–64 bytes for WPA2.
pub fn validate_credentials(cfg: &WifiConfig) -> Result<(), CommsError> {
    let ssid = cfg.ssid.as_str();
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::WifiConnectFailed);
    }
    let password = cfg.password.as_str();
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CommsError::WifiConnectFailed);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    config: WifiConfig,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: number of upcoming attempts that fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>, config: WifiConfig) -> Self {
        Self {
            state: WifiState::Disconnected,
            config,
            attempts: 0,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: WifiConfig) -> Self {
        Self {
            state: WifiState::Disconnected,
            config,
            attempts: 0,
            sim_failures: 0,
        }
    }

    /// Make the next `n` simulated attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u32) {
        self.sim_failures = n;
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    /// Single association attempt.
    pub fn connect(&mut self) -> Result<(), CommsError> {
        validate_credentials(&self.config)?;
        self.attempts = self.attempts.saturating_add(1);
        self.state = WifiState::Connecting;
        info!("WiFi: connecting to '{}'", self.config.ssid);

        match self.platform_connect() {
            Ok(()) => {
                self.state = WifiState::Connected;
                info!("WiFi: connected after {} attempt(s)", self.attempts);
                Ok(())
            }
            Err(e) => {
                self.state = WifiState::Disconnected;
                Err(e)
            }
        }
    }

    /// Retry [`connect`](Self::connect) every `retry_ms` until it succeeds.
    /// Invalid credentials are returned immediately since retrying cannot
    /// fix them.
    pub fn connect_blocking(&mut self, delay: &mut impl DelayNs, retry_ms: u32) -> Result<(), CommsError> {
        validate_credentials(&self.config).inspect_err(|_| {
            warn!("WiFi: credentials invalid, not connecting");
        })?;
        while self.connect().is_err() {
            warn!("WiFi: attempt {} failed, retrying in {} ms", self.attempts, retry_ms);
            delay.delay_ms(retry_ms);
        }
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        let ssid = self.config.ssid.as_str().try_into().map_err(|_| CommsError::WifiConnectFailed)?;
        let password = self
            .config
            .password
            .as_str()
            .try_into()
            .map_err(|_| CommsError::WifiConnectFailed)?;
        let auth_method = if self.config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {}", e);
            CommsError::WifiConnectFailed
        };
        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid,
                password,
                auth_method,
                ..Default::default()
            }))
            .map_err(fail)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            warn!("WiFi(sim): simulated association failure");
            return Err(CommsError::WifiConnectFailed);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        true
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
