//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API to reset the device if the main loop
//! stalls for longer than [`TIMEOUT_MS`].
//!
//! The main loop calls `feed()` on every pass.  The two deliberate
//! blocking points (broker reconnect backoff, temperature conversion)
//! wait through a [`FeedingDelay`] so a long outage never trips the reset.

use embedded_hal::delay::DelayNs;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Reset if the main task is not fed for this long.
pub const TIMEOUT_MS: u32 = 10_000;

/// Longest single wait inside a [`FeedingDelay`].
const FEED_SLICE_MS: u32 = 1_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::cell::Cell<u32>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms: TIMEOUT_MS,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!(
                        "TWDT reconfigure returned {} (may already be configured)",
                        ret
                    );
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", TIMEOUT_MS);
                } else {
                    log::warn!("Watchdog: failed to subscribe ({})", ret);
                }

                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op");
            Self {
                feeds: core::cell::Cell::new(0),
            }
        }
    }

    /// Feed the watchdog.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get().wrapping_add(1));
    }

    /// Number of feeds so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_feed_count(&self) -> u32 {
        self.feeds.get()
    }
}

/// Delay wrapper that feeds the watchdog at least once per second of
/// waiting.
pub struct FeedingDelay<'a, D> {
    inner: D,
    watchdog: &'a Watchdog,
}

impl<'a, D: DelayNs> FeedingDelay<'a, D> {
    pub fn new(inner: D, watchdog: &'a Watchdog) -> Self {
        Self { inner, watchdog }
    }
}

impl<D: DelayNs> DelayNs for FeedingDelay<'_, D> {
    fn delay_ns(&mut self, ns: u32) {
        // Sub-second waits (1-Wire slots) go straight through.
        self.inner.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
    }

    fn delay_ms(&mut self, mut ms: u32) {
        while ms > 0 {
            let slice = ms.min(FEED_SLICE_MS);
            self.watchdog.feed();
            self.inner.delay_ms(slice);
            ms -= slice;
        }
        self.watchdog.feed();
    }
}
