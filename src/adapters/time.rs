//! ESP32 clock adapter.
//!
//! Implements the [`Clock`] port for the KeyRunner firmware.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for monotonic
//!   time, FreeRTOS delay for sleeping.  Every sleep is split into slices
//!   that each feed the task watchdog, so a 30 s countdown never trips it.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `std::thread::sleep` for host-side runs.

use crate::app::ports::Clock;
use crate::drivers::watchdog::Watchdog;

/// Longest single blocking sleep between watchdog feeds.
const FEED_SLICE_MS: u32 = 1000;

pub struct Esp32Clock {
    watchdog: Watchdog,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Esp32Clock {
    pub fn new(watchdog: Watchdog) -> Self {
        Self {
            watchdog,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    #[cfg(target_os = "espidf")]
    fn block(ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn block(ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

impl Clock for Esp32Clock {
    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    /// Milliseconds since construction (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u32) {
        let mut left = ms;
        while left > 0 {
            let slice = left.min(FEED_SLICE_MS);
            Self::block(slice);
            self.watchdog.feed();
            left -= slice;
        }
    }
}
