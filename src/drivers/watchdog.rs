//! Task watchdog for the control thread.
//!
//! The control thread is the only task that matters: it owns the keyboard,
//! the display and the interlock.  It subscribes itself to the ESP-IDF
//! TWDT with the timeout from [`DeviceConfig`](crate::config::DeviceConfig).
//! [`Esp32Clock`](crate::adapters::time::Esp32Clock) feeds it after every
//! sleep slice.  Long script waits are therefore safe, and only a hang
//! outside a sleep can reset the device.  Examples are a stuck bus
//! transaction or a HID report the host never collects.
//!
//! On host builds the watchdog only counts feeds, so tests can check that
//! the clock keeps it alive.

#[cfg(not(target_os = "espidf"))]
use core::cell::Cell;

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: Cell<u32>,
}

impl Watchdog {
    /// Subscribe the calling task with a `timeout_ms` reset deadline.
    /// A failed subscription is logged and leaves the device unsupervised.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        use esp_idf_svc::sys::{ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure};

        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls; `cfg` outlives the call and a null task
        // handle means "the calling task".
        let (reconfigured, added) = unsafe {
            (
                esp_task_wdt_reconfigure(&cfg),
                esp_task_wdt_add(core::ptr::null_mut()),
            )
        };
        if reconfigured != ESP_OK {
            warn!("Watchdog: reconfigure returned {}, keeping sdkconfig timeout", reconfigured);
        }
        let subscribed = added == ESP_OK;
        if subscribed {
            info!("Watchdog: control thread supervised ({} ms)", timeout_ms);
        } else {
            warn!("Watchdog: subscribe failed ({}), running unsupervised", added);
        }
        Self {
            timeout_ms,
            subscribed,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        if timeout_ms == 0 {
            warn!("Watchdog(sim): zero timeout");
        }
        info!("Watchdog(sim): {} ms, counting feeds only", timeout_ms);
        Self {
            timeout_ms,
            feeds: Cell::new(0),
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Reset the deadline.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the TWDT entry of the calling task, which
            // subscribed in `new`.
            unsafe {
                esp_idf_svc::sys::esp_task_wdt_reset();
            }
        }

        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get() + 1);
    }

    /// Feeds seen so far (host builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}
