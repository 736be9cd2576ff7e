//! Device configuration parameters
//!
//! All tunable parameters for the KeyRunner device.  Defaults match the
//! reference hardware (16x2 LCD on a PCF8574A backpack, Dell-style BIOS
//! timing).  A JSON override can be embedded at build time, see `main.rs`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Named delays used by the sequencer and the adjustment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// How long a key stays pressed inside one HID report pair.
    pub key_hold_ms: u32,
    /// Spacing after an ordinary keystroke.
    pub tap_ms: u32,
    /// Spacing after a keystroke that changes screens.
    pub hold_ms: u32,
    /// Spacing after a keystroke that confirms a dialog.
    pub confirm_ms: u32,
    /// Pause after the progress header, before a phase's first action.
    pub phase_settle_ms: u32,
    /// Interval between presses while spamming a boot key.
    pub spam_interval_ms: u32,
    /// Sampling period of the adjustment window.
    pub poll_interval_ms: u32,
    /// LED-on time after a touch is registered.
    pub touch_feedback_ms: u32,
    /// Half period of the "waiting for arm" blink.
    pub idle_blink_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            key_hold_ms: 50,
            tap_ms: 300,
            hold_ms: 500,
            confirm_ms: 600,
            phase_settle_ms: 300,
            spam_interval_ms: 100,
            poll_interval_ms: 50,
            touch_feedback_ms: 200,
            idle_blink_ms: 1000,
        }
    }
}

/// Core device configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Display ---
    /// 7-bit I2C address the display is expected at.
    pub display_address: u8,
    /// The other common backpack address, probed to tell "missing" from
    /// "misconfigured".
    pub fallback_display_address: u8,

    // --- Payload ---
    /// Credential typed by the BIOS reset script (ASCII only).
    pub credential: heapless::String<32>,
    /// Log keystrokes instead of sending HID reports.
    pub demo_mode: bool,

    // --- Timing ---
    pub timing: Timing,

    // --- Supervision ---
    /// Task watchdog deadline for the control thread.
    pub watchdog_timeout_ms: u32,
}

/// Shortest accepted watchdog deadline.  The clock feeds once per second
/// of sleep, so anything tighter would trip during normal waits.
pub const MIN_WATCHDOG_TIMEOUT_MS: u32 = 2_000;

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            display_address: 0x3F,
            fallback_display_address: 0x27,
            credential: heapless::String::new(),
            demo_mode: false,
            timing: Timing::default(),
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl DeviceConfig {
    /// Parse and validate a JSON document.  Missing fields are an error;
    /// start from `serde_json::to_string(&DeviceConfig::default())`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// The build-time override when one is given, else the defaults.
    pub fn load(json: Option<&str>) -> crate::error::Result<Self> {
        match json {
            Some(doc) => Ok(Self::from_json(doc)?),
            None => Ok(Self::default()),
        }
    }

    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_addr = |a: u8| (0x01..0x7F).contains(&a);
        if !valid_addr(self.display_address) {
            return Err(ConfigError::ValidationFailed(
                "display_address outside 7-bit range",
            ));
        }
        if !valid_addr(self.fallback_display_address) {
            return Err(ConfigError::ValidationFailed(
                "fallback_display_address outside 7-bit range",
            ));
        }
        if self.display_address == self.fallback_display_address {
            return Err(ConfigError::ValidationFailed(
                "fallback_display_address must differ from display_address",
            ));
        }
        if !self.credential.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return Err(ConfigError::ValidationFailed(
                "credential must be printable ASCII",
            ));
        }

        let t = &self.timing;
        if t.poll_interval_ms == 0 || t.spam_interval_ms == 0 || t.idle_blink_ms == 0 {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if t.key_hold_ms >= t.spam_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "key_hold_ms must be shorter than spam_interval_ms",
            ));
        }
        if t.touch_feedback_ms >= 1000 {
            return Err(ConfigError::ValidationFailed(
                "touch_feedback_ms must stay under one second",
            ));
        }
        if self.watchdog_timeout_ms < MIN_WATCHDOG_TIMEOUT_MS {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms below two feed periods",
            ));
        }
        Ok(())
    }
}

/// Errors from loading or validating [`DeviceConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Document is not valid JSON for this schema.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
