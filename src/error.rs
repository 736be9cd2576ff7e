//! Outcome codes and unified error types for the KeyRunner firmware.
//!
//! [`OutcomeCode`] is the field-facing diagnostic surface: every code maps
//! to two 16-character display lines and a blink count.  Operators read the
//! blink pattern when no display is attached, so the numeric values and the
//! table below are a stable contract across firmware versions.
//!
//! [`Error`] is the library-side error type: every fallible operation that
//! is *not* a hardware outcome funnels into it.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Outcome codes
// ---------------------------------------------------------------------------

/// Result of a self-check, and the reason recorded on a terminal halt.
///
/// | Range | Class                                            |
/// |-------|--------------------------------------------------|
/// | 0     | no error                                         |
/// | 1–9   | hardware detection (display, bus, USB)           |
/// | 10–19 | wiring (interlock inputs)                        |
/// | 20–29 | runtime, declared but never raised (open loop)   |
/// | 99    | fallback for anything outside the table          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OutcomeCode {
    None = 0,

    /// No ACK at the configured display address or the fallback address.
    DisplayMissing = 1,
    /// Display answers at the fallback address, not the configured one.
    WrongDisplayAddress = 2,
    /// Nothing answers anywhere on the I2C bus.
    NoDevicesOnBus = 3,
    /// USB HID stack could not be installed.
    KeyboardInit = 4,

    /// Primary interlock input reads inconsistently (floating pin).
    SignalFloating = 10,
    /// Internal pull-up does not hold the input high.
    NoPullup = 11,

    BootTimeout = 20,
    SetupTimeout = 21,
    PartitionFailed = 22,
    InstallFailed = 23,

    Unknown = 99,
}

/// Display and blink payload for one [`OutcomeCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeInfo {
    pub code: OutcomeCode,
    /// First display line (≤ 16 characters).
    pub label: &'static str,
    /// Second display line (≤ 16 characters).
    pub detail: &'static str,
    /// Number encoded by the LED blink pattern.
    pub blinks: u8,
}

impl OutcomeCode {
    /// Every code in the table, in numeric order.
    pub const ALL: [Self; 12] = [
        Self::None,
        Self::DisplayMissing,
        Self::WrongDisplayAddress,
        Self::NoDevicesOnBus,
        Self::KeyboardInit,
        Self::SignalFloating,
        Self::NoPullup,
        Self::BootTimeout,
        Self::SetupTimeout,
        Self::PartitionFailed,
        Self::InstallFailed,
        Self::Unknown,
    ];

    /// Numeric code as shown on the display (`E03`, `E10`, ...).
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a raw number back to a code.  Anything outside the table
    /// becomes [`OutcomeCode::Unknown`].
    pub fn from_raw(raw: u8) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_u8() == raw)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    /// True for codes that no detector in this firmware ever produces.
    pub fn is_declared_only(self) -> bool {
        matches!(
            self,
            Self::NoPullup
                | Self::BootTimeout
                | Self::SetupTimeout
                | Self::PartitionFailed
                | Self::InstallFailed
        )
    }

    /// Look up the display/blink payload.
    pub const fn info(self) -> OutcomeInfo {
        let (label, detail) = match self {
            Self::None => ("NO ERROR", "All OK"),
            Self::DisplayMissing => ("E01:LCD MISSING", "Check I2C wiring"),
            Self::WrongDisplayAddress => ("E02:LCD ADDRESS", "Wrong address?"),
            Self::NoDevicesOnBus => ("E03:I2C ERROR", "SDA/SCL wiring"),
            Self::KeyboardInit => ("E04:USB ERROR", "HID init failed"),
            Self::SignalFloating => ("E10:SAFETY WIRE", "Pin floating"),
            Self::NoPullup => ("E11:NO PULLUP", "Check safety pin"),
            Self::BootTimeout => ("E20:BOOT FAIL", "No boot menu"),
            Self::SetupTimeout => ("E21:SETUP FAIL", "Setup not loaded"),
            Self::PartitionFailed => ("E22:WIPE FAIL", "Partition error"),
            Self::InstallFailed => ("E23:INSTALL ERR", "Didn't start"),
            Self::Unknown => ("E99:UNKNOWN", "Unknown error"),
        };
        OutcomeInfo {
            code: self,
            label,
            detail,
            blinks: self as u8,
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info();
        write!(f, "E{:02} {} ({})", self.as_u8(), info.label, info.detail)
    }
}

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every non-outcome failure in the library funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
