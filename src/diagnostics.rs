//! Power-on self-checks.
//!
//! Runs once before the safety gate is polled.  Three checks, in order;
//! the first failure wins and nothing is persisted:
//!
//! 1. **Bus presence**: something must acknowledge on the I2C bus.
//! 2. **Display identity**: the display must answer at the configured
//!    address.  An answer at the fallback address means a misconfigured
//!    backpack rather than a missing one.
//! 3. **Input stability**: the primary interlock input must read
//!    consistently.  A pin that flips back and forth is floating.

use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::app::ports::{BusProbe, Clock};
use crate::config::DeviceConfig;
use crate::error::OutcomeCode;
use crate::safety::SafetyGate;

/// First and one-past-last probed address (general call and the 10-bit
/// prefix range are skipped).
pub const SCAN_FIRST: u8 = 0x01;
pub const SCAN_END: u8 = 0x7F;

pub const STABILITY_SAMPLES: u32 = 10;
pub const STABILITY_SPACING_MS: u32 = 5;
/// A level seen at least this often, and at most `STABILITY_SAMPLES - this`
/// times, marks the input as floating.
pub const FLOAT_MIN_COUNT: u32 = 2;

/// Result of probing every address once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusScan {
    pub responders: u32,
    pub display_found: bool,
    pub fallback_found: bool,
}

impl BusScan {
    /// Steps 1 and 2 as a pure function of the scan.
    pub fn outcome(&self) -> OutcomeCode {
        if self.responders == 0 {
            OutcomeCode::NoDevicesOnBus
        } else if self.display_found {
            OutcomeCode::None
        } else if self.fallback_found {
            OutcomeCode::WrongDisplayAddress
        } else {
            OutcomeCode::DisplayMissing
        }
    }
}

pub fn scan_bus<B: BusProbe>(bus: &mut B, config: &DeviceConfig) -> BusScan {
    let mut scan = BusScan::default();
    for addr in SCAN_FIRST..SCAN_END {
        if bus.probe(addr) {
            scan.responders += 1;
            info!("Diag: device at 0x{:02X}", addr);
            if addr == config.display_address {
                scan.display_found = true;
            } else if addr == config.fallback_display_address {
                scan.fallback_found = true;
            }
        }
    }
    scan
}

/// True when both levels were seen often enough to rule out a clean
/// signal with an occasional glitch.
pub fn is_floating(high_count: u32, low_count: u32) -> bool {
    let max = STABILITY_SAMPLES - FLOAT_MIN_COUNT;
    (FLOAT_MIN_COUNT..=max).contains(&high_count) && (FLOAT_MIN_COUNT..=max).contains(&low_count)
}

/// Sample the primary input and classify it.
pub fn check_stability<S: InputPin, C: Clock>(gate: &mut SafetyGate<S>, clock: &mut C) -> OutcomeCode {
    let mut high = 0;
    for i in 0..STABILITY_SAMPLES {
        if gate.primary_level() {
            high += 1;
        }
        if i + 1 < STABILITY_SAMPLES {
            clock.sleep_ms(STABILITY_SPACING_MS);
        }
    }
    let low = STABILITY_SAMPLES - high;
    if is_floating(high, low) {
        warn!("Diag: primary input floating ({} high / {} low)", high, low);
        OutcomeCode::SignalFloating
    } else {
        info!("Diag: primary input stable ({} high / {} low)", high, low);
        OutcomeCode::None
    }
}

/// Run every check in order and return the first non-`None` outcome.
pub fn run_diagnostics<B, S, C>(
    bus: &mut B,
    gate: &mut SafetyGate<S>,
    clock: &mut C,
    config: &DeviceConfig,
) -> OutcomeCode
where
    B: BusProbe,
    S: InputPin,
    C: Clock,
{
    info!("Diag: scanning I2C bus");
    let scan = scan_bus(bus, config);
    let outcome = scan.outcome();
    match outcome {
        OutcomeCode::None => info!(
            "Diag: display at 0x{:02X} ({} device(s) on bus)",
            config.display_address, scan.responders
        ),
        other => {
            warn!("Diag: bus check failed: {}", other);
            return other;
        }
    }

    check_stability(gate, clock)
}
