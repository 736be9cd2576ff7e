//! Dual-wire safety gate.
//!
//! Two jumper wires tie GPIO inputs to ground.  Each input has its pull-up
//! enabled, so a wire in place reads LOW and a removed wire reads HIGH.
//!
//! | Primary wire | Mode wire | Mode                                   |
//! |--------------|-----------|----------------------------------------|
//! | in place     | any       | [`OperatingMode::Locked`]              |
//! | removed      | in place  | [`OperatingMode::CredentialReset`]     |
//! | removed      | removed   | [`OperatingMode::DiskReprovision`]     |
//!
//! The mode is recomputed from the pins on every call and never cached,
//! so a wire pulled between two reads is always reflected.
//!
//! A failed pin read counts as "wire in place": the gate fails locked.

use core::fmt;

use embedded_hal::digital::InputPin;
use log::warn;

/// What the device is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    /// Primary wire in place; no output is permitted.
    Locked,
    /// Mode A: enter firmware setup and reset the admin credential.
    CredentialReset,
    /// Mode B: boot the installer and re-provision the disk.
    DiskReprovision,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "locked"),
            Self::CredentialReset => write!(f, "credential reset"),
            Self::DiskReprovision => write!(f, "disk reprovision"),
        }
    }
}

/// Raw interlock readings at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafetyState {
    /// Primary wire has been removed (input HIGH).
    pub primary_removed: bool,
    /// Mode-select wire has been removed (input HIGH).
    pub mode_select_removed: bool,
}

impl SafetyState {
    /// Derive the operating mode.  Pure function of the two readings.
    pub const fn mode(self) -> OperatingMode {
        match (self.primary_removed, self.mode_select_removed) {
            (false, _) => OperatingMode::Locked,
            (true, false) => OperatingMode::CredentialReset,
            (true, true) => OperatingMode::DiskReprovision,
        }
    }

    pub const fn is_armed(self) -> bool {
        self.primary_removed
    }
}

/// Owns the two interlock inputs.
pub struct SafetyGate<P> {
    primary: P,
    mode_select: P,
}

impl<P: InputPin> SafetyGate<P> {
    /// Pins must already be configured as inputs with pull-ups.
    pub fn new(primary: P, mode_select: P) -> Self {
        Self {
            primary,
            mode_select,
        }
    }

    /// Sample both wires.
    pub fn read(&mut self) -> SafetyState {
        SafetyState {
            primary_removed: Self::is_removed(&mut self.primary, "primary"),
            mode_select_removed: Self::is_removed(&mut self.mode_select, "mode select"),
        }
    }

    /// True when the primary wire is out.
    pub fn is_armed(&mut self) -> bool {
        Self::is_removed(&mut self.primary, "primary")
    }

    /// Fresh read of both wires, mapped to a mode.
    pub fn resolve_mode(&mut self) -> OperatingMode {
        self.read().mode()
    }

    /// Raw level of the primary input (`true` = HIGH).  Used by the
    /// stability self-check, which needs levels rather than meaning.
    pub fn primary_level(&mut self) -> bool {
        Self::is_removed(&mut self.primary, "primary")
    }

    /// True while the primary wire end is held against ground.  This is
    /// the "touch" input of the adjustment window once the device runs.
    pub fn primary_touched(&mut self) -> bool {
        !Self::is_removed(&mut self.primary, "primary")
    }

    fn is_removed(pin: &mut P, name: &str) -> bool {
        match pin.is_high() {
            Ok(high) => high,
            Err(_) => {
                warn!("Safety: {} wire read failed, treating as in place", name);
                false
            }
        }
    }
}
