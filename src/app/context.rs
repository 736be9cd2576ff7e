//! Shared context threaded through the controller and the sequencer.
//!
//! `DeviceContext` carries configuration, the display-availability flag
//! decided at boot, and the top-level [`DeviceState`].  It is owned by the
//! [`Controller`](super::controller::Controller) and lent immutably to
//! everything that runs a script.

use crate::config::DeviceConfig;
use crate::error::OutcomeCode;
use crate::safety::OperatingMode;

use super::ports::DisplayChannel;

// ---------------------------------------------------------------------------
// Top-level state
// ---------------------------------------------------------------------------

/// Where the device is in its single pass from power-on to done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Power-on self-checks.
    Diagnosing,
    /// Self-checks passed; polling the primary interlock.
    WaitingForArm,
    /// A script is executing.
    Running(OperatingMode),
    /// The script finished.  Terminal.
    Done,
    /// A self-check failed.  Terminal.
    Halted(OutcomeCode),
}

impl DeviceState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Halted(_))
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Diagnosing => "Diagnosing",
            Self::WaitingForArm => "WaitingForArm",
            Self::Running(_) => "Running",
            Self::Done => "Done",
            Self::Halted(_) => "Halted",
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

pub struct DeviceContext {
    pub config: DeviceConfig,
    /// Set once during diagnostics.  While false every display call is
    /// skipped so a missing panel never blocks the run.
    pub display_available: bool,
    /// Latched when the primary wire is first seen removed.
    pub armed: bool,
    /// Mode resolved at the moment of arming.
    pub mode: Option<OperatingMode>,
    pub state: DeviceState,
}

impl DeviceContext {
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            display_available: false,
            armed: false,
            mode: None,
            state: DeviceState::Diagnosing,
        }
    }

    /// Run `f` against the display only when one was detected.
    pub fn show<D: DisplayChannel>(&self, display: &mut D, f: impl FnOnce(&mut D)) {
        if self.display_available {
            f(display);
        }
    }
}
