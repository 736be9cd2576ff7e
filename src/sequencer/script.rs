//! Script data model.
//!
//! A [`Script`] is static data: an ordered list of [`Phase`]s, each an
//! ordered list of [`Action`]s.  Nothing here is mutated at runtime; the
//! only per-run state lives in [`SequencerRunState`](super::SequencerRunState).

use crate::app::ports::{Key, Modifiers};
use crate::config::Timing;
use crate::safety::OperatingMode;

/// Spacing applied after an output action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// No spacing; the next action follows immediately.
    None,
    /// Ordinary inter-action spacing.
    Tap,
    /// After a key that changes screens.
    Hold,
    /// After a key that confirms a dialog.
    Confirm,
    /// Explicit spacing.
    Ms(u32),
}

impl Pause {
    pub fn resolve(self, timing: &Timing) -> u32 {
        match self {
            Self::None => 0,
            Self::Tap => timing.tap_ms,
            Self::Hold => timing.hold_ms,
            Self::Confirm => timing.confirm_ms,
            Self::Ms(ms) => ms,
        }
    }
}

/// Parameters of the bounded partition sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPlan {
    /// Alternating down/up passes.
    pub passes: u32,
    /// Removal attempts per pass.
    pub positions: u32,
    /// Presses that are guaranteed to reach either end of the list.
    pub home_presses: u32,
}

impl SweepPlan {
    pub const fn attempts(&self) -> u32 {
        self.passes * self.positions
    }
}

/// One step of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Key(Key, Pause),
    Repeat { key: Key, times: u32, pause: Pause },
    Combo(Modifiers, Key, Pause),
    Text(&'static str, Pause),
    /// Type the configured credential.
    Credential(Pause),
    Wait(u32),
    /// Count down in whole seconds, updating the display each second.
    Countdown { prefix: &'static str, seconds: u32 },
    /// Press `key` every spam interval for `duration_ms`.
    Spam { key: Key, duration_ms: u32 },
    /// Replace the phase header with two status lines.
    Status(&'static str, &'static str),
    /// Open an adjustment window that sends `key` per touch.
    Adjust {
        initial_ms: u32,
        touch_ms: u32,
        key: Key,
    },
    Sweep(SweepPlan),
}

impl Action {
    /// Keystrokes this action sends.  `None` for actions whose count
    /// depends on time or input.
    pub fn fixed_keystrokes(&self) -> Option<u32> {
        match self {
            Self::Key(..) | Self::Combo(..) => Some(1),
            Self::Repeat { times, .. } => Some(*times),
            Self::Text(text, _) => Some(text.chars().count() as u32),
            Self::Wait(_) | Self::Countdown { .. } | Self::Status(..) => Some(0),
            Self::Credential(_) | Self::Spam { .. } | Self::Adjust { .. } => None,
            Self::Sweep(plan) => Some(super::sweep::keystrokes(plan)),
        }
    }
}

pub struct Phase {
    /// Display header, at most 10 characters so `TITLE [NN/NN]` fits.
    pub title: &'static str,
    pub detail: &'static str,
    pub actions: &'static [Action],
}

pub struct Script {
    pub name: &'static str,
    pub mode: OperatingMode,
    pub phases: &'static [Phase],
    /// Two lines shown once the script finishes.
    pub completion: (&'static str, &'static str),
}

impl Script {
    pub fn total_phases(&self) -> usize {
        self.phases.len()
    }
}
