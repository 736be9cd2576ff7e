//! Outbound application events.
//!
//! The [`Controller`](super::controller::Controller) and the sequencer emit
//! these through the [`EventSink`](super::ports::EventSink) port.

use crate::app::context::DeviceState;
use crate::error::OutcomeCode;
use crate::safety::OperatingMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The top-level state machine moved.
    StateChanged { from: DeviceState, to: DeviceState },

    /// Primary interlock removed; carries the resolved mode.
    Armed(OperatingMode),

    /// A sequencer phase began (`index` is 1-based).
    PhaseStarted {
        index: usize,
        total: usize,
        title: &'static str,
    },

    /// An adjustment window closed after `touches` compensating keys.
    Adjusted { touches: u32 },

    /// The partition sweep finished after `attempts` removal gestures.
    SweepFinished { attempts: u32 },

    /// A script ran to its final action.
    Completed {
        mode: OperatingMode,
        elapsed_ms: u64,
    },

    /// The device entered its terminal error state.
    Halted(OutcomeCode),
}
