//! Adaptive adjustment window.
//!
//! The target's on-screen layout is not known in advance, so at one point
//! in each script the operator may nudge the cursor: every time the
//! (already removed) primary wire is touched back to ground, one
//! compensating key is sent and the window restarts with a shorter
//! deadline.  The window closes once a full deadline passes with no new
//! touch.
//!
//! [`AdjustmentWindow`] is the pure state machine.  It only sees
//! `(now, asserted)` samples, so it is tested without a clock.
//! [`run_adjustment_window`] drives it against real hardware.

use log::{debug, info};

use crate::app::board::{Board, Platform};
use crate::app::context::DeviceContext;
use crate::app::ports::{Clock, DisplayChannel, Key, OutputChannel};

/// What one sample did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStep {
    /// Rising edge: emit one compensating action.
    Touched,
    /// Still open; `remaining_ms` until the current deadline.
    Waiting { remaining_ms: u64 },
    /// Deadline passed without a new edge.
    Closed,
}

/// State of one adjustment call.  Discarded when the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentWindow {
    window_start: u64,
    deadline_ms: u64,
    touch_ms: u64,
    touches: u32,
    last_asserted: bool,
}

impl AdjustmentWindow {
    pub fn open(now: u64, initial_ms: u32, touch_ms: u32) -> Self {
        Self {
            window_start: now,
            deadline_ms: u64::from(initial_ms),
            touch_ms: u64::from(touch_ms),
            touches: 0,
            last_asserted: false,
        }
    }

    /// Feed one sample.  Expiry is checked before the input, so a touch
    /// arriving exactly at the deadline is not counted.
    pub fn sample(&mut self, now: u64, asserted: bool) -> WindowStep {
        let elapsed = now.saturating_sub(self.window_start);
        if elapsed >= self.deadline_ms {
            return WindowStep::Closed;
        }

        let rising = asserted && !self.last_asserted;
        self.last_asserted = asserted;

        if rising {
            self.touches += 1;
            self.window_start = now;
            self.deadline_ms = self.touch_ms;
            WindowStep::Touched
        } else {
            WindowStep::Waiting {
                remaining_ms: self.deadline_ms - elapsed,
            }
        }
    }

    pub fn touches(&self) -> u32 {
        self.touches
    }

    /// Current deadline (initial until the first touch).
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}

/// Block until the window closes; return how many compensating `key`
/// presses were sent.
///
/// Samples `primary_touched()` every `poll_interval_ms`.  Each touch
/// lights the LED for the key press plus `touch_feedback_ms`.
pub fn run_adjustment_window<P: Platform>(
    ctx: &DeviceContext,
    board: &mut Board<P>,
    title: &str,
    initial_ms: u32,
    touch_ms: u32,
    key: Key,
) -> u32 {
    let timing = ctx.config.timing;
    let mut window = AdjustmentWindow::open(board.clock.now_ms(), initial_ms, touch_ms);
    info!(
        "Adjust: window open ({} ms, {} ms after touch)",
        initial_ms, touch_ms
    );

    loop {
        let now = board.clock.now_ms();
        let asserted = board.gate.primary_touched();
        match window.sample(now, asserted) {
            WindowStep::Closed => break,
            WindowStep::Touched => {
                let n = window.touches();
                debug!("Adjust: touch {} -> {:?}", n, key);
                board.led.on();
                board.keyboard.press_key(key);
                board.clock.sleep_ms(timing.touch_feedback_ms);
                board.led.off();

                let mut line: heapless::String<16> = heapless::String::new();
                let _ = core::fmt::write(&mut line, format_args!("+{} {:?}", n, key));
                ctx.show(&mut board.display, |d| d.show_two_lines(title, &line));
            }
            WindowStep::Waiting { remaining_ms } => {
                let secs = remaining_ms.div_ceil(1000) as u32;
                ctx.show(&mut board.display, |d| {
                    d.show_countdown(title, "Touch wire", secs)
                });
            }
        }
        board.clock.sleep_ms(timing.poll_interval_ms);
    }

    let touches = window.touches();
    info!("Adjust: window closed after {} touch(es)", touches);
    touches
}
