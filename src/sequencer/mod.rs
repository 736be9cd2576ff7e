//! Phase sequencer.
//!
//! Executes one data-described [`Script`] strictly in order:
//!
//! ```text
//!  for each phase:
//!      display  "TITLE [i/N]" + detail
//!      settle   phase_settle_ms
//!      for each action:
//!          perform, then its pause
//! ```
//!
//! A [`Sequencer`] runs exactly once.  After the final action it is marked
//! completed and any further [`Sequencer::run`] is refused.

pub mod script;
pub mod scripts;
pub mod sweep;

use core::fmt;

use log::{debug, info};

use crate::adjustment::run_adjustment_window;
use crate::app::board::{Board, Platform};
use crate::app::context::DeviceContext;
use crate::app::events::AppEvent;
use crate::app::ports::{Clock, DisplayChannel, EventSink, OutputChannel};

pub use script::{Action, Pause, Phase, Script, SweepPlan};

/// Why a script could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// This sequencer already ran a script to completion.
    AlreadyCompleted,
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCompleted => write!(f, "sequence already completed"),
        }
    }
}

/// Progress of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerRunState {
    /// 0-based index of the phase being executed.  Equals the phase count
    /// once the run has completed.
    pub phase_index: usize,
    /// Clock time spent in `run` so far.
    pub elapsed_ms: u64,
    pub completed: bool,
}

/// Totals reported when a script finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub phases: usize,
    pub touches: u32,
    pub sweep_attempts: u32,
    pub elapsed_ms: u64,
}

#[derive(Default)]
pub struct Sequencer {
    state: SequencerRunState,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SequencerRunState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    /// Run `script` to its final action.  Blocks for the whole script.
    pub fn run<P: Platform>(
        &mut self,
        ctx: &DeviceContext,
        board: &mut Board<P>,
        sink: &mut impl EventSink,
        script: &Script,
    ) -> Result<RunSummary, SequenceError> {
        if self.state.completed {
            return Err(SequenceError::AlreadyCompleted);
        }

        let started = board.clock.now_ms();
        let total = script.total_phases();
        let mut summary = RunSummary {
            phases: total,
            ..RunSummary::default()
        };
        info!("Sequencer: starting {} ({} phases)", script.name, total);

        for (i, phase) in script.phases.iter().enumerate() {
            self.state.phase_index = i;
            info!("Sequencer: phase {}/{} {}", i + 1, total, phase.title);
            sink.emit(&AppEvent::PhaseStarted {
                index: i + 1,
                total,
                title: phase.title,
            });
            ctx.show(&mut board.display, |d| {
                d.show_progress(i + 1, total, phase.title, phase.detail)
            });
            board.clock.sleep_ms(ctx.config.timing.phase_settle_ms);

            for action in phase.actions {
                self.perform(ctx, board, sink, phase, action, &mut summary);
            }
            self.state.elapsed_ms = board.clock.now_ms().saturating_sub(started);
        }

        self.state.phase_index = total;
        self.state.completed = true;
        summary.elapsed_ms = self.state.elapsed_ms;
        info!(
            "Sequencer: {} complete in {} ms",
            script.name, summary.elapsed_ms
        );
        Ok(summary)
    }

    fn perform<P: Platform>(
        &mut self,
        ctx: &DeviceContext,
        board: &mut Board<P>,
        sink: &mut impl EventSink,
        phase: &Phase,
        action: &Action,
        summary: &mut RunSummary,
    ) {
        let timing = &ctx.config.timing;
        match *action {
            Action::Key(key, pause) => {
                debug!("Sequencer: key {:?}", key);
                board.keyboard.press_key(key);
                board.clock.sleep_ms(pause.resolve(timing));
            }
            Action::Repeat { key, times, pause } => {
                debug!("Sequencer: key {:?} x{}", key, times);
                for _ in 0..times {
                    board.keyboard.press_key(key);
                    board.clock.sleep_ms(pause.resolve(timing));
                }
            }
            Action::Combo(mods, key, pause) => {
                debug!("Sequencer: combo {:#04x}+{:?}", mods.bits(), key);
                board.keyboard.press_combo(mods, key);
                board.clock.sleep_ms(pause.resolve(timing));
            }
            Action::Text(text, pause) => {
                board.keyboard.type_text(text);
                board.clock.sleep_ms(pause.resolve(timing));
            }
            Action::Credential(pause) => {
                // Length only; the credential itself never reaches the log.
                debug!("Sequencer: credential ({} chars)", ctx.config.credential.len());
                board.keyboard.type_text(&ctx.config.credential);
                board.clock.sleep_ms(pause.resolve(timing));
            }
            Action::Wait(ms) => board.clock.sleep_ms(ms),
            Action::Countdown { prefix, seconds } => {
                for remaining in (1..=seconds).rev() {
                    ctx.show(&mut board.display, |d| {
                        d.show_countdown(phase.title, prefix, remaining)
                    });
                    board.clock.sleep_ms(1000);
                }
            }
            Action::Spam { key, duration_ms } => {
                let sent = spam(ctx, board, phase, key, duration_ms);
                info!("Sequencer: sent {:?} {} times", key, sent);
            }
            Action::Status(top, bottom) => {
                ctx.show(&mut board.display, |d| d.show_two_lines(top, bottom));
            }
            Action::Adjust {
                initial_ms,
                touch_ms,
                key,
            } => {
                let touches =
                    run_adjustment_window(ctx, board, phase.title, initial_ms, touch_ms, key);
                summary.touches += touches;
                sink.emit(&AppEvent::Adjusted { touches });
                ctx.show(&mut board.display, |d| {
                    d.show_two_lines(phase.title, "Adjust done")
                });
            }
            Action::Sweep(plan) => {
                let attempts = sweep::run_sweep(ctx, board, &plan);
                summary.sweep_attempts += attempts;
                sink.emit(&AppEvent::SweepFinished { attempts });
            }
        }
    }
}

/// Press `key` for `duration_ms`.  After each press the loop sleeps
/// `spam_interval_ms - key_hold_ms`.  The output channel holds the key for
/// `key_hold_ms` on press and again on release, so on the device one press
/// takes `spam_interval_ms + key_hold_ms` (150 ms with defaults).  Returns
/// the number of presses.
fn spam<P: Platform>(
    ctx: &DeviceContext,
    board: &mut Board<P>,
    phase: &Phase,
    key: crate::app::ports::Key,
    duration_ms: u32,
) -> u32 {
    let timing = &ctx.config.timing;
    let gap = timing.spam_interval_ms.saturating_sub(timing.key_hold_ms).max(1);
    let start = board.clock.now_ms();
    let duration = u64::from(duration_ms);
    let mut last_shown = u32::MAX;
    let mut sent = 0;

    loop {
        let elapsed = board.clock.now_ms().saturating_sub(start);
        if elapsed >= duration {
            break;
        }
        board.keyboard.press_key(key);
        sent += 1;

        let remaining = ((duration - elapsed) / 1000) as u32;
        if remaining != last_shown {
            last_shown = remaining;
            ctx.show(&mut board.display, |d| {
                d.show_countdown(phase.title, phase.detail, remaining)
            });
        }
        board.clock.sleep_ms(gap);
    }
    sent
}
