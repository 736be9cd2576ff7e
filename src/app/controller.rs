//! Controller: the top-level state machine.
//!
//! [`Controller`] owns the [`DeviceContext`] and the [`Sequencer`].  All
//! I/O flows through the [`Board`] and the [`EventSink`] passed to
//! [`Controller::step`], so the whole device runs against mock adapters.
//!
//! ```text
//!  Diagnosing ──ok──▶ WaitingForArm ──armed──▶ Running(mode) ──▶ Done
//!      │
//!      └──fail──▶ Halted(code)
//! ```
//!
//! Each `step` performs one unit of work and returns the state after it.
//! `Done` and `Halted` are terminal: stepping them only refreshes the
//! indicators.

use log::{error, info, warn};

use crate::diagnostics::run_diagnostics;
use crate::reporter;
use crate::safety::OperatingMode;
use crate::sequencer::{Sequencer, scripts};

use super::board::{Board, Platform};
use super::context::{DeviceContext, DeviceState};
use super::events::AppEvent;
use super::ports::{BusProbe, Clock, DisplayChannel, EventSink};

const ARM_FLASHES: u32 = 3;
const ARM_FLASH_MS: u32 = 300;
const ARM_BLINKS: u32 = 3;
const ARM_BLINK_MS: u32 = 100;
const DONE_REFRESH_MS: u32 = 1000;
const DEMO_NOTICE_MS: u32 = 1500;

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    ctx: DeviceContext,
    sequencer: Sequencer,
}

impl Controller {
    pub fn new(ctx: DeviceContext) -> Self {
        Self {
            ctx,
            sequencer: Sequencer::new(),
        }
    }

    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn state(&self) -> DeviceState {
        self.ctx.state
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    // ── Stepping ──────────────────────────────────────────────

    /// Advance by one unit of work.
    pub fn step<P: Platform>(&mut self, board: &mut Board<P>, sink: &mut impl EventSink) -> DeviceState {
        let next = match self.ctx.state {
            DeviceState::Diagnosing => self.diagnose(board),
            DeviceState::WaitingForArm => self.wait_for_arm(board, sink),
            DeviceState::Running(mode) => self.run(board, sink, mode),
            DeviceState::Done => {
                board.led.on();
                board.clock.sleep_ms(DONE_REFRESH_MS);
                DeviceState::Done
            }
            DeviceState::Halted(code) => {
                reporter::blink_once(&mut board.led, &mut board.clock, code);
                DeviceState::Halted(code)
            }
        };
        self.transition(next, sink);
        next
    }

    /// Step until a terminal state or `max_steps`, whichever comes first.
    pub fn run_until_terminal<P: Platform>(
        &mut self,
        board: &mut Board<P>,
        sink: &mut impl EventSink,
        max_steps: usize,
    ) -> DeviceState {
        for _ in 0..max_steps {
            if self.step(board, sink).is_terminal() {
                break;
            }
        }
        self.ctx.state
    }

    fn transition(&mut self, next: DeviceState, sink: &mut impl EventSink) {
        let prev = self.ctx.state;
        if prev == next {
            return;
        }
        info!("Controller: {} -> {}", prev.name(), next.name());
        sink.emit(&AppEvent::StateChanged {
            from: prev,
            to: next,
        });
        if let DeviceState::Halted(code) = next {
            sink.emit(&AppEvent::Halted(code));
        }
        self.ctx.state = next;
    }

    // ── States ────────────────────────────────────────────────

    fn diagnose<P: Platform>(&mut self, board: &mut Board<P>) -> DeviceState {
        self.ctx.display_available = board.bus.probe(self.ctx.config.display_address);
        if self.ctx.display_available {
            board.display.init();
        } else {
            warn!(
                "Controller: no display at 0x{:02X}, continuing headless",
                self.ctx.config.display_address
            );
        }
        self.ctx
            .show(&mut board.display, |d| d.show_two_lines("SELF CHECK", "Checking..."));

        let code = run_diagnostics(
            &mut board.bus,
            &mut board.gate,
            &mut board.clock,
            &self.ctx.config,
        );
        if !code.is_none() {
            error!("Controller: self-check failed: {}", code);
            reporter::enter_halt(&self.ctx, &mut board.display, &mut board.clock, code);
            return DeviceState::Halted(code);
        }

        info!("Controller: self-check passed, waiting for arm");
        self.ctx
            .show(&mut board.display, |d| d.show_two_lines("SAFETY ON", "Pull wire to arm"));
        DeviceState::WaitingForArm
    }

    fn wait_for_arm<P: Platform>(&mut self, board: &mut Board<P>, sink: &mut impl EventSink) -> DeviceState {
        if !board.gate.is_armed() {
            let half = self.ctx.config.timing.idle_blink_ms;
            board.led.flash(&mut board.clock, 1, half, half);
            return DeviceState::WaitingForArm;
        }

        let mode = board.gate.resolve_mode();
        if mode == OperatingMode::Locked {
            // Wire went back in between the two reads.
            return DeviceState::WaitingForArm;
        }

        self.ctx.armed = true;
        self.ctx.mode = Some(mode);
        info!("Controller: ARMED, mode {}", mode);
        sink.emit(&AppEvent::Armed(mode));

        if self.ctx.config.demo_mode {
            warn!("Controller: demo mode, keystrokes are logged only");
            if self.ctx.display_available {
                board.display.show_two_lines("** DEMO MODE **", "No keys sent!");
                board.clock.sleep_ms(DEMO_NOTICE_MS);
            }
        }

        let label = match mode {
            OperatingMode::DiskReprovision => "MODE B: DISK",
            _ => "MODE A: BIOS",
        };
        self.ctx
            .show(&mut board.display, |d| d.show_two_lines("ARMED!", label));
        if self.ctx.display_available {
            for _ in 0..ARM_FLASHES {
                board.display.set_backlight(false);
                board.clock.sleep_ms(ARM_FLASH_MS);
                board.display.set_backlight(true);
                board.clock.sleep_ms(ARM_FLASH_MS);
            }
        }
        board
            .led
            .flash(&mut board.clock, ARM_BLINKS, ARM_BLINK_MS, ARM_BLINK_MS);

        DeviceState::Running(mode)
    }

    fn run<P: Platform>(
        &mut self,
        board: &mut Board<P>,
        sink: &mut impl EventSink,
        mode: OperatingMode,
    ) -> DeviceState {
        let Some(script) = scripts::for_mode(mode) else {
            warn!("Controller: no script for {}, back to waiting", mode);
            return DeviceState::WaitingForArm;
        };

        match self.sequencer.run(&self.ctx, board, sink, script) {
            Ok(summary) => {
                info!(
                    "Controller: {} done ({} phases, {} touch(es), {} sweep attempts)",
                    script.name, summary.phases, summary.touches, summary.sweep_attempts
                );
                sink.emit(&AppEvent::Completed {
                    mode,
                    elapsed_ms: summary.elapsed_ms,
                });
            }
            Err(e) => warn!("Controller: {}", e),
        }

        let (top, bottom) = script.completion;
        self.ctx
            .show(&mut board.display, |d| d.show_two_lines(top, bottom));
        board.led.on();
        DeviceState::Done
    }
}

