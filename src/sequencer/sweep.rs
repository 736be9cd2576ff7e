//! Bounded partition sweep.
//!
//! The installer's partition list shrinks every time a removal succeeds,
//! and nothing tells us how many rows are left.  Instead of tracking it,
//! walk the list top-to-bottom, then bottom-to-top, a fixed number of
//! times, trying the removal gesture at every position:
//!
//! ```text
//!  pass 1 ↓   pass 2 ↑   pass 3 ↓   pass 4 ↑
//!  ┌──────┐
//!  │ hdr  │  (skipped after homing to the top)
//!  │ row  │ ×  positions, gesture at each
//!  │ ...  │
//!  └──────┘
//! ```
//!
//! Pressing an arrow key `home_presses` times is guaranteed to reach either
//! end, so re-homing between passes needs no feedback either.

use log::info;

use crate::app::board::{Board, Platform};
use crate::app::context::DeviceContext;
use crate::app::ports::{Clock, DisplayChannel, Key, OutputChannel};

use super::script::SweepPlan;

/// Removal gesture: Tab to the action panel, Right to "Delete", Enter,
/// Tab to OK, Enter.  Each step with its own spacing.
const GESTURE: [(Key, u32); 5] = [
    (Key::Tab, 400),
    (Key::Right, 400),
    (Key::Enter, 500),
    (Key::Tab, 300),
    (Key::Enter, 600),
];
const STEP_MS: u32 = 300;
const HOME_INITIAL_MS: u32 = 80;
const HOME_BETWEEN_MS: u32 = 60;
const SETTLE_MS: u32 = 200;
const SKIP_HEADER_INITIAL_MS: u32 = 200;
const SKIP_HEADER_BETWEEN_MS: u32 = 100;

/// Keystrokes [`run_sweep`] sends for `plan`.
pub fn keystrokes(plan: &SweepPlan) -> u32 {
    let homing = plan.home_presses + 1;
    let per_position = GESTURE.len() as u32 + 1;
    let rehome: u32 = (0..plan.passes)
        .map(|pass| {
            if going_down(pass) {
                plan.home_presses + 1
            } else {
                plan.home_presses
            }
        })
        .sum();
    homing + plan.attempts() * per_position + rehome
}

/// Even passes walk down, odd passes walk up.
pub fn going_down(pass: u32) -> bool {
    pass % 2 == 0
}

fn press<P: Platform>(board: &mut Board<P>, key: Key, pause_ms: u32) {
    board.keyboard.press_key(key);
    board.clock.sleep_ms(pause_ms);
}

fn repeat<P: Platform>(board: &mut Board<P>, key: Key, times: u32, pause_ms: u32) {
    for _ in 0..times {
        press(board, key, pause_ms);
    }
}

/// Run every pass and return the number of removal attempts.
pub fn run_sweep<P: Platform>(ctx: &DeviceContext, board: &mut Board<P>, plan: &SweepPlan) -> u32 {
    // Top of the list, then past the drive header.
    repeat(board, Key::Up, plan.home_presses, HOME_INITIAL_MS);
    board.clock.sleep_ms(SETTLE_MS);
    press(board, Key::Down, SKIP_HEADER_INITIAL_MS);

    let mut attempts = 0;
    for pass in 0..plan.passes {
        let down = going_down(pass);
        info!(
            "Sweep: pass {}/{} going {}",
            pass + 1,
            plan.passes,
            if down { "down" } else { "up" }
        );

        for pos in 0..plan.positions {
            attempts += 1;
            let mut top: heapless::String<16> = heapless::String::new();
            let _ = core::fmt::write(
                &mut top,
                format_args!(
                    "SWEEP {}/{} {}",
                    pass + 1,
                    plan.passes,
                    if down { "DN" } else { "UP" }
                ),
            );
            let mut bottom: heapless::String<16> = heapless::String::new();
            let _ = core::fmt::write(&mut bottom, format_args!("Deleting... P{}", pos + 1));
            ctx.show(&mut board.display, |d| d.show_two_lines(&top, &bottom));

            for (key, pause) in GESTURE {
                press(board, key, pause);
            }
            press(board, if down { Key::Down } else { Key::Up }, STEP_MS);
        }

        // Re-home to the end the next pass starts from.
        if down {
            repeat(board, Key::Up, plan.home_presses, HOME_BETWEEN_MS);
            press(board, Key::Down, SKIP_HEADER_BETWEEN_MS);
        } else {
            repeat(board, Key::Down, plan.home_presses, HOME_BETWEEN_MS);
        }
        board.clock.sleep_ms(SETTLE_MS);
    }

    info!("Sweep: finished, {} removal attempts", attempts);
    attempts
}
