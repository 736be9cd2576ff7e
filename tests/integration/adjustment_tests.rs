//! Timing of the touch-driven adjustment window against the simulated
//! clock.  Default timing: 50 ms polling, 200 ms touch feedback.

use keyrunner::adjustment::run_adjustment_window;
use keyrunner::app::board::Board;
use keyrunner::app::context::DeviceContext;
use keyrunner::app::ports::{Clock, Key};
use keyrunner::config::DeviceConfig;

use crate::mock_hw::{Screen, Sim, sim_board};

const INITIAL_MS: u32 = 1_000;
const TOUCH_MS: u32 = 400;

/// `touched` returns true while the wire end is held to ground.
fn board(mut touched: impl FnMut(u64) -> bool + 'static) -> Board<Sim> {
    sim_board(&[], move |t| !touched(t), |_| false)
}

fn ctx(display: bool) -> DeviceContext {
    let mut ctx = DeviceContext::new(DeviceConfig::default());
    ctx.display_available = display;
    ctx
}

fn run(ctx: &DeviceContext, board: &mut Board<Sim>) -> u32 {
    run_adjustment_window(ctx, board, "ADJUST", INITIAL_MS, TOUCH_MS, Key::Down)
}

#[test]
fn untouched_window_closes_at_initial_deadline() {
    let mut b = board(|_| false);
    let touches = run(&ctx(true), &mut b);

    assert_eq!(touches, 0);
    assert_eq!(b.clock.now_ms(), u64::from(INITIAL_MS));
    assert!(b.keyboard.strokes.is_empty());
    assert_eq!(
        b.display.screens.first(),
        Some(&Screen::Countdown {
            title: "ADJUST".into(),
            prefix: "Touch wire".into(),
            seconds: 1,
        })
    );
}

#[test]
fn single_touch_sends_key_and_shortens_deadline() {
    let mut b = board(|t| (500..600).contains(&t));
    let touches = run(&ctx(true), &mut b);

    assert_eq!(touches, 1);
    assert_eq!(b.keyboard.keys(), vec![Key::Down]);
    assert_eq!(b.keyboard.strokes[0].0, 500);
    // Closes TOUCH_MS after the touch, not INITIAL_MS after opening.
    assert_eq!(b.clock.now_ms(), 500 + u64::from(TOUCH_MS));
    assert!(b
        .display
        .screens
        .contains(&Screen::Lines("ADJUST".into(), "+1 Down".into())));
    assert_eq!(b.led.pin().rises, 1);
    assert!(!b.led.is_lit());
}

#[test]
fn held_touch_counts_once() {
    let mut b = board(|t| (100..600).contains(&t));
    assert_eq!(run(&ctx(true), &mut b), 1);
    assert_eq!(b.keyboard.count(Key::Down), 1);
}

#[test]
fn each_new_touch_restarts_the_window() {
    let mut b = board(|t| (100..150).contains(&t) || (400..450).contains(&t));
    assert_eq!(run(&ctx(true), &mut b), 2);
    assert_eq!(b.keyboard.count(Key::Down), 2);
    assert_eq!(b.clock.now_ms(), 400 + u64::from(TOUCH_MS));
}

#[test]
fn touch_at_deadline_is_too_late() {
    let mut b = board(|t| t >= u64::from(INITIAL_MS));
    assert_eq!(run(&ctx(true), &mut b), 0);
    assert!(b.keyboard.strokes.is_empty());
}

#[test]
fn headless_window_still_counts() {
    let mut b = board(|t| (200..300).contains(&t));
    assert_eq!(run(&ctx(false), &mut b), 1);
    assert!(b.display.screens.is_empty());
}
