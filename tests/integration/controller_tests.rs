//! End-to-end runs of the controller state machine on the simulated board.

use crate::mock_hw::{DISPLAY_ADDR, RecordingSink, Screen, Sim, sim_board};

use keyrunner::app::board::Board;
use keyrunner::app::context::{DeviceContext, DeviceState};
use keyrunner::app::controller::Controller;
use keyrunner::app::events::AppEvent;
use keyrunner::app::ports::Key;
use keyrunner::config::DeviceConfig;
use keyrunner::error::OutcomeCode;
use keyrunner::reporter::{Blink, blink_pattern};
use keyrunner::safety::OperatingMode;
use keyrunner::sequencer::scripts::PARTITION_SWEEP;
use keyrunner::sequencer::sweep;

const ARM_AT_MS: u64 = 5_000;

fn controller(credential: &str) -> Controller {
    let mut config = DeviceConfig::default();
    config.credential.push_str(credential).unwrap();
    Controller::new(DeviceContext::new(config))
}

fn transitions(sink: &RecordingSink) -> Vec<DeviceState> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect()
}

fn non_spam_keys(board: &Board<Sim>, spam: Key) -> Vec<Key> {
    board
        .keyboard
        .keys()
        .into_iter()
        .filter(|k| *k != spam)
        .collect()
}

// ── Locked ────────────────────────────────────────────────────

#[test]
fn locked_device_never_types() {
    let mut board = sim_board(&[DISPLAY_ADDR], |_| false, |_| true);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    for _ in 0..20 {
        ctl.step(&mut board, &mut sink);
    }

    assert_eq!(ctl.state(), DeviceState::WaitingForArm);
    assert!(board.keyboard.strokes.is_empty(), "no keystroke while locked");
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::Armed(_))));
    assert!(!ctl.context().armed);
    // Idle blink keeps going while waiting.
    assert!(board.led.pin().rises >= 19);
}

#[test]
fn safety_screen_shown_after_self_check() {
    let mut board = sim_board(&[DISPLAY_ADDR], |_| false, |_| false);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    assert_eq!(ctl.step(&mut board, &mut sink), DeviceState::WaitingForArm);
    assert_eq!(board.display.inits, 1);
    assert_eq!(
        board.display.screens,
        vec![
            Screen::Lines("SELF CHECK".into(), "Checking...".into()),
            Screen::Lines("SAFETY ON".into(), "Pull wire to arm".into()),
        ]
    );
}

// ── Mode A ────────────────────────────────────────────────────

#[test]
fn credential_reset_runs_to_done_after_arming() {
    let mut board = sim_board(&[DISPLAY_ADDR], |t| t >= ARM_AT_MS, |_| false);
    let mut ctl = controller("hunter2");
    let mut sink = RecordingSink::default();

    let end = ctl.run_until_terminal(&mut board, &mut sink, 20);

    assert_eq!(end, DeviceState::Done);
    assert_eq!(
        transitions(&sink),
        vec![
            DeviceState::WaitingForArm,
            DeviceState::Running(OperatingMode::CredentialReset),
            DeviceState::Done,
        ]
    );
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::Halted(_))));
    assert_eq!(ctl.context().mode, Some(OperatingMode::CredentialReset));

    let first = board.keyboard.strokes.first().map(|(t, _)| *t).unwrap();
    assert!(first >= ARM_AT_MS, "typed at {} ms, before arming", first);

    assert_eq!(board.keyboard.count(Key::F(2)), 200);
    assert_eq!(
        non_spam_keys(&board, Key::F(2)),
        vec![
            Key::Down,
            Key::Down,
            Key::Down,
            Key::Down,
            Key::Down,
            Key::Enter,
            Key::Down,
            Key::Tab,
            Key::Enter,
            Key::Tab,
            Key::Enter,
            Key::Tab,
            Key::Tab,
            Key::Tab,
            Key::Tab,
            Key::Enter,
            Key::Tab,
            Key::Tab,
            Key::Enter,
        ]
    );
    assert_eq!(board.keyboard.texts(), vec!["hunter2", "hunter2"]);

    let headers = board.display.progress_headers();
    assert_eq!(headers.len(), 8);
    assert!(
        headers
            .iter()
            .enumerate()
            .all(|(i, (step, total, _))| *step == i + 1 && *total == 8)
    );
    assert_eq!(
        board.display.last(),
        Some(&Screen::Lines("COMPLETE!".into(), "Password removed".into()))
    );
    assert!(board.led.is_lit());
    assert!(sink.events.contains(&AppEvent::Adjusted { touches: 0 }));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::Completed {
            mode: OperatingMode::CredentialReset,
            ..
        }
    )));
}

#[test]
fn mode_is_sampled_once_at_arming() {
    // Mode wire pulled well after arming: the run stays in mode A.
    let mut board = sim_board(&[DISPLAY_ADDR], |t| t >= ARM_AT_MS, |t| t >= 8_000);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    assert_eq!(ctl.run_until_terminal(&mut board, &mut sink, 20), DeviceState::Done);
    assert!(sink
        .events
        .contains(&AppEvent::Armed(OperatingMode::CredentialReset)));
    assert_eq!(board.keyboard.count(Key::F(12)), 0);
}

#[test]
fn done_is_terminal() {
    let mut board = sim_board(&[DISPLAY_ADDR], |t| t >= ARM_AT_MS, |_| false);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();
    ctl.run_until_terminal(&mut board, &mut sink, 20);

    let strokes = board.keyboard.strokes.len();
    let events = sink.events.len();
    for _ in 0..5 {
        assert_eq!(ctl.step(&mut board, &mut sink), DeviceState::Done);
    }
    assert_eq!(board.keyboard.strokes.len(), strokes);
    assert_eq!(sink.events.len(), events);
    assert!(ctl.sequencer().is_completed());
}

// ── Mode B ────────────────────────────────────────────────────

#[test]
fn disk_reprovision_runs_full_sweep() {
    let mut board = sim_board(&[DISPLAY_ADDR], |t| t >= ARM_AT_MS, |_| true);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    assert_eq!(ctl.run_until_terminal(&mut board, &mut sink, 20), DeviceState::Done);
    assert!(sink
        .events
        .contains(&AppEvent::Armed(OperatingMode::DiskReprovision)));
    assert!(sink.events.contains(&AppEvent::SweepFinished {
        attempts: PARTITION_SWEEP.attempts()
    }));

    assert_eq!(board.keyboard.count(Key::F(12)), 200);
    assert_eq!(board.keyboard.count(Key::F(2)), 0);
    assert_eq!(
        non_spam_keys(&board, Key::F(12)).len() as u32,
        30 + sweep::keystrokes(&PARTITION_SWEEP)
    );
    assert!(board.keyboard.texts().is_empty());

    let headers = board.display.progress_headers();
    assert_eq!(headers.len(), 11);
    assert_eq!(headers[9].2, "WIPING");
    assert_eq!(
        board.display.last(),
        Some(&Screen::Lines("DONE!".into(), "Install started".into()))
    );
}

// ── Halt ──────────────────────────────────────────────────────

#[test]
fn missing_display_halts_headless() {
    let mut board = sim_board(&[0x50], |_| true, |_| false);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    let end = ctl.run_until_terminal(&mut board, &mut sink, 5);

    assert_eq!(end, DeviceState::Halted(OutcomeCode::DisplayMissing));
    assert!(sink
        .events
        .contains(&AppEvent::Halted(OutcomeCode::DisplayMissing)));
    assert!(!ctl.context().display_available);
    assert_eq!(board.display.inits, 0);
    assert!(board.display.screens.is_empty());
    assert_eq!(board.display.backlight_toggles, 0);
}

#[test]
fn halted_device_ignores_arming_and_blinks_code() {
    let mut board = sim_board(&[], |_| true, |_| true);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    assert_eq!(
        ctl.step(&mut board, &mut sink),
        DeviceState::Halted(OutcomeCode::NoDevicesOnBus)
    );

    let pulses = blink_pattern(OutcomeCode::NoDevicesOnBus.info().blinks)
        .iter()
        .filter(|b| matches!(b, Blink::Pulse { .. }))
        .count() as u32;
    let before = board.led.pin().rises;
    for _ in 0..3 {
        ctl.step(&mut board, &mut sink);
    }

    assert_eq!(board.led.pin().rises - before, 3 * pulses);
    assert_eq!(ctl.state(), DeviceState::Halted(OutcomeCode::NoDevicesOnBus));
    assert!(board.keyboard.strokes.is_empty());
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Halted(_)))
            .count(),
        1
    );
}

#[test]
fn floating_wire_halts_with_display_alert() {
    let mut board = sim_board(&[DISPLAY_ADDR], |t| (t / 5) % 2 == 1, |_| false);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    assert_eq!(
        ctl.step(&mut board, &mut sink),
        DeviceState::Halted(OutcomeCode::SignalFloating)
    );
    let info = OutcomeCode::SignalFloating.info();
    assert!(board
        .display
        .screens
        .contains(&Screen::Lines(info.label.into(), info.detail.into())));
    // Five off/on flashes.
    assert_eq!(board.display.backlight_toggles, 10);
}

// ── Demo mode ─────────────────────────────────────────────────

#[test]
fn demo_mode_announces_itself_at_arming() {
    let mut board = sim_board(&[DISPLAY_ADDR], |_| true, |_| false);
    let mut config = DeviceConfig::default();
    config.demo_mode = true;
    let mut ctl = Controller::new(DeviceContext::new(config));
    let mut sink = RecordingSink::default();

    ctl.step(&mut board, &mut sink);
    assert_eq!(
        ctl.step(&mut board, &mut sink),
        DeviceState::Running(OperatingMode::CredentialReset)
    );

    let screens = &board.display.screens;
    let demo = screens
        .iter()
        .position(|s| *s == Screen::Lines("** DEMO MODE **".into(), "No keys sent!".into()))
        .expect("demo notice shown");
    assert_eq!(
        screens[demo + 1],
        Screen::Lines("ARMED!".into(), "MODE A: BIOS".into())
    );
}

#[test]
fn normal_mode_skips_demo_notice() {
    let mut board = sim_board(&[DISPLAY_ADDR], |_| true, |_| false);
    let mut ctl = controller("");
    let mut sink = RecordingSink::default();

    ctl.step(&mut board, &mut sink);
    ctl.step(&mut board, &mut sink);
    assert!(!board
        .display
        .screens
        .iter()
        .any(|s| matches!(s, Screen::Lines(top, _) if top == "** DEMO MODE **")));
}
