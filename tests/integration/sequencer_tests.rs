//! Sequencer behaviour on hand-built scripts.

use keyrunner::app::board::Board;
use keyrunner::app::context::DeviceContext;
use keyrunner::app::events::AppEvent;
use keyrunner::app::ports::{Clock, Key, Modifiers};
use keyrunner::config::DeviceConfig;
use keyrunner::safety::OperatingMode;
use keyrunner::sequencer::scripts::CREDENTIAL_RESET;
use keyrunner::sequencer::{Action, Pause, Phase, Script, SequenceError, Sequencer};

use crate::mock_hw::{RecordingSink, Screen, Sim, Stroke, sim_board};

static MIXED: Script = Script {
    name: "mixed",
    mode: OperatingMode::CredentialReset,
    phases: &[
        Phase {
            title: "FIRST",
            detail: "keys",
            actions: &[
                Action::Key(Key::Enter, Pause::Tap),
                Action::Combo(Modifiers::CTRL, Key::Char('a'), Pause::None),
                Action::Text("abc", Pause::Ms(100)),
            ],
        },
        Phase {
            title: "SECOND",
            detail: "secret",
            actions: &[
                Action::Status("HELLO", "world"),
                Action::Credential(Pause::Confirm),
                Action::Wait(250),
            ],
        },
    ],
    completion: ("OK", "done"),
};

static COUNTDOWN: Script = Script {
    name: "countdown",
    mode: OperatingMode::DiskReprovision,
    phases: &[Phase {
        title: "LOADING",
        detail: "",
        actions: &[Action::Countdown {
            prefix: "Wait",
            seconds: 3,
        }],
    }],
    completion: ("", ""),
};

static SPAM: Script = Script {
    name: "spam",
    mode: OperatingMode::CredentialReset,
    phases: &[Phase {
        title: "SPAM",
        detail: "F2",
        actions: &[Action::Spam {
            key: Key::F(2),
            duration_ms: 1_000,
        }],
    }],
    completion: ("", ""),
};

fn setup(display: bool) -> (DeviceContext, Board<Sim>, RecordingSink) {
    let mut config = DeviceConfig::default();
    config.credential.push_str("s3cret").unwrap();
    let mut ctx = DeviceContext::new(config);
    ctx.display_available = display;
    (
        ctx,
        sim_board(&[], |_| true, |_| false),
        RecordingSink::default(),
    )
}

#[test]
fn actions_run_in_order_with_their_pauses() {
    let (ctx, mut board, mut sink) = setup(true);
    let settle = u64::from(ctx.config.timing.phase_settle_ms);
    let tap = u64::from(ctx.config.timing.tap_ms);

    let summary = Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &MIXED)
        .unwrap();

    assert_eq!(
        board.keyboard.strokes,
        vec![
            (settle, Stroke::Key(Key::Enter)),
            (settle + tap, Stroke::Combo(Modifiers::CTRL, Key::Char('a'))),
            (settle + tap, Stroke::Text("abc".into())),
            (2 * settle + tap + 100, Stroke::Text("s3cret".into())),
        ]
    );
    let expected_ms = 2 * settle + tap + 100 + u64::from(ctx.config.timing.confirm_ms) + 250;
    assert_eq!(board.clock.now_ms(), expected_ms);
    assert_eq!(summary.elapsed_ms, expected_ms);
    assert_eq!(summary.phases, 2);
    assert!(board
        .display
        .screens
        .contains(&Screen::Lines("HELLO".into(), "world".into())));
}

#[test]
fn phase_events_are_one_based() {
    let (ctx, mut board, mut sink) = setup(true);
    Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &MIXED)
        .unwrap();

    assert_eq!(
        sink.events,
        vec![
            AppEvent::PhaseStarted {
                index: 1,
                total: 2,
                title: "FIRST",
            },
            AppEvent::PhaseStarted {
                index: 2,
                total: 2,
                title: "SECOND",
            },
        ]
    );
    assert_eq!(
        board.display.progress_headers(),
        vec![(1, 2, String::from("FIRST")), (2, 2, String::from("SECOND"))]
    );
}

#[test]
fn second_run_is_refused() {
    let (ctx, mut board, mut sink) = setup(true);
    let mut seq = Sequencer::new();
    seq.run(&ctx, &mut board, &mut sink, &MIXED).unwrap();
    let strokes = board.keyboard.strokes.len();

    assert_eq!(
        seq.run(&ctx, &mut board, &mut sink, &MIXED),
        Err(SequenceError::AlreadyCompleted)
    );
    assert_eq!(board.keyboard.strokes.len(), strokes);
    assert!(seq.is_completed());
}

#[test]
fn finished_run_points_past_last_phase() {
    let (ctx, mut board, mut sink) = setup(false);
    let mut seq = Sequencer::new();
    seq.run(&ctx, &mut board, &mut sink, &CREDENTIAL_RESET)
        .unwrap();

    let state = seq.state();
    assert!(state.completed);
    assert_eq!(state.phase_index, CREDENTIAL_RESET.total_phases());
}

#[test]
fn headless_run_still_types() {
    let (ctx, mut board, mut sink) = setup(false);
    Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &MIXED)
        .unwrap();

    assert!(board.display.screens.is_empty());
    assert_eq!(board.keyboard.strokes.len(), 4);
}

#[test]
fn countdown_ticks_each_second() {
    let (ctx, mut board, mut sink) = setup(true);
    Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &COUNTDOWN)
        .unwrap();

    let ticks: Vec<u32> = board
        .display
        .screens
        .iter()
        .filter_map(|s| match s {
            Screen::Countdown { seconds, .. } => Some(*seconds),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![3, 2, 1]);
    assert_eq!(
        board.clock.now_ms(),
        u64::from(ctx.config.timing.phase_settle_ms) + 3_000
    );
    assert!(board.keyboard.strokes.is_empty());
}

#[test]
fn spam_rate_follows_interval() {
    let (ctx, mut board, mut sink) = setup(true);
    Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &SPAM)
        .unwrap();

    // 100 ms interval minus 50 ms key hold leaves a 50 ms gap.
    assert_eq!(board.keyboard.count(Key::F(2)), 20);
}

#[test]
fn spam_with_slower_interval() {
    let mut config = DeviceConfig::default();
    config.timing.spam_interval_ms = 200;
    let ctx = DeviceContext::new(config);
    let mut board = sim_board(&[], |_| true, |_| false);
    let mut sink = RecordingSink::default();

    Sequencer::new()
        .run(&ctx, &mut board, &mut sink, &SPAM)
        .unwrap();

    // 150 ms gaps: presses at 0, 150, ..., 900 relative to the start.
    assert_eq!(board.keyboard.count(Key::F(2)), 7);
}
