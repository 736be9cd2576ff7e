//! The two built-in scripts, one per armed [`OperatingMode`].

use crate::app::ports::Key;
use crate::safety::OperatingMode;

use super::script::{Action, Pause, Phase, Script, SweepPlan};

const SPAM_MS: u32 = 10_000;
const ADJUST_INITIAL_MS: u32 = 10_000;
const ADJUST_TOUCH_MS: u32 = 5_000;

pub const PARTITION_SWEEP: SweepPlan = SweepPlan {
    passes: 4,
    positions: 8,
    home_presses: 10,
};

// ---------------------------------------------------------------------------
// Mode A: firmware setup, admin credential reset
// ---------------------------------------------------------------------------

pub static CREDENTIAL_RESET: Script = Script {
    name: "credential-reset",
    mode: OperatingMode::CredentialReset,
    phases: &[
        Phase {
            title: "ENTER BIOS",
            detail: "Spamming F2...",
            actions: &[Action::Spam {
                key: Key::F(2),
                duration_ms: SPAM_MS,
            }],
        },
        Phase {
            title: "BIOS LOAD",
            detail: "Waiting...",
            actions: &[Action::Countdown {
                prefix: "Waiting...",
                seconds: 5,
            }],
        },
        Phase {
            title: "NAVIGATE",
            detail: "Down 5...",
            actions: &[
                Action::Repeat {
                    key: Key::Down,
                    times: 5,
                    pause: Pause::Tap,
                },
                Action::Wait(300),
            ],
        },
        Phase {
            title: "ADJUST",
            detail: "Touch to adjust",
            actions: &[
                Action::Adjust {
                    initial_ms: ADJUST_INITIAL_MS,
                    touch_ms: ADJUST_TOUCH_MS,
                    key: Key::Down,
                },
                Action::Wait(500),
            ],
        },
        Phase {
            title: "BIOS NAV",
            detail: "Selecting...",
            actions: &[
                Action::Key(Key::Enter, Pause::Hold),
                Action::Key(Key::Down, Pause::Tap),
                Action::Key(Key::Tab, Pause::Tap),
                Action::Key(Key::Enter, Pause::Hold),
            ],
        },
        Phase {
            title: "OLD PASS",
            detail: "Typing...",
            actions: &[
                Action::Credential(Pause::Ms(200)),
                Action::Key(Key::Tab, Pause::Tap),
                Action::Key(Key::Enter, Pause::Hold),
            ],
        },
        Phase {
            title: "CONFIRM",
            detail: "Password...",
            actions: &[
                Action::Key(Key::Tab, Pause::Tap),
                Action::Credential(Pause::Ms(200)),
                Action::Repeat {
                    key: Key::Tab,
                    times: 3,
                    pause: Pause::Tap,
                },
                Action::Key(Key::Enter, Pause::Hold),
            ],
        },
        Phase {
            title: "SAVING",
            detail: "Confirming...",
            actions: &[
                Action::Repeat {
                    key: Key::Tab,
                    times: 2,
                    pause: Pause::Tap,
                },
                Action::Key(Key::Enter, Pause::Hold),
            ],
        },
    ],
    completion: ("COMPLETE!", "Password removed"),
};

// ---------------------------------------------------------------------------
// Mode B: boot installer, wipe partitions, start install
// ---------------------------------------------------------------------------

pub static DISK_REPROVISION: Script = Script {
    name: "disk-reprovision",
    mode: OperatingMode::DiskReprovision,
    phases: &[
        Phase {
            title: "BOOT KEY",
            detail: "Spamming F12...",
            actions: &[Action::Spam {
                key: Key::F(12),
                duration_ms: SPAM_MS,
            }],
        },
        Phase {
            title: "BOOT SEL",
            detail: "Down 1...",
            actions: &[Action::Key(Key::Down, Pause::Tap)],
        },
        Phase {
            title: "USB ADJ",
            detail: "Touch to adjust",
            actions: &[
                Action::Adjust {
                    initial_ms: ADJUST_INITIAL_MS,
                    touch_ms: ADJUST_TOUCH_MS,
                    key: Key::Down,
                },
                Action::Wait(500),
            ],
        },
        Phase {
            title: "BOOT SEL",
            detail: "Selecting...",
            actions: &[Action::Key(Key::Enter, Pause::None)],
        },
        Phase {
            title: "LOADING",
            detail: "Win Setup...",
            actions: &[Action::Countdown {
                prefix: "Win Setup",
                seconds: 30,
            }],
        },
        Phase {
            title: "SETUP",
            detail: "Tab 3...",
            actions: &[Action::Repeat {
                key: Key::Tab,
                times: 3,
                pause: Pause::Ms(200),
            }],
        },
        Phase {
            title: "SETUP",
            detail: "Enter 2...",
            actions: &[
                Action::Key(Key::Enter, Pause::Tap),
                Action::Key(Key::Enter, Pause::None),
            ],
        },
        Phase {
            title: "SETUP",
            detail: "Waiting...",
            actions: &[Action::Countdown {
                prefix: "Waiting...",
                seconds: 30,
            }],
        },
        Phase {
            title: "LICENSE",
            detail: "Accepting...",
            actions: &[
                Action::Key(Key::Space, Pause::Tap),
                Action::Key(Key::Enter, Pause::Tap),
                Action::Key(Key::Down, Pause::Tap),
                Action::Key(Key::Enter, Pause::Ms(2000)),
            ],
        },
        Phase {
            title: "WIPING",
            detail: "Smart delete...",
            actions: &[Action::Wait(2000), Action::Sweep(PARTITION_SWEEP)],
        },
        Phase {
            title: "FINALIZE",
            detail: "Starting...",
            actions: &[
                Action::Repeat {
                    key: Key::Up,
                    times: 10,
                    pause: Pause::Ms(80),
                },
                Action::Key(Key::Down, Pause::Tap),
                Action::Repeat {
                    key: Key::Tab,
                    times: 6,
                    pause: Pause::Ms(120),
                },
                Action::Key(Key::Enter, Pause::Ms(800)),
                Action::Key(Key::Enter, Pause::Hold),
            ],
        },
    ],
    completion: ("DONE!", "Install started"),
};

/// Script for an armed mode.  `Locked` has none.
pub fn for_mode(mode: OperatingMode) -> Option<&'static Script> {
    match mode {
        OperatingMode::Locked => None,
        OperatingMode::CredentialReset => Some(&CREDENTIAL_RESET),
        OperatingMode::DiskReprovision => Some(&DISK_REPROVISION),
    }
}
