//! Outcome reporting and the terminal halt.
//!
//! An outcome is reported three ways: `error!` log lines, both display
//! lines, and an LED blink signature that needs no display at all.
//!
//! ## Blink signature
//!
//! ```text
//!  code 23:  ▇▇ ▇▇ ···· ▪ ▪ ▪ ········   (2 long, gap, 3 short, pause)
//!  code 10:  ▇▇ ···· ▪ ▪ ▪ ▪ ▪ ▪ ▪ ▪ ▪ ▪ ········
//!  code  3:  ▪ ▪ ▪ ········
//! ```
//!
//! Tens digit as long blinks, a gap, then the ones digit as short blinks
//! (a zero ones digit is sent as ten).  Single-digit codes skip the long
//! group.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::context::DeviceContext;
use crate::app::ports::{Clock, DisplayChannel};
use crate::drivers::status_led::StatusLed;
use crate::error::OutcomeCode;

pub const LONG_ON_MS: u32 = 400;
pub const LONG_OFF_MS: u32 = 200;
pub const SHORT_ON_MS: u32 = 150;
pub const SHORT_OFF_MS: u32 = 150;
pub const DIGIT_GAP_MS: u32 = 500;
pub const REPEAT_PAUSE_MS: u32 = 2000;

pub const HALT_FLASHES: u32 = 5;
pub const HALT_FLASH_MS: u32 = 200;

/// One element of a blink signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blink {
    Pulse { on_ms: u32, off_ms: u32 },
    Pause(u32),
}

/// Longest signature: 9 long, gap, 10 short, pause.
pub type BlinkPattern = heapless::Vec<Blink, 24>;

/// Build the signature for a blink count.
pub fn blink_pattern(blinks: u8) -> BlinkPattern {
    let mut out = BlinkPattern::new();
    let tens = blinks / 10;
    let ones = blinks % 10;

    if tens > 0 {
        for _ in 0..tens {
            let _ = out.push(Blink::Pulse {
                on_ms: LONG_ON_MS,
                off_ms: LONG_OFF_MS,
            });
        }
        let _ = out.push(Blink::Pause(DIGIT_GAP_MS));
    }

    let short = if ones == 0 { 10 } else { ones };
    for _ in 0..short {
        let _ = out.push(Blink::Pulse {
            on_ms: SHORT_ON_MS,
            off_ms: SHORT_OFF_MS,
        });
    }
    let _ = out.push(Blink::Pause(REPEAT_PAUSE_MS));
    out
}

/// Log the outcome and show it, if a display is present.
pub fn report<D: DisplayChannel>(ctx: &DeviceContext, display: &mut D, code: OutcomeCode) {
    let info = code.info();
    error!("==============================");
    error!("OUTCOME {}: {}", code.as_u8(), info.label);
    error!("  {}", info.detail);
    error!("==============================");
    ctx.show(display, |d| d.show_two_lines(info.label, info.detail));
}

/// Play the signature for `code` once.
pub fn blink_once<L: OutputPin, C: Clock>(led: &mut StatusLed<L>, clock: &mut C, code: OutcomeCode) {
    for step in blink_pattern(code.info().blinks) {
        match step {
            Blink::Pulse { on_ms, off_ms } => {
                led.on();
                clock.sleep_ms(on_ms);
                led.off();
                clock.sleep_ms(off_ms);
            }
            Blink::Pause(ms) => clock.sleep_ms(ms),
        }
    }
}

/// Report, then flash the backlight to draw attention.
pub fn enter_halt<D: DisplayChannel, C: Clock>(
    ctx: &DeviceContext,
    display: &mut D,
    clock: &mut C,
    code: OutcomeCode,
) {
    report(ctx, display, code);
    if ctx.display_available {
        for _ in 0..HALT_FLASHES {
            display.set_backlight(false);
            clock.sleep_ms(HALT_FLASH_MS);
            display.set_backlight(true);
            clock.sleep_ms(HALT_FLASH_MS);
        }
    }
}

/// Terminal halt.  Never returns; only a power cycle recovers.
pub fn halt_forever<D, L, C>(
    ctx: &DeviceContext,
    display: &mut D,
    led: &mut StatusLed<L>,
    clock: &mut C,
    code: OutcomeCode,
) -> !
where
    D: DisplayChannel,
    L: OutputPin,
    C: Clock,
{
    enter_halt(ctx, display, clock, code);
    loop {
        blink_once(led, clock, code);
    }
}
