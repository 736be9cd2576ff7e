//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / Sequencer (domain)
//! ```
//!
//! Driven adapters (keyboard, display, clock, event sinks) implement these
//! traits.  Digital inputs and the status LED use the `embedded-hal` 1.0
//! pin traits directly; the I2C bus is reached through [`BusProbe`], which
//! every `embedded_hal::i2c::I2c` implementation gets for free.
//!
//! ## Ordering
//!
//! The keyboard and display are stateful (modifier latches, cursor
//! position).  The domain calls them from a single thread in strict program
//! order, so no port needs interior locking.

use core::ops::BitOr;

// ───────────────────────────────────────────────────────────────
// Keys
// ───────────────────────────────────────────────────────────────

/// A single key the output channel can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Tab,
    Space,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    /// Function key `F1`..=`F12`.
    F(u8),
    /// Printable ASCII character (US layout).
    Char(char),
}

/// Modifier set for combos.  Bit layout matches the HID modifier byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const CTRL: Self = Self(0b0000_0001);
    pub const SHIFT: Self = Self(0b0000_0010);
    pub const ALT: Self = Self(0b0000_0100);
    pub const GUI: Self = Self(0b0000_1000);

    /// Raw modifier byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Output channel port (driven adapter: domain → target machine)
// ───────────────────────────────────────────────────────────────

/// Keystroke emitter.  Each call is atomic from the caller's point of view:
/// the keystroke has been delivered (pressed *and* released) on return.
pub trait OutputChannel {
    /// Press and release a single key.
    fn press_key(&mut self, key: Key);

    /// Hold `modifiers`, press and release `key`, release everything.
    fn press_combo(&mut self, modifiers: Modifiers, key: Key);

    /// Type each character of `text` in order.
    fn type_text(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Display channel port (driven adapter: domain → operator)
// ───────────────────────────────────────────────────────────────

/// Two-line status display.  Best-effort: implementations swallow bus
/// errors, and the domain skips every call while the display is flagged
/// unavailable in the [`DeviceContext`](super::context::DeviceContext).
pub trait DisplayChannel {
    /// Bring the display into a known state (called once it is detected).
    fn init(&mut self);

    /// Clear and show two lines.
    fn show_two_lines(&mut self, top: &str, bottom: &str);

    /// `TITLE [step/total]` on top, message below.
    fn show_progress(&mut self, step: usize, total: usize, title: &str, message: &str);

    /// `title` on top, `prefix` and a right-aligned seconds counter below.
    fn show_countdown(&mut self, title: &str, prefix: &str, seconds: u32);

    /// Switch the backlight (used for visual alerts).
    fn set_backlight(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ time)
// ───────────────────────────────────────────────────────────────

/// Monotonic time plus blocking sleep.  Every wait in the firmware goes
/// through this port so tests can advance time deterministically.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the control thread for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Bus probe port (driven adapter: domain → I2C)
// ───────────────────────────────────────────────────────────────

/// Address-presence check on a shared bus.
pub trait BusProbe {
    /// True when a device acknowledges `address`.
    fn probe(&mut self, address: u8) -> bool;
}

/// A zero-length write is acknowledged by any device present at the
/// address, and touches no register.
impl<T: embedded_hal::i2c::I2c> BusProbe for T {
    fn probe(&mut self, address: u8) -> bool {
        self.write(address, &[]).is_ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
