//! 16x2 character LCD driver (HD44780 behind a PCF8574 I2C backpack).
//!
//! The backpack maps its eight outputs onto the LCD in 4-bit mode:
//!
//! | PCF8574 | P7..P4 | P3        | P2 | P1 | P0 |
//! |---------|--------|-----------|----|----|----|
//! | LCD     | D7..D4 | backlight | EN | RW | RS |
//!
//! Every byte is sent as two nibbles, each latched by pulsing EN.
//!
//! Line formatting (fitting, progress header, countdown) is pure and
//! host-tested; the driver itself is generic over any `embedded-hal` I2C
//! bus and delay.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::warn;

use crate::app::ports::DisplayChannel;

pub const COLS: usize = 16;
pub type Line = heapless::String<COLS>;

const RS: u8 = 0b0000_0001;
const EN: u8 = 0b0000_0100;
const BACKLIGHT: u8 = 0b0000_1000;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

// ---------------------------------------------------------------------------
// Line formatting
// ---------------------------------------------------------------------------

/// Truncate `text` to the display width.  Non-ASCII characters are
/// replaced, since the HD44780 ROM has no UTF-8.
pub fn fit(text: &str) -> Line {
    let mut line = Line::new();
    for c in text.chars().take(COLS) {
        let _ = line.push(if c.is_ascii() { c } else { '?' });
    }
    line
}

/// `TITLE [step/total]`, shortening the title if the counter would not
/// fit.
pub fn progress_header(step: usize, total: usize, title: &str) -> Line {
    let mut suffix: heapless::String<12> = heapless::String::new();
    let _ = write!(suffix, " [{}/{}]", step, total);
    let room = COLS.saturating_sub(suffix.len());
    let mut line = Line::new();
    for c in title.chars().take(room) {
        let _ = line.push(c);
    }
    let _ = line.push_str(&suffix);
    line
}

/// `prefix` on the left, `NNs` right-aligned.
pub fn countdown_line(prefix: &str, seconds: u32) -> Line {
    let mut secs: heapless::String<12> = heapless::String::new();
    let _ = write!(secs, "{}s", seconds);
    let room = COLS.saturating_sub(secs.len() + 1);
    let mut line = Line::new();
    for c in prefix.chars().take(room) {
        let _ = line.push(c);
    }
    while line.len() + secs.len() < COLS {
        let _ = line.push(' ');
    }
    let _ = line.push_str(&secs);
    line
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Lcd<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    backlight: bool,
    bus_ok: bool,
}

impl<I: I2c, D: DelayNs> Lcd<I, D> {
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: true,
            bus_ok: true,
        }
    }

    fn flags(&self) -> u8 {
        if self.backlight { BACKLIGHT } else { 0 }
    }

    fn expander_write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.i2c.write(self.address, bytes) {
            if self.bus_ok {
                warn!("LCD: write to 0x{:02X} failed ({:?})", self.address, e.kind());
            }
            self.bus_ok = false;
        } else {
            self.bus_ok = true;
        }
    }

    /// Put one nibble on D7..D4 and latch it.
    fn write_nibble(&mut self, nibble: u8, mode: u8) {
        let data = (nibble << 4) | mode | self.flags();
        self.expander_write(&[data | EN, data]);
        self.delay.delay_us(50);
    }

    fn send(&mut self, byte: u8, mode: u8) {
        self.write_nibble(byte >> 4, mode);
        self.write_nibble(byte & 0x0F, mode);
    }

    fn command(&mut self, cmd: u8) {
        self.send(cmd, 0);
        if cmd == CMD_CLEAR {
            self.delay.delay_ms(2);
        }
    }

    fn set_cursor(&mut self, col: u8, row: usize) {
        let offset = ROW_OFFSETS[row.min(ROW_OFFSETS.len() - 1)];
        self.command(CMD_SET_DDRAM | (offset + col));
    }

    fn print(&mut self, text: &str) {
        for b in text.bytes() {
            self.send(b, RS);
        }
    }

    /// Overwrite a whole row, padding with spaces.
    fn write_row(&mut self, row: usize, text: &str) {
        self.set_cursor(0, row);
        let line = fit(text);
        self.print(&line);
        for _ in line.len()..COLS {
            self.send(b' ', RS);
        }
    }
}

impl<I: I2c, D: DelayNs> DisplayChannel for Lcd<I, D> {
    fn init(&mut self) {
        // Power-on reset sequence from the HD44780 datasheet: three
        // 8-bit function sets, then switch to 4-bit.
        self.delay.delay_ms(50);
        self.expander_write(&[self.flags()]);
        self.write_nibble(0x03, 0);
        self.delay.delay_us(4500);
        self.write_nibble(0x03, 0);
        self.delay.delay_us(4500);
        self.write_nibble(0x03, 0);
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0);

        self.command(CMD_FUNCTION_4BIT_2LINE);
        self.command(CMD_DISPLAY_ON);
        self.command(CMD_CLEAR);
        self.command(CMD_ENTRY_MODE);
    }

    fn show_two_lines(&mut self, top: &str, bottom: &str) {
        self.write_row(0, top);
        self.write_row(1, bottom);
    }

    fn show_progress(&mut self, step: usize, total: usize, title: &str, message: &str) {
        let header = progress_header(step, total, title);
        self.show_two_lines(&header, message);
    }

    fn show_countdown(&mut self, title: &str, prefix: &str, seconds: u32) {
        let line = countdown_line(prefix, seconds);
        self.show_two_lines(title, &line);
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
        let flags = self.flags();
        self.expander_write(&[flags]);
    }
}
