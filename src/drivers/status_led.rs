//! Single-colour status LED driver.
//!
//! Wraps any `embedded-hal` output pin.  Pin errors are swallowed: the LED
//! is an indicator, and a stuck indicator must never stop a run.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: a `PinDriver<Output>` on the onboard LED GPIO.
//! On host/test: any mock pin implementing `OutputPin`.

use embedded_hal::digital::OutputPin;

use crate::app::ports::Clock;

pub struct StatusLed<L> {
    pin: L,
    lit: bool,
}

impl<L: OutputPin> StatusLed<L> {
    pub fn new(mut pin: L) -> Self {
        let _ = pin.set_low();
        Self { pin, lit: false }
    }

    pub fn on(&mut self) {
        let _ = self.pin.set_high();
        self.lit = true;
    }

    pub fn off(&mut self) {
        let _ = self.pin.set_low();
        self.lit = false;
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// The wrapped pin.
    pub fn pin(&self) -> &L {
        &self.pin
    }

    /// `times` on/off cycles of `on_ms` / `off_ms`, blocking on `clock`.
    pub fn flash<C: Clock>(&mut self, clock: &mut C, times: u32, on_ms: u32, off_ms: u32) {
        for _ in 0..times {
            self.on();
            clock.sleep_ms(on_ms);
            self.off();
            clock.sleep_ms(off_ms);
        }
    }
}
