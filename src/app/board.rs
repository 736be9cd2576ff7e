//! Hardware bundle handed to the controller.
//!
//! [`Platform`] names one concrete type per port so the domain can be
//! generic over a single parameter.  On the device this is
//! `adapters::EspPlatform`; integration tests provide a simulated one.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::drivers::status_led::StatusLed;
use crate::safety::SafetyGate;

use super::ports::{BusProbe, Clock, DisplayChannel, OutputChannel};

pub trait Platform {
    type Clock: Clock;
    type Keyboard: OutputChannel;
    type Display: DisplayChannel;
    type Bus: BusProbe;
    type Led: OutputPin;
    type Signal: InputPin;
}

/// Every peripheral the firmware touches, owned in one place.
pub struct Board<P: Platform> {
    pub clock: P::Clock,
    pub keyboard: P::Keyboard,
    pub display: P::Display,
    pub bus: P::Bus,
    pub led: StatusLed<P::Led>,
    pub gate: SafetyGate<P::Signal>,
}

impl<P: Platform> Board<P> {
    pub fn new(
        clock: P::Clock,
        keyboard: P::Keyboard,
        display: P::Display,
        bus: P::Bus,
        led: P::Led,
        gate: SafetyGate<P::Signal>,
    ) -> Self {
        Self {
            clock,
            keyboard,
            display,
            bus,
            led: StatusLed::new(led),
            gate,
        }
    }
}
