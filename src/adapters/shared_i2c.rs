//! Shared I2C bus handle.
//!
//! The ESP32 has one I2C peripheral wired to the display backpack.  The
//! self-check probes every address on it, and the LCD driver writes to it
//! for the rest of the run.  Both run on the single control thread, so a
//! `RefCell` is enough: each transaction borrows the bus for its own
//! duration only.

use core::cell::RefCell;

use embedded_hal::i2c::{ErrorType, I2c, Operation};

/// Copyable handle to a bus that lives for the whole program.
pub struct SharedI2c<B: 'static> {
    bus: &'static RefCell<B>,
}

impl<B: 'static> SharedI2c<B> {
    pub fn new(bus: &'static RefCell<B>) -> Self {
        Self { bus }
    }
}

impl<B: 'static> Clone for SharedI2c<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: 'static> Copy for SharedI2c<B> {}

impl<B: ErrorType + 'static> ErrorType for SharedI2c<B> {
    type Error = B::Error;
}

impl<B: I2c + 'static> I2c for SharedI2c<B> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.bus.borrow_mut().transaction(address, operations)
    }
}
