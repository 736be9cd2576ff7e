//! Application core: pure domain logic, zero direct I/O.
//!
//! The controller state machine, its context and events live here.  All
//! interaction with hardware happens through the **port traits** defined
//! in [`ports`] and bundled by [`board::Board`], keeping this layer fully
//! testable without real peripherals.

pub mod board;
pub mod context;
pub mod controller;
pub mod events;
pub mod ports;
