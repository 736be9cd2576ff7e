//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the simulated board in `mock_hw`.  All tests run on the host with no
//! real hardware required.

mod adjustment_tests;
mod controller_tests;
mod diagnostics_tests;
mod sequencer_tests;
