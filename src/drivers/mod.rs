//! Peripheral drivers: display, status LED and watchdog.

pub mod lcd;
pub mod status_led;
pub mod watchdog;
