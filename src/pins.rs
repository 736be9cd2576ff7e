//! GPIO / peripheral pin assignments for the KeyRunner board (ESP32-S3).
//!
//! Single source of truth: `main.rs` builds every pin driver from these
//! numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Safety interlock (jumper wires to GND, internal pull-ups)
// ---------------------------------------------------------------------------

/// Primary wire.  LOW = in place (locked), HIGH = removed (armed).
/// Touching the free wire end back to GND is the adjustment input.
pub const PRIMARY_INTERLOCK_GPIO: i32 = 7;
/// Mode-select wire.  LOW = mode A (credential reset), HIGH = mode B
/// (disk re-provisioning).
pub const MODE_SELECT_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// I²C bus (16x2 LCD backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// Standard-mode clock; the PCF8574 tops out at 100 kHz.
pub const I2C_FREQ_HZ: u32 = 100_000;

// USB D-/D+ are fixed to GPIO 19/20 by the S3's native USB PHY.
