//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements      | Connects to                  |
//! |--------------|-----------------|------------------------------|
//! | `log_sink`   | EventSink       | Serial log output            |
//! | `shared_i2c` | embedded-hal I2c| One I2C peripheral, shared   |
//! |              | BusProbe        | (blanket via I2c)            |
//! | `time`       | Clock           | ESP32 system timer + TWDT    |
//! | `usb_hid`    | OutputChannel   | TinyUSB boot keyboard        |
//!
//! The display adapter is [`crate::drivers::lcd::Lcd`], which implements
//! `DisplayChannel` directly.

pub mod log_sink;
pub mod shared_i2c;
pub mod time;
pub mod usb_hid;

/// The production board: ESP-IDF drivers behind every port.
#[cfg(target_os = "espidf")]
pub struct EspPlatform;

#[cfg(target_os = "espidf")]
impl crate::app::board::Platform for EspPlatform {
    type Clock = time::Esp32Clock;
    type Keyboard = usb_hid::HidKeyboard;
    type Display = crate::drivers::lcd::Lcd<
        shared_i2c::SharedI2c<esp_idf_hal::i2c::I2cDriver<'static>>,
        esp_idf_hal::delay::FreeRtos,
    >;
    type Bus = shared_i2c::SharedI2c<esp_idf_hal::i2c::I2cDriver<'static>>;
    type Led = esp_idf_hal::gpio::PinDriver<'static, esp_idf_hal::gpio::AnyOutputPin, esp_idf_hal::gpio::Output>;
    type Signal = esp_idf_hal::gpio::PinDriver<'static, esp_idf_hal::gpio::AnyIOPin, esp_idf_hal::gpio::Input>;
}
