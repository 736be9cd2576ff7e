//! KeyRunner Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HidKeyboard     Lcd (PCF8574)   SharedI2c     Esp32Clock      │
//! │  (OutputChannel) (DisplayChannel)(BusProbe)    (Clock + TWDT)  │
//! │  PinDriver ×3 (interlock wires, status LED)    LogEventSink    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Diagnostics · SafetyGate · Sequencer · Adjustment     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::cell::RefCell;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;

use keyrunner::adapters::EspPlatform;
use keyrunner::adapters::log_sink::LogEventSink;
use keyrunner::adapters::shared_i2c::SharedI2c;
use keyrunner::adapters::time::Esp32Clock;
use keyrunner::adapters::usb_hid::HidKeyboard;
use keyrunner::app::board::Board;
use keyrunner::app::context::DeviceContext;
use keyrunner::app::controller::Controller;
use keyrunner::app::ports::{BusProbe, DisplayChannel};
use keyrunner::config::DeviceConfig;
use keyrunner::drivers::lcd::Lcd;
use keyrunner::drivers::status_led::StatusLed;
use keyrunner::drivers::watchdog::Watchdog;
use keyrunner::error::OutcomeCode;
use keyrunner::pins;
use keyrunner::reporter;
use keyrunner::safety::SafetyGate;

/// Configuration from `KEYRUNNER_CONFIG` at build time, else defaults.
fn load_config() -> DeviceConfig {
    let json = option_env!("KEYRUNNER_CONFIG");
    match DeviceConfig::load(json) {
        Ok(cfg) => {
            if json.is_some() {
                info!("Config: build-time override loaded");
            }
            cfg
        }
        Err(e) => {
            warn!("Config: override rejected ({}), using defaults", e);
            DeviceConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  KeyRunner v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    if config.demo_mode {
        warn!("DEMO MODE: no keystrokes will be sent");
    }

    // ── 2. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number in `pins` is used exactly once, and none of
    // them is claimed through `peripherals.pins`.
    let (primary, mode_select, led_pin, sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::PRIMARY_INTERLOCK_GPIO),
            AnyIOPin::new(pins::MODE_SELECT_GPIO),
            AnyOutputPin::new(pins::STATUS_LED_GPIO),
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };

    let mut primary = PinDriver::input(primary)?;
    primary.set_pull(Pull::Up)?;
    let mut mode_select = PinDriver::input(mode_select)?;
    mode_select.set_pull(Pull::Up)?;
    let gate = SafetyGate::new(primary, mode_select);

    let led = PinDriver::output(led_pin)?;

    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?;
    let bus: &'static RefCell<I2cDriver<'static>> = Box::leak(Box::new(RefCell::new(i2c)));
    let bus = SharedI2c::new(bus);
    let display = Lcd::new(bus, FreeRtos, config.display_address);

    let mut clock = Esp32Clock::new(Watchdog::new(config.watchdog_timeout_ms));

    // ── 3. USB keyboard ───────────────────────────────────────
    let keyboard = match HidKeyboard::new(config.demo_mode, config.timing.key_hold_ms) {
        Ok(kb) => kb,
        Err(e) => {
            log::error!("USB HID init failed: {}", e);
            let mut ctx = DeviceContext::new(config);
            let mut display = display;
            let mut probe = bus;
            ctx.display_available = probe.probe(ctx.config.display_address);
            if ctx.display_available {
                display.init();
            }
            let mut led = StatusLed::new(led);
            reporter::halt_forever(&ctx, &mut display, &mut led, &mut clock, OutcomeCode::KeyboardInit);
        }
    };

    // ── 4. Controller loop ────────────────────────────────────
    let mut board: Board<EspPlatform> = Board::new(clock, keyboard, display, bus, led, gate);
    let mut controller = Controller::new(DeviceContext::new(config));
    let mut sink = LogEventSink::new();

    info!("Entering controller loop");
    loop {
        controller.step(&mut board, &mut sink);
    }
}
