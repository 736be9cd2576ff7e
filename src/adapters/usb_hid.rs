//! USB HID keyboard adapter.
//!
//! Implements [`OutputChannel`] by sending 8-byte boot-keyboard reports
//! through TinyUSB on the ESP32-S3's native USB port.
//!
//! ```text
//!  Key ──▶ usage_for() ──▶ (modifier byte, usage id) ──▶ report ──▶ release report
//! ```
//!
//! The usage mapping is pure and host-tested.  Only report transmission is
//! `#[cfg(target_os = "espidf")]`; on the host (and in demo mode on the
//! device) each keystroke is logged instead of sent.

use log::{debug, info, warn};

use crate::app::ports::{Key, Modifiers, OutputChannel};

// ---------------------------------------------------------------------------
// HID usage table (keyboard page 0x07, US layout)
// ---------------------------------------------------------------------------

pub const USAGE_A: u8 = 0x04;
pub const USAGE_1: u8 = 0x1E;
pub const USAGE_0: u8 = 0x27;
pub const USAGE_ENTER: u8 = 0x28;
pub const USAGE_ESCAPE: u8 = 0x29;
pub const USAGE_BACKSPACE: u8 = 0x2A;
pub const USAGE_TAB: u8 = 0x2B;
pub const USAGE_SPACE: u8 = 0x2C;
pub const USAGE_F1: u8 = 0x3A;
pub const USAGE_DELETE: u8 = 0x4C;
pub const USAGE_RIGHT: u8 = 0x4F;
pub const USAGE_LEFT: u8 = 0x50;
pub const USAGE_DOWN: u8 = 0x51;
pub const USAGE_UP: u8 = 0x52;

/// Map a printable ASCII character to `(needs shift, usage)`.
fn ascii_usage(c: char) -> Option<(bool, u8)> {
    let usage = match c {
        'a'..='z' => return Some((false, USAGE_A + (c as u8 - b'a'))),
        'A'..='Z' => return Some((true, USAGE_A + (c as u8 - b'A'))),
        '1'..='9' => return Some((false, USAGE_1 + (c as u8 - b'1'))),
        '0' => (false, USAGE_0),
        ' ' => (false, USAGE_SPACE),
        '!' => (true, USAGE_1),
        '@' => (true, USAGE_1 + 1),
        '#' => (true, USAGE_1 + 2),
        '$' => (true, USAGE_1 + 3),
        '%' => (true, USAGE_1 + 4),
        '^' => (true, USAGE_1 + 5),
        '&' => (true, USAGE_1 + 6),
        '*' => (true, USAGE_1 + 7),
        '(' => (true, USAGE_1 + 8),
        ')' => (true, USAGE_0),
        '-' => (false, 0x2D),
        '_' => (true, 0x2D),
        '=' => (false, 0x2E),
        '+' => (true, 0x2E),
        '[' => (false, 0x2F),
        '{' => (true, 0x2F),
        ']' => (false, 0x30),
        '}' => (true, 0x30),
        '\\' => (false, 0x31),
        '|' => (true, 0x31),
        ';' => (false, 0x33),
        ':' => (true, 0x33),
        '\'' => (false, 0x34),
        '"' => (true, 0x34),
        '`' => (false, 0x35),
        '~' => (true, 0x35),
        ',' => (false, 0x36),
        '<' => (true, 0x36),
        '.' => (false, 0x37),
        '>' => (true, 0x37),
        '/' => (false, 0x38),
        '?' => (true, 0x38),
        _ => return None,
    };
    Some(usage)
}

/// Modifier byte and usage for one key, or `None` if the key has no
/// boot-keyboard representation.
pub fn usage_for(key: Key) -> Option<(Modifiers, u8)> {
    let plain = |u| Some((Modifiers::NONE, u));
    match key {
        Key::Enter => plain(USAGE_ENTER),
        Key::Tab => plain(USAGE_TAB),
        Key::Space => plain(USAGE_SPACE),
        Key::Escape => plain(USAGE_ESCAPE),
        Key::Backspace => plain(USAGE_BACKSPACE),
        Key::Delete => plain(USAGE_DELETE),
        Key::Up => plain(USAGE_UP),
        Key::Down => plain(USAGE_DOWN),
        Key::Left => plain(USAGE_LEFT),
        Key::Right => plain(USAGE_RIGHT),
        Key::F(n @ 1..=12) => plain(USAGE_F1 + (n - 1)),
        Key::F(_) => None,
        Key::Char(c) => ascii_usage(c).map(|(shift, u)| {
            let m = if shift { Modifiers::SHIFT } else { Modifiers::NONE };
            (m, u)
        }),
    }
}

/// Boot-protocol input report: modifiers, reserved, six key slots.
pub fn report(modifiers: Modifiers, usage: u8) -> [u8; 8] {
    [modifiers.bits(), 0, usage, 0, 0, 0, 0, 0]
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct HidKeyboard {
    demo_mode: bool,
    key_hold_ms: u32,
    /// Keystrokes sent (or logged in demo mode).
    sent: u32,
}

impl HidKeyboard {
    /// Install the USB stack (unless `demo_mode`).  Fails only if TinyUSB
    /// refuses to install; the caller halts with `KeyboardInit`.
    pub fn new(demo_mode: bool, key_hold_ms: u32) -> crate::error::Result<Self> {
        if demo_mode {
            info!("HID: demo mode, keystrokes are logged only");
        } else {
            hw::install()?;
            info!("HID: TinyUSB keyboard installed");
        }
        Ok(Self {
            demo_mode,
            key_hold_ms,
            sent: 0,
        })
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    fn stroke(&mut self, modifiers: Modifiers, usage: u8, what: &dyn core::fmt::Debug) {
        self.sent += 1;
        if self.demo_mode {
            info!("[DEMO] key {:?} (mod {:#04x} usage {:#04x})", what, modifiers.bits(), usage);
            return;
        }
        debug!("HID: {:?}", what);
        hw::send(&report(modifiers, usage));
        hw::hold(self.key_hold_ms);
        hw::send(&[0; 8]);
        hw::hold(self.key_hold_ms);
    }
}

impl OutputChannel for HidKeyboard {
    fn press_key(&mut self, key: Key) {
        match usage_for(key) {
            Some((mods, usage)) => self.stroke(mods, usage, &key),
            None => warn!("HID: no usage for {:?}, skipped", key),
        }
    }

    fn press_combo(&mut self, modifiers: Modifiers, key: Key) {
        match usage_for(key) {
            Some((mods, usage)) => self.stroke(modifiers | mods, usage, &(modifiers, key)),
            None => warn!("HID: no usage for {:?}, skipped", key),
        }
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press_key(Key::Char(c));
        }
    }
}

// ---------------------------------------------------------------------------
// TinyUSB glue
// ---------------------------------------------------------------------------

#[cfg(target_os = "espidf")]
mod hw {
    use core::ffi::{c_char, c_int, c_void};

    use esp_idf_svc::sys::{ESP_OK, esp_err_t};

    use crate::error::{Error, Result};

    /// `tinyusb_config_t` from esp_tinyusb 1.4 (full-speed targets).
    #[repr(C)]
    struct TinyUsbConfig {
        device_descriptor: *const c_void,
        string_descriptor: *const *const c_char,
        string_descriptor_count: c_int,
        external_phy: bool,
        configuration_descriptor: *const u8,
        self_powered: bool,
        vbus_monitor_io: c_int,
    }

    unsafe extern "C" {
        fn tinyusb_driver_install(config: *const TinyUsbConfig) -> esp_err_t;
        fn tud_mounted() -> bool;
        fn tud_hid_n_ready(instance: u8) -> bool;
        fn tud_hid_n_report(instance: u8, report_id: u8, report: *const c_void, len: u16) -> bool;
    }

    const REPORT_DESCRIPTOR_LEN: usize = 63;

    /// Standard boot keyboard report descriptor (no report ID).
    static REPORT_DESCRIPTOR: [u8; REPORT_DESCRIPTOR_LEN] = [
        0x05, 0x01, 0x09, 0x06, 0xA1, 0x01, // Generic Desktop, Keyboard, Collection
        0x05, 0x07, 0x19, 0xE0, 0x29, 0xE7, // modifiers E0..E7
        0x15, 0x00, 0x25, 0x01, 0x75, 0x01, 0x95, 0x08, 0x81, 0x02, //
        0x95, 0x01, 0x75, 0x08, 0x81, 0x01, // reserved byte
        0x95, 0x05, 0x75, 0x01, 0x05, 0x08, 0x19, 0x01, 0x29, 0x05, 0x91, 0x02, // LEDs
        0x95, 0x01, 0x75, 0x03, 0x91, 0x01, // LED padding
        0x95, 0x06, 0x75, 0x08, 0x15, 0x00, 0x25, 0x65, 0x05, 0x07, 0x19, 0x00, 0x29, 0x65, 0x81,
        0x00, // six key slots
        0xC0,
    ];

    const CONFIG_TOTAL_LEN: u16 = 9 + 9 + 9 + 7;

    static CONFIG_DESCRIPTOR: [u8; CONFIG_TOTAL_LEN as usize] = [
        // configuration
        0x09, 0x02, CONFIG_TOTAL_LEN as u8, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32,
        // interface: HID, boot subclass, keyboard protocol
        0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x01, 0x01, 0x00,
        // HID 1.11, one report descriptor
        0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, REPORT_DESCRIPTOR_LEN as u8, 0x00,
        // endpoint 1 IN, interrupt, 16 bytes, 10 ms
        0x07, 0x05, 0x81, 0x03, 0x10, 0x00, 0x0A,
    ];

    /// Polls while waiting for the host to accept a report.
    const READY_POLLS: u32 = 50;

    pub fn install() -> Result<()> {
        let cfg = TinyUsbConfig {
            device_descriptor: core::ptr::null(),
            string_descriptor: core::ptr::null(),
            string_descriptor_count: 0,
            external_phy: false,
            configuration_descriptor: CONFIG_DESCRIPTOR.as_ptr(),
            self_powered: false,
            vbus_monitor_io: 0,
        };
        let ret = unsafe { tinyusb_driver_install(&cfg) };
        if ret == ESP_OK {
            Ok(())
        } else {
            log::error!("HID: tinyusb_driver_install failed ({})", ret);
            Err(Error::Init("tinyusb driver install"))
        }
    }

    pub fn send(report: &[u8; 8]) {
        for _ in 0..READY_POLLS {
            if unsafe { tud_mounted() && tud_hid_n_ready(0) } {
                let ok = unsafe { tud_hid_n_report(0, 0, report.as_ptr().cast(), 8) };
                if !ok {
                    log::warn!("HID: report rejected");
                }
                return;
            }
            hold(1);
        }
        log::warn!("HID: host not ready, report dropped");
    }

    pub fn hold(ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    // ── TinyUSB HID class callbacks ──────────────────────────

    #[unsafe(no_mangle)]
    extern "C" fn tud_hid_descriptor_report_cb(_instance: u8) -> *const u8 {
        REPORT_DESCRIPTOR.as_ptr()
    }

    #[unsafe(no_mangle)]
    extern "C" fn tud_hid_get_report_cb(
        _instance: u8,
        _report_id: u8,
        _report_type: c_int,
        _buffer: *mut u8,
        _reqlen: u16,
    ) -> u16 {
        0
    }

    #[unsafe(no_mangle)]
    extern "C" fn tud_hid_set_report_cb(
        _instance: u8,
        _report_id: u8,
        _report_type: c_int,
        _buffer: *const u8,
        _bufsize: u16,
    ) {
        // Host LED state (caps lock etc.) is ignored.
    }
}

#[cfg(not(target_os = "espidf"))]
mod hw {
    use crate::error::Result;

    pub fn install() -> Result<()> {
        log::info!("HID(sim): no USB stack on host");
        Ok(())
    }

    pub fn send(report: &[u8; 8]) {
        log::trace!("HID(sim): report {:02X?}", report);
    }

    pub fn hold(_ms: u32) {}
}
