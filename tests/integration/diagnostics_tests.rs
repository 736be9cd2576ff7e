//! Power-on self-checks against the simulated bus and interlock.

use keyrunner::app::ports::Clock;
use keyrunner::config::DeviceConfig;
use keyrunner::diagnostics::{
    SCAN_END, SCAN_FIRST, STABILITY_SAMPLES, STABILITY_SPACING_MS, check_stability,
    run_diagnostics, scan_bus,
};
use keyrunner::error::OutcomeCode;

use crate::mock_hw::{DISPLAY_ADDR, sim_board};

fn diagnose(present: &[u8], primary: impl FnMut(u64) -> bool + 'static) -> OutcomeCode {
    let mut b = sim_board(present, primary, |_| false);
    run_diagnostics(&mut b.bus, &mut b.gate, &mut b.clock, &DeviceConfig::default())
}

#[test]
fn healthy_board_passes() {
    assert_eq!(diagnose(&[DISPLAY_ADDR], |_| false), OutcomeCode::None);
}

#[test]
fn empty_bus_is_wiring_fault() {
    assert_eq!(diagnose(&[], |_| false), OutcomeCode::NoDevicesOnBus);
}

#[test]
fn display_at_fallback_address_is_misconfiguration() {
    let fallback = DeviceConfig::default().fallback_display_address;
    assert_eq!(
        diagnose(&[fallback], |_| false),
        OutcomeCode::WrongDisplayAddress
    );
}

#[test]
fn unrelated_device_only_means_display_missing() {
    assert_eq!(diagnose(&[0x50, 0x68], |_| false), OutcomeCode::DisplayMissing);
}

#[test]
fn custom_display_address_is_honoured() {
    let mut b = sim_board(&[0x27], |_| false, |_| false);
    let config = DeviceConfig {
        display_address: 0x27,
        fallback_display_address: 0x3F,
        ..DeviceConfig::default()
    };
    assert_eq!(
        run_diagnostics(&mut b.bus, &mut b.gate, &mut b.clock, &config),
        OutcomeCode::None
    );
}

#[test]
fn scan_probes_every_seven_bit_address_once() {
    let mut b = sim_board(&[DISPLAY_ADDR, 0x50], |_| false, |_| false);
    let scan = scan_bus(&mut b.bus, &DeviceConfig::default());
    assert_eq!(scan.responders, 2);
    assert!(scan.display_found);
    assert_eq!(b.bus.probes, u32::from(SCAN_END - SCAN_FIRST));
}

#[test]
fn alternating_input_is_floating() {
    assert_eq!(
        diagnose(&[DISPLAY_ADDR], |t| (t / 5) % 2 == 1),
        OutcomeCode::SignalFloating
    );
}

#[test]
fn wire_removed_at_boot_is_stable() {
    assert_eq!(diagnose(&[DISPLAY_ADDR], |_| true), OutcomeCode::None);
}

#[test]
fn single_glitch_is_tolerated() {
    // One HIGH sample out of ten stays under the floating threshold.
    assert_eq!(diagnose(&[DISPLAY_ADDR], |t| t == 20), OutcomeCode::None);
}

#[test]
fn stability_check_takes_ten_spaced_samples() {
    let mut b = sim_board(&[], |_| false, |_| false);
    assert_eq!(check_stability(&mut b.gate, &mut b.clock), OutcomeCode::None);
    assert_eq!(
        b.clock.now_ms(),
        u64::from((STABILITY_SAMPLES - 1) * STABILITY_SPACING_MS)
    );
}
