//! Tests for synthesizer fast-lock profiles

mod common;

use ad9361_driver::{regs, Direction, ErrorKind, InitParams};
use common::ready_device;

const TX: u16 = regs::TX_SYNTH_OFFSET;

// ============================================================================
// Prepare / Unprepare
// ============================================================================

#[test]
fn prepare_selects_profile_and_stops_vco_cal() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.fastlock_prepare(Direction::Rx, 3).unwrap();

    assert_eq!(dev.fastlock_active(Direction::Rx), Some(3));
    assert_eq!(dev.fastlock_active(Direction::Tx), None);
    let setup = chip.reg(regs::RX_FAST_LOCK_SETUP);
    assert_eq!(setup & regs::FAST_LOCK_PROFILE, 3 << 5);
    assert_ne!(setup & regs::FAST_LOCK_MODE_ENABLE, 0);
    assert_eq!(chip.reg(regs::RX_VCO_CAL) & regs::VCO_CAL_EN, 0);
    assert_ne!(chip.reg(regs::ENSM_CONFIG_2) & regs::RX_SYNTH_READY_MASK, 0);
}

#[test]
fn prepare_twice_writes_once() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.fastlock_prepare(Direction::Tx, 1).unwrap();
    let first = chip.write_count();
    dev.fastlock_prepare(Direction::Tx, 1).unwrap();

    assert!(first > 0);
    assert_eq!(chip.write_count(), first);
}

#[test]
fn prepare_delay_in_quarter_microseconds() {
    let params = InitParams {
        tx_fastlock_delay_ns: 2_000,
        ..InitParams::default()
    };
    let (mut dev, chip) = ready_device(params);

    dev.fastlock_prepare(Direction::Tx, 0).unwrap();

    assert_eq!(chip.reg(regs::RX_FAST_LOCK_SETUP_INIT_DELAY + TX), 8);
}

#[test]
fn unprepare_when_idle_writes_nothing() {
    let (mut dev, chip) = ready_device(InitParams::default());
    dev.fastlock_unprepare(Direction::Rx).unwrap();
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn unprepare_restores_vco_cal() {
    let (mut dev, chip) = ready_device(InitParams::default());
    dev.fastlock_prepare(Direction::Rx, 2).unwrap();

    dev.fastlock_unprepare(Direction::Rx).unwrap();

    assert_eq!(dev.fastlock_active(Direction::Rx), None);
    assert_eq!(chip.reg(regs::RX_FAST_LOCK_SETUP), 0);
    assert_ne!(chip.reg(regs::RX_VCO_CAL) & regs::VCO_CAL_EN, 0);
    assert_eq!(chip.reg(regs::ENSM_CONFIG_2) & regs::RX_SYNTH_READY_MASK, 0);
    // forced ALC and VCO tune pulsed, then released
    assert_eq!(chip.reg(regs::RX_FORCE_ALC) & regs::FORCE_ALC_ENABLE, 0);
    assert_eq!(chip.writes_to(regs::RX_FORCE_ALC).len(), 2);
}

#[test]
fn lo_change_releases_profile() {
    let (mut dev, _chip) = ready_device(InitParams::default());
    dev.fastlock_prepare(Direction::Rx, 4).unwrap();
    dev.fastlock_prepare(Direction::Tx, 4).unwrap();

    dev.set_rx_lo_freq(2_410_000_000).unwrap();
    dev.set_tx_lo_freq(2_410_000_000).unwrap();

    assert_eq!(dev.fastlock_active(Direction::Rx), None);
    assert_eq!(dev.fastlock_active(Direction::Tx), None);
}

// ============================================================================
// Store / Recall
// ============================================================================

#[test]
fn store_captures_synth_registers() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let integer = chip.reg(regs::RX_INTEGER_BYTE_0);

    dev.fastlock_store(Direction::Rx, 2).unwrap();

    let ram = chip.fastlock_ram(0);
    assert_eq!(ram[0x20], integer);
    let saved = dev.fastlock_save(Direction::Rx, 2).unwrap();
    assert_eq!(saved[..], ram[0x20..0x30]);
}

#[test]
fn load_then_save_round_trips_through_ram() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut words = [0u8; 16];
    for (i, w) in words.iter_mut().enumerate() {
        *w = 0xA0 | i as u8;
    }

    dev.fastlock_load(Direction::Tx, 7, &words).unwrap();

    assert_eq!(dev.fastlock_save(Direction::Tx, 7).unwrap(), words);
    // the RX bank is untouched
    assert!(chip.fastlock_ram(0).iter().all(|&b| b == 0));
    assert_eq!(chip.reg(regs::RX_FAST_LOCK_PROGRAM_CTRL + TX), 0);
}

#[test]
fn recall_prepares_then_switches() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.fastlock_recall(Direction::Rx, 1).unwrap();
    assert_eq!(dev.fastlock_active(Direction::Rx), Some(1));

    dev.fastlock_recall(Direction::Rx, 6).unwrap();
    assert_eq!(dev.fastlock_active(Direction::Rx), Some(6));
    assert_eq!(chip.reg(regs::RX_FAST_LOCK_SETUP) & regs::FAST_LOCK_PROFILE, 6 << 5);

    chip.clear_log();
    dev.fastlock_recall(Direction::Rx, 6).unwrap();
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn profile_out_of_range_rejected() {
    let (mut dev, chip) = ready_device(InitParams::default());

    for result in [
        dev.fastlock_prepare(Direction::Rx, 8).map(drop),
        dev.fastlock_store(Direction::Rx, 8).map(drop),
        dev.fastlock_recall(Direction::Tx, 9).map(drop),
        dev.fastlock_save(Direction::Tx, 255).map(drop),
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
    }
    assert_eq!(chip.write_count(), 0);
}
