//! Tests for the enable state machine
//!
//! Covers duplex rules, TDD turnarounds, sleep and the force/restore
//! pair used around calibrations.

mod common;

use ad9361_driver::ensm::EnsmRestore;
use ad9361_driver::{regs, EnsmState, Error, ErrorKind, GainControlMode, InitParams};
use common::ready_device;

fn tdd() -> InitParams {
    InitParams {
        frequency_division_duplex_mode: false,
        ..InitParams::default()
    }
}

// ============================================================================
// Duplex Rules
// ============================================================================

#[test]
fn same_state_writes_nothing() {
    let (mut dev, chip) = ready_device(InitParams::default());
    dev.set_ensm_state(EnsmState::Fdd).unwrap();
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn fdd_rejects_tdd_states() {
    let (mut dev, chip) = ready_device(InitParams::default());
    for target in [EnsmState::Rx, EnsmState::Tx] {
        let err = dev.set_ensm_state(target).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
    assert_eq!(chip.write_count(), 0);
    assert_eq!(dev.ensm_state(), EnsmState::Fdd);
}

#[test]
fn tdd_rejects_fdd_state() {
    let (mut dev, chip) = ready_device(tdd());
    let err = dev.set_ensm_state(EnsmState::Fdd).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn flush_states_are_not_targets() {
    let (mut dev, chip) = ready_device(InitParams::default());
    for target in [EnsmState::FddFlush, EnsmState::Invalid] {
        assert!(dev.set_ensm_state(target).is_err());
    }
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn fdd_to_alert_and_back() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.set_ensm_state(EnsmState::Alert).unwrap();
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Alert);

    dev.set_ensm_state(EnsmState::Fdd).unwrap();
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Fdd);
    let last = *chip.writes_to(regs::ENSM_CONFIG_1).last().unwrap();
    assert_eq!(last, regs::TO_ALERT | regs::LEVEL_MODE | regs::FORCE_TX_ON);
}

// ============================================================================
// TDD Turnarounds
// ============================================================================

#[test]
fn tdd_receive_from_alert() {
    let (mut dev, chip) = ready_device(tdd());

    dev.set_ensm_state(EnsmState::Rx).unwrap();

    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Rx);
    assert_eq!(chip.reg(regs::ENSM_CONFIG_2) & regs::TXNRX_SPI_CTRL, 0);
    // straight from ALERT: one ENSM write, no turnaround
    assert_eq!(chip.writes_to(regs::ENSM_CONFIG_1).len(), 1);
}

#[test]
fn tdd_turnaround_passes_through_alert() {
    let (mut dev, chip) = ready_device(tdd());
    dev.set_ensm_state(EnsmState::Rx).unwrap();
    chip.clear_log();

    dev.set_ensm_state(EnsmState::Tx).unwrap();

    let writes = chip.writes_to(regs::ENSM_CONFIG_1);
    assert_eq!(writes[0], regs::TO_ALERT | regs::FORCE_ALERT_STATE);
    assert_ne!(writes[1] & regs::FORCE_TX_ON, 0);
    assert!(chip.read_count(regs::STATE) >= 1);
    assert_ne!(chip.reg(regs::ENSM_CONFIG_2) & regs::TXNRX_SPI_CTRL, 0);
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Tx);
}

#[test]
fn tdd_turnaround_waits_for_synth_lock() {
    let (mut dev, chip) = ready_device(tdd());
    dev.set_ensm_state(EnsmState::Rx).unwrap();
    chip.unlock_vco(true);
    chip.clear_log();

    let err = dev.set_ensm_state(EnsmState::Tx).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CalibrationTimeout);
    assert_eq!(dev.ensm_state(), EnsmState::Rx);
}

#[test]
fn pulse_mode_drops_level_bit() {
    let params = InitParams {
        ensm_enable_pin_pulse_mode: true,
        ..tdd()
    };
    let (mut dev, chip) = ready_device(params);

    dev.set_ensm_state(EnsmState::Rx).unwrap();

    let last = *chip.writes_to(regs::ENSM_CONFIG_1).last().unwrap();
    assert_eq!(last, regs::TO_ALERT | regs::FORCE_RX_ON);
}

#[test]
fn manual_gain_receive_pulses_detector_reset() {
    let mut params = tdd();
    params.gain_ctrl.rx1_mode = GainControlMode::Manual;
    let (mut dev, chip) = ready_device(params);

    dev.set_ensm_state(EnsmState::Rx).unwrap();

    let thresh = chip.writes_to(regs::SMALL_LMT_OVERLOAD_THRESH);
    assert_eq!(thresh.len(), 2);
    assert_ne!(thresh[0] & regs::FORCE_PD_RESET_RX1, 0);
    assert_eq!(thresh[1] & regs::FORCE_PD_RESET_RX1, 0);
}

// ============================================================================
// Sleep
// ============================================================================

#[test]
fn sleep_and_wake() {
    let (mut dev, chip) = ready_device(tdd());

    dev.set_ensm_state(EnsmState::Sleep).unwrap();
    assert_eq!(dev.ensm_state(), EnsmState::Sleep);
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::SleepWait);
    assert_eq!(chip.reg(regs::RX_VCO_CAL) & regs::VCO_CAL_EN, 0);
    assert!(!chip.sleeps_ns().is_empty());

    dev.set_ensm_state(EnsmState::Alert).unwrap();
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Alert);
    assert_ne!(chip.reg(regs::RX_VCO_CAL) & regs::VCO_CAL_EN, 0);
    assert_ne!(chip.reg(regs::CLOCK_ENABLE) & regs::DIGITAL_POWER_UP, 0);
}

// ============================================================================
// Force and Restore
// ============================================================================

#[test]
fn force_to_current_state_writes_nothing() {
    let (mut dev, chip) = ready_device(InitParams::default());

    let token = dev.force_state(EnsmState::Fdd).unwrap();

    assert_eq!(token.previous(), EnsmState::Fdd);
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn force_alert_and_restore_fdd() {
    let (mut dev, _chip) = ready_device(InitParams::default());

    let token = dev.force_state(EnsmState::Alert).unwrap();
    assert_eq!(token.previous(), EnsmState::Fdd);
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Alert);
    // the configured state is untouched
    assert_eq!(dev.ensm_state(), EnsmState::Fdd);

    dev.restore_state(token).unwrap();
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Fdd);
}

#[test]
fn force_alert_suspends_tracking() {
    let params = InitParams {
        bb_dc_offset_tracking_enable: true,
        rf_dc_offset_tracking_enable: true,
        ..InitParams::default()
    };
    let (mut dev, chip) = ready_device(params);
    let tracking = regs::ENABLE_BB_DC_OFFSET_TRACKING | regs::ENABLE_RF_OFFSET_TRACKING;

    let token = dev.force_state(EnsmState::Alert).unwrap();
    assert_eq!(chip.reg(regs::DC_OFFSET_CONFIG2) & tracking, 0);

    dev.restore_state(token).unwrap();
    assert_eq!(chip.reg(regs::DC_OFFSET_CONFIG2) & tracking, tracking);
}

#[test]
fn empty_token_restores_nothing() {
    let (mut dev, chip) = ready_device(InitParams::default());
    dev.restore_state(EnsmRestore::none()).unwrap();
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn force_to_sleep_rejected() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let err = dev.force_state(EnsmState::Sleep).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(chip.writes_to(regs::ENSM_CONFIG_1).is_empty());
}
