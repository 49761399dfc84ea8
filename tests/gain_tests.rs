//! Tests for receive gain control and RSSI setup

mod common;

use ad9361_driver::error::SetupStep;
use ad9361_driver::params::RssiControl;
use ad9361_driver::{regs, Channel, Error, ErrorDetail, ErrorKind, GainControlMode, InitParams};
use common::{device, ready_device};

fn rssi_in_samples() -> InitParams {
    InitParams {
        rssi_ctrl: RssiControl {
            restart_mode: 1,
            unit_is_rx_samples: true,
            delay: 80,
            wait: 16,
            duration: 30_720,
        },
        ..InitParams::default()
    }
}

// ============================================================================
// Gain Control Mode
// ============================================================================

#[test]
fn default_modes_are_slow_attack() {
    let (dev, chip) = ready_device(InitParams::default());
    assert_eq!(dev.rx_gain_control_mode(Channel::One), GainControlMode::SlowAttack);
    assert_eq!(dev.rx_gain_control_mode(Channel::Two), GainControlMode::SlowAttack);
    assert_eq!(chip.reg(regs::AGC_CONFIG_1) & 0x1F, 0x02 | 0x08);
}

#[test]
fn switching_one_channel_keeps_the_other() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.set_rx_gain_control_mode(Channel::Two, GainControlMode::FastAttack).unwrap();

    assert_eq!(dev.rx_gain_control_mode(Channel::Two), GainControlMode::FastAttack);
    assert_eq!(chip.reg(regs::AGC_CONFIG_1) & 0x1F, 0x02 | 0x04);
    // timing rewritten for the fast AGC power measurement
    assert!(!chip.writes_to(regs::GAIN_UPDATE_COUNTER1).is_empty());
    assert!(!chip.writes_to(regs::DEC_POWER_MEASURE_DURATION_0).is_empty());
}

#[test]
fn hybrid_mode_sets_hybrid_bit() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.set_rx_gain_control_mode(Channel::One, GainControlMode::Hybrid).unwrap();

    assert_ne!(chip.reg(regs::AGC_CONFIG_1) & regs::SLOW_ATTACK_HYBRID_MODE, 0);

    dev.set_rx_gain_control_mode(Channel::One, GainControlMode::Manual).unwrap();
    assert_eq!(chip.reg(regs::AGC_CONFIG_1) & regs::SLOW_ATTACK_HYBRID_MODE, 0);
}

#[test]
fn gain_update_needs_clocks() {
    let (mut dev, chip) = device(InitParams::default());

    let err = dev.gain_update().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn update_counter_written_little_endian() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.gain_update().unwrap();

    let low = chip.reg(regs::GAIN_UPDATE_COUNTER1);
    let high = chip.reg(regs::GAIN_UPDATE_COUNTER2);
    let counter = u16::from_le_bytes([low, high]);
    assert!(counter > 0);
    assert_eq!(chip.reg(regs::DIGITAL_SAT_COUNTER) & regs::DOUBLE_GAIN_COUNTER, 0);
}

// ============================================================================
// RSSI
// ============================================================================

#[test]
fn rssi_plan_in_samples() {
    let (_dev, chip) = ready_device(rssi_in_samples());

    assert_eq!(chip.reg(regs::MEASURE_DURATION_01), 14 | (13 << 4));
    assert_eq!(chip.reg(regs::MEASURE_DURATION_23), 12 | (11 << 4));
    assert_eq!(chip.reg(regs::RSSI_WEIGHT_0), 136);
    assert_eq!(chip.reg(regs::RSSI_WEIGHT_3), 17);
    assert_eq!(chip.reg(regs::RSSI_DELAY), 10);
    assert_eq!(chip.reg(regs::RSSI_WAIT_TIME), 2);
    assert_eq!(chip.reg(regs::RSSI_CONFIG) & regs::RSSI_MODE_SELECT, 1 << 2);
    assert_ne!(chip.reg(regs::RSSI_CONFIG) & regs::DEFAULT_RSSI_MEAS_MODE, 0);
}

#[test]
fn rssi_in_samples_ignores_clock_changes() {
    let (mut dev, chip) = ready_device(rssi_in_samples());

    dev.set_sample_rate(15_360_000).unwrap();

    assert!(chip.writes_to(regs::MEASURE_DURATION_01).is_empty());
}

#[test]
fn rssi_in_microseconds_follows_clock_changes() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.set_sample_rate(15_360_000).unwrap();

    assert!(!chip.writes_to(regs::MEASURE_DURATION_01).is_empty());
}

#[test]
fn rssi_bad_restart_mode_rejected_before_writes() {
    let mut params = InitParams::default();
    params.rssi_ctrl.restart_mode = 8;
    let (mut dev, chip) = device(params);

    let err = dev.rssi_setup(false).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { value: 8, .. }));
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn rssi_delay_must_fit_a_byte() {
    let mut params = rssi_in_samples();
    params.rssi_ctrl.delay = 8 * 256;
    let (mut dev, chip) = device(params);

    let err = dev.rssi_setup(false).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn init_reports_rssi_step() {
    let mut params = InitParams::default();
    params.rssi_ctrl.duration = 0;
    let (mut dev, _chip) = device(params);

    let err = dev.init().unwrap_err();

    assert!(matches!(
        err,
        Error::SetupAborted {
            step: SetupStep::Rssi,
            kind: ErrorKind::InvalidArgument,
            detail: ErrorDetail::InvalidArgument { value: 0, .. }
        }
    ));
}
