//! Tests for the calibration engine
//!
//! Bounded polling, the TX quadrature phase search and digital interface
//! tuning, all against the register emulator.

mod common;

use ad9361_driver::error::Calibration;
use ad9361_driver::params::DigTuneSkip;
use ad9361_driver::{regs, DataPathMonitor, Direction, Error, ErrorKind, InitParams};
use common::{ready_device, Chip};
use std::ops::RangeInclusive;

// ============================================================================
// Calibration Runner
// ============================================================================

#[test]
fn calibration_done_on_first_poll() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.run_calibration(regs::BBDC_CAL).unwrap();

    assert_eq!(chip.writes_to(regs::CALIBRATION_CTRL), vec![regs::BBDC_CAL]);
    assert_eq!(chip.read_count(regs::CALIBRATION_CTRL), 1);
    assert!(chip.sleeps_ns().is_empty());
}

#[test]
fn calibration_timeout_is_bounded() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.stick_calibration(regs::RFDC_CAL);

    let err = dev.run_calibration(regs::RFDC_CAL).unwrap_err();

    assert!(matches!(
        err,
        Error::CalibrationTimeout {
            reg: regs::CALIBRATION_CTRL,
            mask: regs::RFDC_CAL
        }
    ));
    assert_eq!(chip.read_count(regs::CALIBRATION_CTRL), 5_000);
    let sleeps = chip.sleeps_ns();
    assert_eq!(sleeps.len(), 5_000);
    assert!(sleeps.iter().all(|&ns| ns == 1_200_000));
}

#[test]
fn stuck_bit_outside_mask_is_ignored() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.stick_calibration(regs::TXMON_CAL);
    dev.run_calibration(regs::BBDC_CAL | regs::RFDC_CAL).unwrap();
}

#[test]
fn tracking_control_sets_loops() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.tracking_control(true, false, true).unwrap();

    let dc = chip.reg(regs::DC_OFFSET_CONFIG2);
    assert_ne!(dc & regs::ENABLE_BB_DC_OFFSET_TRACKING, 0);
    assert_eq!(dc & regs::ENABLE_RF_OFFSET_TRACKING, 0);
    assert_ne!(chip.reg(regs::CALIBRATION_CONFIG_1) & regs::ENABLE_TRACKING_MODE_CH1, 0);
    assert_eq!(chip.reg(regs::CALIBRATION_CONFIG_1) & regs::ENABLE_TRACKING_MODE_CH2, 0);
}

// ============================================================================
// TX Quadrature
// ============================================================================

#[test]
fn quad_converges_at_start_phase() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.tx_quad_calib(Some(0x07)).unwrap();

    assert_eq!(chip.quad_phases(), vec![0x07]);
}

#[test]
fn quad_searches_for_widest_window() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.quad_converges(|phase| (10..=14).contains(&phase) || phase == 20);

    dev.tx_quad_calib(Some(0)).unwrap();

    let phases = chip.quad_phases();
    assert_eq!(phases[0], 0);
    // full sweep, then the final run at the chosen phase
    let sweep = &phases[phases.len() - 33..phases.len() - 1];
    assert!(sweep.iter().copied().eq(0..32));
    assert_eq!(*phases.last().unwrap(), 12);
}

#[test]
fn quad_window_may_wrap_through_zero() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.quad_converges(|phase| phase >= 30 || phase <= 2);

    dev.tx_quad_calib(Some(16)).unwrap();

    assert_eq!(*chip.quad_phases().last().unwrap(), 0);
}

#[test]
fn quad_retries_last_good_phase() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.quad_converges(|phase| phase == 5);
    dev.tx_quad_calib(Some(5)).unwrap();
    chip.clear_log();

    dev.tx_quad_calib(Some(9)).unwrap();

    assert_eq!(chip.quad_phases(), vec![9, 5]);
}

#[test]
fn quad_without_any_convergence_fails() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.quad_converges(|_| false);

    let err = dev.tx_quad_calib(Some(3)).unwrap_err();

    assert!(matches!(err, Error::ConvergenceFailure(Calibration::TxQuadPhase)));
    // the widened bandwidth is put back
    assert_eq!(dev.rf_bandwidth(), (18_000_000, 18_000_000));
}

#[test]
fn failed_widen_restores_rx_filter() {
    let (mut dev, chip) = ready_device(InitParams::default());
    // narrow enough that the calibration tone needs wider filters
    dev.set_rf_bandwidth(4_000_000, 4_000_000).unwrap();
    let rx_filter = [regs::RX_BBF_TUNE_DIVIDE, regs::RX_BBBW_MHZ, regs::RX_BBBW_KHZ];
    let before = rx_filter.map(|reg| chip.reg(reg));
    chip.clear_log();
    chip.stick_calibration(regs::TX_BB_TUNE_CAL);

    let err = dev.tx_quad_calib(Some(7)).unwrap_err();

    // the widen failure is reported, not the one from the restore
    assert!(matches!(
        err,
        Error::CalibrationTimeout {
            reg: regs::CALIBRATION_CTRL,
            mask: regs::TX_BB_TUNE_CAL
        }
    ));
    assert!(chip.quad_phases().is_empty());
    // RX widened, then tuned back
    assert_eq!(chip.writes_to(regs::RX_BBF_TUNE_DIVIDE).len(), 2);
    assert_eq!(rx_filter.map(|reg| chip.reg(reg)), before);
    assert_eq!(dev.rf_bandwidth().0, 4_000_000);
}

#[test]
fn tx_lo_move_triggers_recalibration() {
    let (mut dev, chip) = ready_device(InitParams::default());

    dev.set_tx_lo_freq(2_450_000_000).unwrap();
    assert!(chip.quad_phases().is_empty());

    dev.set_tx_lo_freq(2_600_000_000).unwrap();
    assert!(!chip.quad_phases().is_empty());
    assert_eq!(dev.read_ensm_state().unwrap(), ad9361_driver::EnsmState::Fdd);
}

// ============================================================================
// Digital Interface Tuning
// ============================================================================

/// Pattern checker that passes while the clock delay sits in a window
/// and the chip is sourcing the pattern for the direction under test
struct WindowMonitor {
    chip: Chip,
    window: RangeInclusive<u8>,
    checks: usize,
    active: Option<Direction>,
}

impl WindowMonitor {
    fn new(chip: &Chip, window: RangeInclusive<u8>) -> Self {
        Self {
            chip: chip.clone(),
            window,
            checks: 0,
            active: None,
        }
    }
}

impl DataPathMonitor for WindowMonitor {
    fn enable_test_pattern(&mut self, dir: Direction, enable: bool) {
        self.active = enable.then_some(dir);
    }

    fn reset_status(&mut self) {}

    fn pattern_ok(&mut self) -> bool {
        self.checks += 1;
        let (delay_reg, sourced) = match self.active {
            Some(Direction::Rx) => (
                regs::RX_CLOCK_DATA_DELAY,
                self.chip.reg(regs::BIST_CONFIG) & regs::BIST_ENABLE != 0,
            ),
            Some(Direction::Tx) => (
                regs::TX_CLOCK_DATA_DELAY,
                self.chip.reg(regs::OBSERVE_CONFIG) & regs::DATA_PORT_LOOP_TEST_ENABLE != 0,
            ),
            None => return false,
        };
        let delay = self.chip.reg(delay_reg);
        sourced && delay & regs::DATA_DELAY == 0 && self.window.contains(&(delay >> 4))
    }
}

#[test]
fn dig_tune_centers_clock_window() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut monitor = WindowMonitor::new(&chip, 3..=9);

    dev.dig_tune(&mut monitor, DigTuneSkip::Tx).unwrap();

    // two rates, two axes, sixteen taps each
    assert_eq!(monitor.checks, 64);
    assert_eq!(chip.reg(regs::RX_CLOCK_DATA_DELAY), 6 << 4);
    assert_eq!(dev.get_sample_rate().unwrap(), 30_720_000);
}

#[test]
fn dig_tune_rx_uses_chip_prbs() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut monitor = WindowMonitor::new(&chip, 3..=9);

    dev.dig_tune(&mut monitor, DigTuneSkip::Tx).unwrap();

    // PRBS injected at the RX port, then switched off
    assert_eq!(chip.writes_to(regs::BIST_CONFIG), vec![(2 << 2) | regs::BIST_ENABLE, 0]);
    assert_eq!(chip.reg(regs::OBSERVE_CONFIG) & regs::DATA_PORT_LOOP_TEST_ENABLE, 0);
}

#[test]
fn dig_tune_tx_uses_chip_loopback() {
    let (mut dev, chip) = ready_device(InitParams::default());
    chip.set_reg(regs::OBSERVE_CONFIG, 0x40);
    let mut monitor = WindowMonitor::new(&chip, 4..=12);

    dev.dig_tune(&mut monitor, DigTuneSkip::None).unwrap();

    assert_eq!(monitor.checks, 128);
    assert_eq!(chip.reg(regs::TX_CLOCK_DATA_DELAY), 8 << 4);
    let observe = chip.writes_to(regs::OBSERVE_CONFIG);
    assert!(observe.contains(&(0x40 | regs::DATA_PORT_LOOP_TEST_ENABLE)));
    // loopback released, unrelated bits kept
    assert_eq!(chip.reg(regs::OBSERVE_CONFIG), 0x40);
    assert_eq!(chip.reg(regs::BIST_CONFIG), 0);
}

#[test]
fn dig_tune_without_passing_delay_fails() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut monitor = WindowMonitor::new(&chip, 16..=16);

    let err = dev.dig_tune(&mut monitor, DigTuneSkip::None).unwrap_err();

    assert!(matches!(err, Error::ConvergenceFailure(Calibration::DigitalRx)));
    assert_eq!(dev.get_sample_rate().unwrap(), 30_720_000);
    // the chip test source was armed for the sweep and cleared on failure
    assert_ne!(chip.writes_to(regs::BIST_CONFIG)[0] & regs::BIST_ENABLE, 0);
    assert_eq!(chip.reg(regs::BIST_CONFIG), 0);
    assert_eq!(chip.reg(regs::OBSERVE_CONFIG), 0);
}

#[test]
fn dig_tune_skip_all_touches_nothing() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut monitor = WindowMonitor::new(&chip, 0..=15);

    dev.dig_tune(&mut monitor, DigTuneSkip::All).unwrap();

    assert_eq!(monitor.checks, 0);
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn post_setup_reports_tuning_failure() {
    let (mut dev, chip) = ready_device(InitParams::default());
    let mut monitor = WindowMonitor::new(&chip, 16..=16);

    let err = dev.post_setup(&mut monitor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SetupAborted);
}
