//! Tests for the bring-up sequence
//!
//! Runs `init` against the register emulator and checks the state the
//! chip and the driver are left in.

mod common;

use ad9361_driver::error::SetupStep;
use ad9361_driver::{regs, Channel, ClockId, EnsmState, Error, ErrorDetail, ErrorKind, InitParams};
use common::{device, ready_device};

// ============================================================================
// Successful Bring-up
// ============================================================================

#[test]
fn init_defaults_reaches_fdd() {
    let (mut dev, chip) = device(InitParams::default());
    assert!(!dev.is_ready());

    dev.init().unwrap();

    assert!(dev.is_ready());
    assert_eq!(dev.ensm_state(), EnsmState::Fdd);
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Fdd);
    assert_eq!(chip.reg(regs::ENSM_MODE) & regs::FDD_MODE, regs::FDD_MODE);
}

#[test]
fn init_tunes_both_lo() {
    let (mut dev, _chip) = ready_device(InitParams::default());
    assert!(dev.get_rx_lo_freq().unwrap().abs_diff(2_400_000_000) <= 1);
    assert!(dev.get_tx_lo_freq().unwrap().abs_diff(2_400_000_000) <= 1);
}

#[test]
fn init_applies_default_clock_chain() {
    let (mut dev, _chip) = ready_device(InitParams::default());
    assert_eq!(dev.get_sample_rate().unwrap(), 30_720_000);
    assert_eq!(dev.get_rate(ClockId::RxSampl).unwrap(), 30_720_000);
    assert_eq!(dev.get_rate(ClockId::Adc).unwrap(), 245_760_000);
    assert_eq!(dev.rf_bandwidth(), (18_000_000, 18_000_000));
}

#[test]
fn init_tdd_parks_in_alert() {
    let params = InitParams {
        frequency_division_duplex_mode: false,
        ..InitParams::default()
    };
    let (mut dev, chip) = ready_device(params);

    assert_eq!(dev.ensm_state(), EnsmState::Alert);
    assert_eq!(dev.read_ensm_state().unwrap(), EnsmState::Alert);
    assert_eq!(chip.reg(regs::ENSM_MODE) & regs::FDD_MODE, 0);
    assert_ne!(chip.reg(regs::ENSM_CONFIG_2) & regs::TXNRX_SPI_CTRL, 0);
}

#[test]
fn init_honours_requested_final_state() {
    let params = InitParams {
        ensm_state_after_init: Some(EnsmState::Alert),
        ..InitParams::default()
    };
    let (dev, _chip) = ready_device(params);
    assert_eq!(dev.ensm_state(), EnsmState::Alert);
}

#[test]
fn init_writes_tx_attenuation() {
    let params = InitParams {
        tx_attenuation_mdb: 10_000,
        ..InitParams::default()
    };
    let (mut dev, _chip) = ready_device(params);
    assert_eq!(dev.get_tx_attenuation(Channel::One).unwrap(), 10_000);
    assert_eq!(dev.get_tx_attenuation(Channel::Two).unwrap(), 10_000);
}

// ============================================================================
// Aborted Bring-up
// ============================================================================

#[test]
fn wrong_product_id_writes_nothing() {
    let (mut dev, chip) = device(InitParams::default());
    chip.set_reg(regs::PRODUCT_ID, 0x12);

    let err = dev.init().unwrap_err();

    assert!(matches!(err, Error::DeviceNotFound { product_id: 0x12 }));
    assert_eq!(chip.write_count(), 0);
    assert!(!dev.is_ready());
}

#[test]
fn unlocked_synthesizer_aborts_lo_setup() {
    let (mut dev, chip) = device(InitParams::default());
    chip.unlock_vco(true);

    let err = dev.init().unwrap_err();

    assert!(matches!(
        err,
        Error::SetupAborted {
            step: SetupStep::LoSetup,
            kind: ErrorKind::CalibrationTimeout,
            ..
        }
    ));
    // the RX synthesizer lock bit is named in the error
    assert_eq!(
        err.detail(),
        ErrorDetail::CalibrationTimeout {
            reg: regs::RX_CP_OVERRANGE_VCO_LOCK,
            mask: regs::VCO_LOCK
        }
    );
    assert!(!dev.is_ready());
}

#[test]
fn stuck_dc_calibration_aborts_setup() {
    let (mut dev, chip) = device(InitParams::default());
    chip.stick_calibration(regs::BBDC_CAL);

    let err = dev.init().unwrap_err();

    assert!(matches!(
        err,
        Error::SetupAborted {
            step: SetupStep::DcOffsetCal,
            kind: ErrorKind::CalibrationTimeout,
            ..
        }
    ));
    assert_eq!(
        err.detail(),
        ErrorDetail::CalibrationTimeout {
            reg: regs::CALIBRATION_CTRL,
            mask: regs::BBDC_CAL
        }
    );
    assert!(err.to_string().contains("DcOffsetCal"));
    // nothing after the failing step ran
    assert!(chip.writes_to(regs::RSSI_DELAY).is_empty());
}

#[test]
fn init_can_be_repeated() {
    let (mut dev, chip) = ready_device(InitParams::default());
    dev.init().unwrap();
    assert!(dev.is_ready());
    assert!(chip.write_count() > 0);
}

// ============================================================================
// TX Attenuation
// ============================================================================

#[test]
fn attenuation_above_limit_rejected_without_writes() {
    let (mut dev, chip) = ready_device(InitParams::default());

    let err = dev.set_tx_attenuation(89_751, true, true, true).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(chip.write_count(), 0);
}

#[test]
fn attenuation_per_channel() {
    let (mut dev, _chip) = ready_device(InitParams::default());
    dev.set_tx_attenuation(89_750, true, false, false).unwrap();
    dev.set_tx_attenuation(250, false, true, false).unwrap();

    assert_eq!(dev.get_tx_attenuation(Channel::One).unwrap(), 89_750);
    assert_eq!(dev.get_tx_attenuation(Channel::Two).unwrap(), 250);
}

#[test]
fn attenuation_rounds_down_to_quarter_db() {
    let (mut dev, _chip) = ready_device(InitParams::default());
    dev.set_tx_attenuation(1_100, true, true, true).unwrap();
    assert_eq!(dev.get_tx_attenuation(Channel::One).unwrap(), 1_000);
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn register_dump_is_ascending() {
    let (mut dev, chip) = device(InitParams::default());
    chip.set_reg(0x100, 0x11);
    chip.set_reg(0x101, 0x22);
    chip.set_reg(0x102, 0x33);

    let mut buf = [0u8; 3];
    dev.read_registers(0x100, &mut buf).unwrap();

    assert_eq!(buf, [0x11, 0x22, 0x33]);
    assert_eq!(chip.write_count(), 0);
}
