//! Calibration engine
//!
//! Every calibration is started through the calibration control register
//! and finishes when the chip clears the start bit. The recipes live in
//! the submodules; this module holds the shared runner and the tracking
//! loop control.

pub mod dc_offset;
pub mod dig_tune;
pub mod filter;
pub mod search;
pub mod synth;
pub mod txquad;

pub use dig_tune::{DataPathMonitor, InterfaceDelay};
pub use search::{find_opt, Run};

use embedded_hal::delay::DelayNs;

use crate::device::{Ad9361, TrackingState};
use crate::error::Result;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Start the calibrations in `mask` and wait for the chip to clear
    /// them.
    ///
    /// Polls at most 5 000 times, 1.2 ms apart. A timeout leaves the
    /// preceding writes in place.
    pub fn run_calibration(&mut self, mask: u8) -> Result<(), T::Error> {
        trace!("calibration start {:#x}", mask);
        self.bus.write(regs::CALIBRATION_CTRL, mask)?;
        self.bus.poll_field(regs::CALIBRATION_CTRL, mask, 0)
    }

    /// Enable or disable the baseband DC, RF DC and RX quadrature
    /// tracking loops.
    pub fn tracking_control(&mut self, bbdc: bool, rfdc: bool, quad: bool) -> Result<(), T::Error> {
        let p = &self.params;
        let update_events = p.dc_offset_tracking_update_event_mask;
        let slow_quad = p.qec_tracking_slow_mode_enable;
        let two_channels = p.two_rx_two_tx_mode;

        self.bus.write(regs::CALIBRATION_CONFIG_2, regs::CALIBRATION_CONFIG2_DFLT)?;
        self.bus.write(
            regs::CALIBRATION_CONFIG_3,
            regs::PREVENT_POS_LOOP_GAIN | field_prep(15, regs::K_EXP_AMPLITUDE),
        )?;

        let mut dc = regs::USE_WAIT_COUNTER_FOR_RF_DC_INIT_CAL | field_prep(update_events, regs::DC_OFFSET_UPDATE);
        if bbdc {
            dc |= regs::ENABLE_BB_DC_OFFSET_TRACKING;
        }
        if rfdc {
            dc |= regs::ENABLE_RF_OFFSET_TRACKING;
        }
        self.bus.write(regs::DC_OFFSET_CONFIG2, dc)?;

        let mut qec = regs::ENABLE_PHASE_CORR | regs::ENABLE_GAIN_CORR | regs::FREE_RUN_MODE;
        if slow_quad {
            qec |= regs::ENABLE_CORR_WORD_DECIMATION;
        }
        if quad {
            qec |= regs::ENABLE_TRACKING_MODE_CH1;
            if two_channels {
                qec |= regs::ENABLE_TRACKING_MODE_CH2;
            }
        }
        self.bus.write(regs::CALIBRATION_CONFIG_1, qec)?;

        self.tracking = TrackingState { bbdc, rfdc, quad };
        debug!("tracking: bbdc {} rfdc {} quad {}", bbdc, rfdc, quad);
        Ok(())
    }

    /// Calibrate the TX monitor path. Only meaningful in TDD operation,
    /// where the monitor shares the RX chain.
    pub fn txmon_calibration(&mut self) -> Result<(), T::Error> {
        self.run_calibration(regs::TXMON_CAL)?;
        info!("tx monitor calibrated");
        Ok(())
    }
}
