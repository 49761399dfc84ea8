//! Enable State Machine control
//!
//! `set_ensm_state` moves the chip between operating states under the
//! duplex rules of the configuration. `force_state` and `restore_state`
//! park the chip temporarily (ALERT during calibrations) and hand back a
//! [`EnsmRestore`] token carrying everything needed to undo the force.

use embedded_hal::delay::DelayNs;

use crate::clock::ClockId;
use crate::config::{CLOCK_ENABLE_SETTLE_US, MIN_ADC_CLK};
use crate::device::{Ad9361, TrackingState};
use crate::error::{Error, Result};
use crate::regs;
use crate::transport::RegisterTransport;
use crate::types::{Direction, EnsmState, GainControlMode};

/// Restore token returned by [`Ad9361::force_state`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use = "pass the token to restore_state"]
pub struct EnsmRestore {
    prev: EnsmState,
    pd_reset: u8,
    tracking: Option<TrackingState>,
}

impl EnsmRestore {
    /// Token that restores nothing
    pub const fn none() -> Self {
        Self {
            prev: EnsmState::Invalid,
            pd_reset: 0,
            tracking: None,
        }
    }

    /// State the chip was in before the force
    #[must_use]
    pub const fn previous(&self) -> EnsmState {
        self.prev
    }
}

const FORCE_BITS: u8 = regs::FORCE_TX_ON | regs::FORCE_RX_ON | regs::FORCE_ALERT_STATE | regs::TO_ALERT;

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// ENSM state last set through the driver
    #[must_use]
    pub const fn ensm_state(&self) -> EnsmState {
        self.ensm
    }

    /// ENSM state reported by the chip
    pub fn read_ensm_state(&mut self) -> Result<EnsmState, T::Error> {
        let raw = self.bus.read_field(regs::STATE, regs::ENSM_STATE_MASK)?;
        Ok(EnsmState::from_reg(raw))
    }

    /// Move the ENSM to `target`.
    ///
    /// Requesting the current state writes nothing. RX or TX on an FDD
    /// configuration, and FDD on a TDD configuration, are rejected before
    /// any write.
    pub fn set_ensm_state(&mut self, target: EnsmState) -> Result<(), T::Error> {
        if self.ensm == target {
            debug!("ensm already in {:?}", target);
            return Ok(());
        }

        let fdd = self.params.frequency_division_duplex_mode;
        if (fdd && target.is_tdd_only()) || (!fdd && target.is_fdd_only()) {
            error!("ensm {:?} not allowed in {} mode", target, if fdd { "FDD" } else { "TDD" });
            return Err(Error::invalid("ENSM state", i64::from(target.as_reg())));
        }
        if matches!(target, EnsmState::Invalid | EnsmState::RxFlush | EnsmState::TxFlush | EnsmState::FddFlush) {
            return Err(Error::invalid("ENSM state", i64::from(target.as_reg())));
        }

        debug!("ensm {:?} -> {:?}", self.ensm, target);

        if self.ensm == EnsmState::Sleep {
            self.wake_from_sleep()?;
        }

        if target == EnsmState::Sleep {
            self.enter_sleep()?;
            self.ensm = target;
            return Ok(());
        }

        let mut val = regs::TO_ALERT;
        if !self.params.ensm_enable_pin_pulse_mode {
            val |= regs::LEVEL_MODE;
        }
        match target {
            EnsmState::Tx | EnsmState::Fdd => val |= regs::FORCE_TX_ON,
            EnsmState::Rx => val |= regs::FORCE_RX_ON,
            EnsmState::Alert => val |= regs::FORCE_ALERT_STATE,
            _ => {}
        }

        // TDD turnarounds pass through ALERT
        if matches!(target, EnsmState::Rx | EnsmState::Tx)
            && !matches!(self.ensm, EnsmState::Alert | EnsmState::Invalid)
        {
            self.bus.write(regs::ENSM_CONFIG_1, regs::TO_ALERT | regs::FORCE_ALERT_STATE)?;
            self.bus.poll_field(regs::STATE, regs::ENSM_STATE_MASK, EnsmState::Alert.as_reg())?;
        }

        if !fdd && !self.params.tdd_use_dual_synth_mode && matches!(target, EnsmState::Rx | EnsmState::Tx) {
            let tx = target == EnsmState::Tx;
            self.bus.write_flag(regs::ENSM_CONFIG_2, regs::TXNRX_SPI_CTRL, tx)?;
            let dir = if tx { Direction::Tx } else { Direction::Rx };
            self.bus.poll_field(regs::RX_CP_OVERRANGE_VCO_LOCK + dir.synth_offset(), regs::VCO_LOCK, 1)?;
        }

        self.bus.write(regs::ENSM_CONFIG_1, val)?;

        if val & regs::FORCE_RX_ON != 0 || target == EnsmState::Fdd {
            self.pulse_mgc_pd_reset()?;
        }

        self.ensm = target;
        Ok(())
    }

    fn wake_from_sleep(&mut self) -> Result<(), T::Error> {
        let mut clocks = regs::DIGITAL_POWER_UP | regs::CLOCK_ENABLE_DFLT | regs::BBPLL_ENABLE;
        if self.params.xo_disable_use_ext_refclk {
            clocks |= regs::XO_BYPASS;
        }
        self.bus.write(regs::CLOCK_ENABLE, clocks)?;
        self.bus.sleep_us(CLOCK_ENABLE_SETTLE_US);
        self.bus.write(regs::ENSM_CONFIG_1, regs::TO_ALERT | regs::FORCE_ALERT_STATE)?;
        self.vco_cal_control(Direction::Rx, true)?;
        self.vco_cal_control(Direction::Tx, true)
    }

    fn enter_sleep(&mut self) -> Result<(), T::Error> {
        self.vco_cal_control(Direction::Rx, false)?;
        self.vco_cal_control(Direction::Tx, false)?;
        self.bus.write(regs::ENSM_CONFIG_1, 0)?;
        let flush = if self.params.frequency_division_duplex_mode {
            regs::FORCE_TX_ON
        } else {
            regs::FORCE_RX_ON
        };
        self.bus.write(regs::ENSM_CONFIG_1, flush)?;

        // flush takes 384 ADC clock cycles
        let adc = self.clocks.rate(ClockId::Adc).max(MIN_ADC_CLK);
        self.bus.sleep_us(u32::try_from(384_000_000 / adc).unwrap_or(u32::MAX).max(1));

        self.bus.write(regs::ENSM_CONFIG_1, 0)?;
        self.bus.sleep_us(1);
        let clocks = if self.params.xo_disable_use_ext_refclk { regs::XO_BYPASS } else { 0 };
        self.bus.write(regs::CLOCK_ENABLE, clocks)
    }

    /// Enable or disable VCO calibration of one synthesizer.
    pub(crate) fn vco_cal_control(&mut self, dir: Direction, enable: bool) -> Result<(), T::Error> {
        self.bus
            .write_flag(regs::RX_VCO_CAL + dir.synth_offset(), regs::VCO_CAL_EN, enable)
    }

    fn mgc_pd_reset_bits(&self) -> u8 {
        let mut bits = 0;
        if self.gain_mode[0] == GainControlMode::Manual {
            bits |= regs::FORCE_PD_RESET_RX1;
        }
        if self.gain_mode[1] == GainControlMode::Manual {
            bits |= regs::FORCE_PD_RESET_RX2;
        }
        bits
    }

    /// Pulse the power-detector reset of manual-gain channels.
    fn pulse_mgc_pd_reset(&mut self) -> Result<(), T::Error> {
        let bits = self.mgc_pd_reset_bits();
        if bits == 0 {
            return Ok(());
        }
        let thresh = self.bus.read(regs::SMALL_LMT_OVERLOAD_THRESH)? & regs::SMALL_LMT_OVERLOAD_MASK;
        self.bus.write(regs::SMALL_LMT_OVERLOAD_THRESH, thresh | bits)?;
        self.bus.write(regs::SMALL_LMT_OVERLOAD_THRESH, thresh)
    }

    /// Force the chip into `target` without touching the configured state.
    ///
    /// Tracking loops are switched off while the chip is forced into ALERT.
    /// Manual-gain power-detector reset bits are saved so the restore can
    /// put them back.
    pub fn force_state(&mut self, target: EnsmState) -> Result<EnsmRestore, T::Error> {
        let current = self.read_ensm_state()?;
        let mut token = EnsmRestore {
            prev: current,
            pd_reset: 0,
            tracking: None,
        };

        if current == target {
            debug!("ensm already forced to {:?}", target);
            return Ok(token);
        }
        debug!("forcing ensm {:?} -> {:?}", current, target);

        if target == EnsmState::Alert {
            let tracking = self.tracking;
            if tracking != TrackingState::default() {
                self.tracking_control(false, false, false)?;
                token.tracking = Some(tracking);
            }
        }

        let thresh = self.bus.read(regs::SMALL_LMT_OVERLOAD_THRESH)?;
        token.pd_reset = thresh & (regs::FORCE_PD_RESET_RX1 | regs::FORCE_PD_RESET_RX2);

        let mut val = self.bus.read(regs::ENSM_CONFIG_1)? & !FORCE_BITS;
        match target {
            EnsmState::Tx => val |= regs::FORCE_TX_ON,
            EnsmState::Rx => val |= regs::FORCE_RX_ON,
            EnsmState::Fdd => val |= regs::FORCE_TX_ON | regs::FORCE_RX_ON,
            EnsmState::Alert => val |= regs::TO_ALERT | regs::FORCE_ALERT_STATE,
            _ => {
                error!("cannot force ensm to {:?}", target);
                return Err(Error::invalid("forced ENSM state", i64::from(target.as_reg())));
            }
        }
        self.bus.write(regs::ENSM_CONFIG_1, val)?;
        Ok(token)
    }

    /// Undo a [`Self::force_state`].
    ///
    /// A token whose saved state is INVALID restores nothing.
    pub fn restore_state(&mut self, token: EnsmRestore) -> Result<(), T::Error> {
        if token.prev == EnsmState::Invalid {
            debug!("no ensm state saved, nothing to restore");
            return Ok(());
        }

        let mut val = self.bus.read(regs::ENSM_CONFIG_1)? & !FORCE_BITS;
        match token.prev {
            EnsmState::Tx | EnsmState::TxFlush => val |= regs::FORCE_TX_ON,
            EnsmState::Rx | EnsmState::RxFlush => val |= regs::FORCE_RX_ON,
            EnsmState::Fdd | EnsmState::FddFlush => val |= regs::FORCE_TX_ON | regs::FORCE_RX_ON,
            EnsmState::Alert => val |= regs::TO_ALERT,
            EnsmState::Sleep | EnsmState::SleepWait | EnsmState::Invalid => {
                debug!("ensm {:?} restored as wait state", token.prev);
            }
        }
        self.bus.write(regs::ENSM_CONFIG_1, val)?;

        if token.pd_reset != 0 {
            let thresh = self.bus.read(regs::SMALL_LMT_OVERLOAD_THRESH)? & regs::SMALL_LMT_OVERLOAD_MASK;
            self.bus.write(regs::SMALL_LMT_OVERLOAD_THRESH, thresh | token.pd_reset)?;
        }

        if let Some(tracking) = token.tracking {
            self.tracking_control(tracking.bbdc, tracking.rfdc, tracking.quad)?;
        }
        Ok(())
    }
}
