//! TX quadrature calibration
//!
//! The calibration injects a tone from the TX NCO and measures it through
//! the RX path with a matching RX NCO. The NCO word is picked so the tone
//! lands near a quarter of the TX baseband bandwidth. The RX NCO phase has
//! to line up with the loopback delay. A table gives a first guess, and if
//! that does not converge the phase is swept.

use embedded_hal::delay::DelayNs;

use crate::calib::search::find_opt;
use crate::clock::ClockId;
use crate::config::TX_QUAD_PHASES;
use crate::device::{nonzero_or, Ad9361};
use crate::error::{Calibration, Error, Result};
use crate::gain_table;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::GainBand;

const CONVERGED: u8 = regs::TX1_LO_CONV | regs::TX1_SSB_CONV;

/// NCO words, starting phase and decimation for one calibration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NcoPlan {
    /// RX NCO frequency word, 0..=3
    pub rx_word: u8,
    /// TX NCO frequency word, 0..=3
    pub tx_word: u8,
    /// Starting RX NCO phase offset, 0..=31
    pub rx_phase: u8,
    /// Measurement decimation
    pub decim: u8,
}

impl NcoPlan {
    /// TX NCO tone frequency for a TX filter clock of `clktf` Hz
    #[must_use]
    pub const fn tone(&self, clktf: u64) -> u64 {
        clktf * (self.tx_word as u64 + 1) / 32
    }
}

/// Pick NCO words and a starting phase.
///
/// `tx_bb_bw` is the TX baseband bandwidth. `tx_filter_ctrl` is the low six
/// bits of TX_ENABLE_FILTER_CTRL, which disambiguate one equal-clock case.
/// Returns `None` as the phase guess for clock ratios without a table entry.
#[must_use]
pub fn nco_plan(clkrf: u64, clktf: u64, tx_bb_bw: u32, tx_filter_ctrl: u8) -> (NcoPlan, bool) {
    let clktf_nz = clktf.max(1);
    let word = ((u64::from(tx_bb_bw) * 8 + clktf_nz / 2) / clktf_nz).saturating_sub(1).min(3) as u8;

    let mut plan = NcoPlan {
        rx_word: word,
        tx_word: word,
        rx_phase: 0,
        decim: if clktf <= 4_000_000 { 2 } else { 3 },
    };

    let handled = if clkrf == 2 * clktf {
        plan.rx_phase = 0x0E;
        match word {
            0 => plan.tx_word = 1,
            1 => plan.rx_word = 0,
            2 => {
                plan.rx_word = 0;
                plan.tx_word = 1;
            }
            _ => {
                plan.rx_word = 1;
                plan.rx_phase = 0x08;
            }
        }
        true
    } else if clkrf == clktf {
        plan.rx_phase = match word {
            2 => 0x1F,
            1 if tx_filter_ctrl == 0x22 => 0x15,
            1 => 0x1A,
            _ => 0x15,
        };
        true
    } else {
        false
    };

    (plan, handled)
}

/// First gain table row whose LPF/TIA bits select the calibration gain
#[must_use]
pub fn calibration_gain_index(band: GainBand) -> Option<u8> {
    gain_table::rows(band)
        .iter()
        .position(|row| row[1] & 0x3F == 0x20)
        .and_then(|i| u8::try_from(i).ok())
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Run the TX quadrature calibration.
    ///
    /// `rx_phase` overrides the tabulated starting phase. A failed first
    /// attempt is retried with the last phase that converged, then the
    /// whole phase range is searched. Widened bandwidth is restored before
    /// returning.
    pub fn tx_quad_calib(&mut self, rx_phase: Option<u8>) -> Result<(), T::Error> {
        let clkrf = self.clocks.rate(ClockId::ClkRf);
        let clktf = self.clocks.rate(ClockId::ClkTf);
        let rx_bw = nonzero_or(self.current_rx_bw, self.params.rf_rx_bandwidth_hz);
        let tx_bw = nonzero_or(self.current_tx_bw, self.params.rf_tx_bandwidth_hz);

        let filter_ctrl = self.bus.read_field(regs::TX_ENABLE_FILTER_CTRL, 0x3F)?;
        let (mut plan, handled) = nco_plan(clkrf, clktf, tx_bw / 2, filter_ctrl);
        if !handled {
            warn!("tx quad cal: no phase entry for clkrf {} Hz, clktf {} Hz", clkrf, clktf);
        }
        if let Some(phase) = rx_phase {
            plan.rx_phase = phase & regs::RX_NCO_PHASE_OFFSET;
        }

        let tone = plan.tone(clktf);
        debug!(
            "tx quad cal: nco tone {} Hz, rx word {}, tx word {}, phase {}",
            tone, plan.rx_word, plan.tx_word, plan.rx_phase
        );

        // the filters must pass the calibration tone
        let widened = tone > u64::from(rx_bw / 8) || tone > u64::from(tx_bw / 8);
        if !widened {
            return self.tx_quad_calib_with(plan);
        }

        let bw = u32::try_from(tone * 16).unwrap_or(u32::MAX);
        let result = self
            .update_rf_bandwidth(bw, bw)
            .and_then(|()| self.tx_quad_calib_with(plan));
        // restore even after a failed widen; the first error wins
        let restored = self.update_rf_bandwidth(rx_bw, tx_bw);
        result.and(restored)
    }

    fn tx_quad_calib_with(&mut self, plan: NcoPlan) -> Result<(), T::Error> {
        let invert_rx2 = self.params.rx1rx2_phase_inversion_enable
            || self.params.port_ctrl.pp_conf[1] & regs::INVERT_RX2 != 0;
        if invert_rx2 {
            self.bus.write_flag(regs::PARALLEL_PORT_CONF_2, regs::INVERT_RX2, false)?;
        }
        let inv_bits = self.bus.read(regs::INVERT_BITS)?;
        self.bus.write(
            regs::INVERT_BITS,
            regs::INVERT_RX1_RF_DC_CGOUT_WORD | regs::INVERT_RX2_RF_DC_CGOUT_WORD,
        )?;

        let result = self.tx_quad_search(plan);

        self.bus.write(regs::INVERT_BITS, inv_bits)?;
        if invert_rx2 {
            self.bus.write_flag(regs::PARALLEL_PORT_CONF_2, regs::INVERT_RX2, true)?;
        }
        result
    }

    fn tx_quad_search(&mut self, plan: NcoPlan) -> Result<(), T::Error> {
        self.bus.write(regs::KEXP_2, field_prep(plan.tx_word, regs::TX_NCO_FREQ))?;
        self.bus.write(regs::QUAD_CAL_COUNT, 0xFF)?;
        self.bus.write(
            regs::KEXP_1,
            field_prep(1, regs::KEXP_TX)
                | field_prep(3, regs::KEXP_TX_COMP)
                | field_prep(1, regs::KEXP_DC_I)
                | field_prep(1, regs::KEXP_DC_Q),
        )?;

        let band = match self.gain_band {
            Some(band) => band,
            None => GainBand::from_frequency(self.clocks.rate(ClockId::RxRfpll)),
        };
        match calibration_gain_index(band) {
            Some(index) => self.bus.write(regs::TX_QUAD_FULL_LMT_GAIN, index)?,
            None => warn!("tx quad cal: no calibration gain row for {:?}", band),
        }
        self.bus.write(regs::QUAD_SETTLE_COUNT, 0xF0)?;
        self.bus.write(regs::TX_QUAD_LPF_GAIN, 0x00)?;

        if self.tx_quad_attempt(plan, plan.rx_phase)? {
            self.last_tx_quad_cal_phase = Some(plan.rx_phase);
            info!("tx quad cal converged at phase {}", plan.rx_phase);
            return Ok(());
        }

        if let Some(last) = self.last_tx_quad_cal_phase {
            if last != plan.rx_phase && self.tx_quad_attempt(plan, last)? {
                info!("tx quad cal converged at last good phase {}", last);
                return Ok(());
            }
        }

        self.tx_quad_phase_search(plan)
    }

    /// Sweep every RX NCO phase and settle on the middle of the widest
    /// converged window. The field is doubled so a window spanning phase 0
    /// is found whole.
    fn tx_quad_phase_search(&mut self, plan: NcoPlan) -> Result<(), T::Error> {
        let mut field = [0u8; 2 * TX_QUAD_PHASES];
        for phase in 0..TX_QUAD_PHASES {
            let ok = self.tx_quad_attempt(plan, phase as u8)?;
            field[phase] = u8::from(!ok);
            field[phase + TX_QUAD_PHASES] = field[phase];
        }

        let run = find_opt(&field);
        if run.is_empty() {
            error!("tx quad cal: no phase converged");
            return Err(Error::ConvergenceFailure(Calibration::TxQuadPhase));
        }
        let phase = (run.center() % TX_QUAD_PHASES) as u8;
        debug!("tx quad phase search: window start {}, length {}", run.start, run.len);

        // the final run leaves the chosen phase's corrections in place
        self.tx_quad_attempt(plan, phase)?;
        self.last_tx_quad_cal_phase = Some(phase);
        info!("tx quad cal converged after search at phase {}", phase);
        Ok(())
    }

    /// One calibration attempt at `phase`; true when every active TX
    /// converged.
    fn tx_quad_attempt(&mut self, plan: NcoPlan, phase: u8) -> Result<bool, T::Error> {
        let ctrl = regs::SETTLE_MAIN_ENABLE
            | regs::DC_OFFSET_ENABLE
            | regs::GAIN_ENABLE
            | regs::PHASE_ENABLE
            | field_prep(plan.decim, regs::M_DECIM);

        self.bus.write(
            regs::QUAD_CAL_NCO_FREQ_PHASE_OFFSET,
            field_prep(plan.rx_word, regs::RX_NCO_FREQ) | (phase & regs::RX_NCO_PHASE_OFFSET),
        )?;
        self.bus.write(regs::QUAD_CAL_CTRL, ctrl | regs::QUAD_CAL_SOFT_RESET)?;
        self.bus.write(regs::QUAD_CAL_CTRL, ctrl)?;

        self.run_calibration(regs::TX_QUAD_CAL)?;

        let mut status = self.bus.read(regs::QUAD_CAL_STATUS_TX1)?;
        if self.params.two_rx_two_tx_mode {
            status &= self.bus.read(regs::QUAD_CAL_STATUS_TX2)?;
        }
        Ok(status & CONVERGED == CONVERGED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_rate_rx_clock() {
        // clktf 61.44 MHz, bw 9 MHz: word 0 bumps the TX NCO
        let (plan, handled) = nco_plan(122_880_000, 61_440_000, 9_000_000, 0);
        assert!(handled);
        assert_eq!(plan, NcoPlan { rx_word: 0, tx_word: 1, rx_phase: 0x0E, decim: 3 });
    }

    #[test]
    fn equal_clocks_phase_table() {
        let (plan, _) = nco_plan(30_720_000, 30_720_000, 5_000_000, 0);
        assert_eq!(plan.tx_word, 0);
        assert_eq!(plan.rx_phase, 0x15);

        let (plan, _) = nco_plan(30_720_000, 30_720_000, 7_680_000, 0);
        assert_eq!(plan.tx_word, 1);
        assert_eq!(plan.rx_phase, 0x1A);
        let (plan, _) = nco_plan(30_720_000, 30_720_000, 7_680_000, 0x22);
        assert_eq!(plan.rx_phase, 0x15);
    }

    #[test]
    fn word_clamped_to_two_bits() {
        let (plan, _) = nco_plan(3_000_000, 3_000_000, 20_000_000, 0);
        assert_eq!(plan.tx_word, 3);
        assert_eq!(plan.decim, 2);
    }

    #[test]
    fn unhandled_ratio_reported() {
        let (_, handled) = nco_plan(92_160_000, 30_720_000, 9_000_000, 0);
        assert!(!handled);
    }

    #[test]
    fn tone_frequency() {
        let plan = NcoPlan { rx_word: 1, tx_word: 1, rx_phase: 0, decim: 3 };
        assert_eq!(plan.tone(61_440_000), 3_840_000);
    }

    #[test]
    fn every_band_has_calibration_row() {
        for band in [GainBand::Low, GainBand::Mid, GainBand::High] {
            assert!(calibration_gain_index(band).is_some(), "{band:?}");
        }
    }
}
