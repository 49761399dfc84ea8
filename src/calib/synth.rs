//! RF synthesizer charge pump calibration

use embedded_hal::delay::DelayNs;

use crate::clock::ClockId;
use crate::device::Ad9361;
use crate::error::Result;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::Direction;

/// VCO calibration count code: longer counts when both synthesizers run
/// or the reference is fast.
pub(crate) const fn vco_cal_count(dual_synth: bool, reference: u64) -> u8 {
    if dual_synth {
        3
    } else if reference > 40_000_000 {
        1
    } else {
        0
    }
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Calibrate the charge pump of one synthesizer.
    ///
    /// Leaves the chip in FDD ALERT, which the ENSM mode setup at the end
    /// of bring-up replaces.
    pub fn txrx_synth_cp_calib(&mut self, dir: Direction) -> Result<(), T::Error> {
        let offs = dir.synth_offset();
        let fdd = self.params.frequency_division_duplex_mode;
        let dual = fdd || self.params.tdd_use_dual_synth_mode;
        let reference = self.clocks.rate(match dir {
            Direction::Rx => ClockId::RxRefClk,
            Direction::Tx => ClockId::TxRefClk,
        });

        self.bus.write(regs::RX_CP_LEVEL_DETECT + offs, 0x17)?;
        self.bus.write(regs::RX_DSM_SETUP_1 + offs, 0x00)?;
        self.bus.write(regs::RX_LO_GEN_POWER_MODE + offs, 0x00)?;
        self.bus.write(regs::RX_VCO_LDO + offs, 0x0B)?;
        self.bus.write(regs::RX_VCO_PD_OVERRIDES + offs, 0x02)?;
        self.bus.write(regs::RX_CP_CURRENT + offs, 0x80)?;
        self.bus.write(regs::RX_CP_CONFIG + offs, 0x00)?;

        let count = vco_cal_count(dual, reference);
        self.bus.write(
            regs::RX_VCO_CAL + offs,
            regs::VCO_CAL_EN | field_prep(count, regs::VCO_CAL_COUNT) | field_prep(2, regs::FB_CLOCK_ADV),
        )?;

        // the calibration runs with both synthesizers up
        if !fdd {
            self.bus.write_flag(regs::PARALLEL_PORT_CONF_3, regs::HALF_DUPLEX_MODE, false)?;
        }
        self.bus.write(regs::ENSM_CONFIG_2, regs::DUAL_SYNTH_MODE)?;
        self.bus.write(regs::ENSM_CONFIG_1, regs::FORCE_ALERT_STATE | regs::TO_ALERT)?;
        self.bus.write(regs::ENSM_MODE, regs::FDD_MODE)?;

        self.bus.write(regs::RX_CP_CONFIG + offs, regs::CP_CAL_ENABLE)?;
        self.bus.poll_field(regs::RX_CAL_STATUS + offs, regs::CP_CAL_VALID, 1)?;
        debug!("{:?} charge pump calibrated", dir);
        Ok(())
    }
}
