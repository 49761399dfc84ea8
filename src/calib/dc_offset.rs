//! Baseband and RF DC offset calibrations

use embedded_hal::delay::DelayNs;

use crate::config::RF_DC_HIGH_BAND_FREQ;
use crate::device::Ad9361;
use crate::error::Result;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Run the baseband DC offset calibration.
    pub fn bb_dc_offset_calib(&mut self) -> Result<(), T::Error> {
        self.bus.write(regs::BB_DC_OFFSET_COUNT, 0x3F)?;
        self.bus.write(regs::BB_DC_OFFSET_SHIFT, regs::BB_DC_M_SHIFT)?;
        self.bus.write(regs::BB_DC_OFFSET_ATTEN, 0x01)?;
        self.run_calibration(regs::BBDC_CAL)
    }

    /// Run the RF DC offset calibration for an RX carrier of `rx_freq` Hz.
    ///
    /// Count and attenuation presets switch at 4 GHz.
    pub fn rf_dc_offset_calib(&mut self, rx_freq: u64) -> Result<(), T::Error> {
        let p = &self.params;
        let (count, cal_count, atten) = if rx_freq <= RF_DC_HIGH_BAND_FREQ {
            (p.dc_offset_count_high_range, 4, p.dc_offset_attenuation_high_range)
        } else {
            (p.dc_offset_count_low_range, 3, p.dc_offset_attenuation_low_range)
        };

        self.bus.write(regs::WAIT_COUNT, 0x20)?;
        self.bus.write(regs::RF_DC_OFFSET_COUNT, count)?;
        self.bus.write_field(regs::RF_DC_OFFSET_CONFIG_1, regs::RF_DC_CALIBRATION_COUNT, cal_count)?;
        self.bus.write_field(regs::RF_DC_OFFSET_ATTEN, regs::RF_DC_OFFSET_ATTEN_MASK, atten)?;
        self.bus.write(
            regs::DC_OFFSET_CONFIG2,
            regs::USE_WAIT_COUNTER_FOR_RF_DC_INIT_CAL | field_prep(3, regs::DC_OFFSET_UPDATE),
        )?;
        self.bus.write(
            regs::INVERT_BITS,
            regs::INVERT_RX1_RF_DC_CGOUT_WORD | regs::INVERT_RX2_RF_DC_CGOUT_WORD,
        )?;
        self.run_calibration(regs::RFDC_CAL)
    }
}
