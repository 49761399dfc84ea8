//! Auxiliary converters, control outputs, GPOs, external LNA, clock
//! output and TX monitor

use embedded_hal::delay::DelayNs;

use crate::clock::ClockId;
use crate::device::Ad9361;
use crate::error::{Error, Result};
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::ClockOutMode;

/// Lowest aux DAC output, mV
const AUXDAC_MIN_MV: u32 = 306;
/// Outputs at or above this level use the 2.5 V reference, mV
const AUXDAC_HIGH_RANGE_MV: u32 = 1888;

/// Aux DAC selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxDac {
    /// DAC1
    One,
    /// DAC2
    Two,
}

impl AuxDac {
    const fn offset(self) -> u16 {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Aux DAC code and reference select for an output of `mv` millivolts
///
/// Levels below 306 mV are raised to it; the code saturates at 1023.
#[must_use]
pub fn auxdac_code(mv: u32) -> (u16, u8) {
    let mv = mv.max(AUXDAC_MIN_MV);
    let (code, vref) = if mv < AUXDAC_HIGH_RANGE_MV {
        ((mv - AUXDAC_MIN_MV) * 1000 / 1404, 0)
    } else {
        ((mv - 1761) * 1000 / 1836, 3)
    };
    (code.min(1023) as u16, vref)
}

/// Decimation in 256..=32768 to its three-bit code
fn decimation_code(decimation: u32) -> u8 {
    (decimation.clamp(256, 32_768).ilog2() - 8) as u8
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Set an aux DAC output in millivolts.
    pub fn set_auxdac_mv(&mut self, dac: AuxDac, mv: u32) -> Result<(), T::Error> {
        let (code, vref) = auxdac_code(mv);
        let offs = dac.offset();
        self.bus.write(regs::AUXDAC_1_WORD + offs, (code >> 2) as u8)?;
        self.bus.write(
            regs::AUXDAC_1_CONFIG + offs,
            field_prep((code & 0x3) as u8, regs::AUXDAC_WORD_LSB) | field_prep(vref, regs::AUXDAC_VREF),
        )?;
        debug!("{:?} aux dac {} mV, code {}", dac, mv, code);
        Ok(())
    }

    /// Program the aux DAC defaults and their ENSM gating.
    pub fn auxdac_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.aux_dac_ctrl;
        self.set_auxdac_mv(AuxDac::One, c.dac1.default_value_mv)?;
        self.set_auxdac_mv(AuxDac::Two, c.dac2.default_value_mv)?;

        self.bus.write(regs::AUXDAC1_RX_DELAY, c.dac1.rx_delay_us)?;
        self.bus.write(regs::AUXDAC1_TX_DELAY, c.dac1.tx_delay_us)?;
        self.bus.write(regs::AUXDAC2_RX_DELAY, c.dac2.rx_delay_us)?;
        self.bus.write(regs::AUXDAC2_TX_DELAY, c.dac2.tx_delay_us)?;

        let mut off = 0;
        for (active, bit) in [
            (c.dac1.active_in_rx, regs::AUXDAC_1_RX_OFF),
            (c.dac2.active_in_rx, regs::AUXDAC_2_RX_OFF),
            (c.dac1.active_in_tx, regs::AUXDAC_1_TX_OFF),
            (c.dac2.active_in_tx, regs::AUXDAC_2_TX_OFF),
            (c.dac1.active_in_alert, regs::AUXDAC_1_ALERT_OFF),
            (c.dac2.active_in_alert, regs::AUXDAC_2_ALERT_OFF),
        ] {
            if !active {
                off |= bit;
            }
        }
        self.bus.write(regs::AUXDAC_ENABLE_CTRL, off)?;
        self.bus
            .write_flag(regs::EXTERNAL_LNA_CTRL, regs::AUXDAC_MANUAL_SELECT, c.manual_mode_enable)
    }

    /// Program the aux ADC clock and the temperature sensor.
    ///
    /// Depends on the BBPLL rate, so it is part of the clock change
    /// refresh.
    pub fn auxadc_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.aux_adc_ctrl;
        let bbpll = self.clocks.rate(ClockId::Bbpll);
        if c.clock_rate == 0 {
            return Err(Error::invalid("aux ADC clock", c.clock_rate));
        }

        let interval = (u64::from(c.temp_sense_measurement_interval_ms) * (bbpll / 1000) + (1 << 28)) >> 29;
        let mut sense = field_prep(interval.min(0x7F) as u8, regs::TEMP_MEASUREMENT_INTERVAL);
        if c.periodic_temp_measurement {
            sense |= regs::PERIODIC_TEMP_MEASUREMENT;
        }

        self.bus.write(regs::TEMP_OFFSET, c.offset.to_le_bytes()[0])?;
        self.bus.write(regs::START_TEMP_READING, 0)?;
        self.bus.write(regs::TEMP_SENSE2, sense)?;
        self.bus.write(
            regs::TEMP_SENSOR_CONFIG,
            field_prep(decimation_code(c.temp_sensor_decimation), regs::TEMP_SENSOR_DECIMATION),
        )?;
        let divider = (bbpll / u64::from(c.clock_rate)).clamp(2, 63) as u8;
        self.bus.write(regs::AUXADC_CLOCK_DIVIDER, divider)?;
        self.bus.write(
            regs::AUXADC_CONFIG,
            field_prep(decimation_code(c.decimation), regs::AUX_ADC_DECIMATION),
        )
    }

    /// Latest aux ADC conversion, 12 bits
    pub fn read_auxadc(&mut self) -> Result<u16, T::Error> {
        let msb = self.bus.read(regs::AUXADC_WORD_MSB)?;
        let lsb = self.bus.read(regs::AUXADC_WORD_LSB)?;
        Ok(u16::from(msb) << 4 | u16::from(lsb & 0x0F))
    }

    /// Die temperature in milli-degrees Celsius
    pub fn read_temperature(&mut self) -> Result<i32, T::Error> {
        let raw = self.bus.read(regs::TEMPERATURE)?;
        Ok(i32::from(raw) * 1_000_000 / 1140)
    }

    /// Route internal signals to the control output pins.
    pub fn ctrl_outs_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.ctrl_outs_ctrl;
        self.bus.write(regs::CTRL_OUTPUT_POINTER, c.index)?;
        self.bus.write(regs::CTRL_OUTPUT_ENABLE, c.enable_mask)
    }

    /// Program the general purpose outputs.
    pub fn gpo_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.gpo_ctrl;
        self.bus.write(
            regs::AUTO_GPO,
            field_prep(c.auto_rx, regs::GPO_AUTO_RX) | field_prep(c.auto_tx, regs::GPO_AUTO_TX),
        )?;
        let manual = if c.manual_mode_enable { c.manual_mode_mask } else { 0 };
        self.bus.write(
            regs::GPO_FORCE_AND_INIT,
            field_prep(manual, regs::GPO_MANUAL_CTRL) | field_prep(c.inactive_state_high, regs::GPO_INIT_STATE),
        )?;
        self.bus
            .write_flag(regs::EXTERNAL_LNA_CTRL, regs::GPO_MANUAL_SELECT, c.manual_mode_enable)?;

        for (i, (&rx, &tx)) in c.rx_delay_us.iter().zip(&c.tx_delay_us).enumerate() {
            self.bus.write(regs::GPO0_RX_DELAY + i as u16, rx)?;
            self.bus.write(regs::GPO0_TX_DELAY + i as u16, tx)?;
        }
        Ok(())
    }

    /// Program the external LNA gain, bypass loss and control pins.
    pub fn elna_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.elna_ctrl;
        let gain = u8::try_from(c.gain_mdb / 500).unwrap_or(u8::MAX).min(regs::EXT_LNA_GAIN);
        let bypass = u8::try_from(c.bypass_loss_mdb / 500).unwrap_or(u8::MAX).min(regs::EXT_LNA_GAIN);

        self.bus.write_flag(regs::EXTERNAL_LNA_CTRL, regs::EXTERNAL_LNA1_CTRL, c.elna_1_control_en)?;
        self.bus.write_flag(regs::EXTERNAL_LNA_CTRL, regs::EXTERNAL_LNA2_CTRL, c.elna_2_control_en)?;
        self.bus.write(regs::EXT_LNA_HIGH_GAIN, gain)?;
        self.bus.write(regs::EXT_LNA_LOW_GAIN, bypass)
    }

    /// Select what drives the clock output pin.
    pub fn clk_out_setup(&mut self, mode: ClockOutMode) -> Result<(), T::Error> {
        match mode.select() {
            None => self.bus.write_flag(regs::BBPLL, regs::CLKOUT_ENABLE, false),
            Some(select) => {
                self.bus.write_field(regs::BBPLL, regs::CLKOUT_SELECT, select)?;
                self.bus.write_flag(regs::BBPLL, regs::CLKOUT_ENABLE, true)
            }
        }
    }

    /// Program the TX power monitor.
    pub fn txmon_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.txmon_ctrl;
        let duration = (c.tx_mon_duration / 16).max(1).ilog2().min(15) as u8;
        let mut mode = field_prep(duration, regs::TX_MON_DURATION);
        if c.one_shot_mode_en {
            mode |= regs::ONE_SHOT_MODE;
        }
        self.bus.write(regs::TPM_MODE_ENABLE, mode)?;

        let [delay_low, delay_high] = c.tx_mon_delay.to_le_bytes();
        self.bus.write(regs::TX_MON_DELAY, delay_low)?;
        self.bus.write(regs::TX_MON_DELAY_HIGH, delay_high)?;

        self.bus.write(
            regs::TX_MON_1_CONFIG,
            field_prep(c.tx1_mon_lo_cm, regs::TX_MON_LO_CM) | field_prep(c.tx1_mon_front_end_gain, regs::TX_MON_FRONT_END_GAIN),
        )?;
        self.bus.write(
            regs::TX_MON_2_CONFIG,
            field_prep(c.tx2_mon_lo_cm, regs::TX_MON_LO_CM) | field_prep(c.tx2_mon_front_end_gain, regs::TX_MON_FRONT_END_GAIN),
        )?;

        let thresh = u8::try_from(c.low_high_gain_threshold_mdb / 250).unwrap_or(u8::MAX);
        self.bus.write(regs::TX_ATTEN_THRESH, thresh)?;
        self.bus.write(regs::TX_MON_HIGH_GAIN, field_prep(c.high_gain_db, regs::TX_MON_GAIN))?;
        let mut low = field_prep(c.low_gain_db, regs::TX_MON_GAIN);
        if c.tx_mon_track_en {
            low |= regs::TX_MON_TRACK;
        }
        self.bus.write(regs::TX_MON_LOW_GAIN, low)
    }
}
