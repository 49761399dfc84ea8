//! Analog baseband filter calibrations
//!
//! The RX and TX baseband filters are tuned against the BBPLL through a
//! divider derived from the requested corner frequency. The TIA and the TX
//! second-pole filter are set in closed form, and the ADC is configured
//! from the resulting RX bandwidth.

use embedded_hal::delay::DelayNs;

use crate::device::Ad9361;
use crate::error::Result;
use crate::regs;
use crate::transport::RegisterTransport;

/// 1.4 · 2π / ln 2, scaled by 10⁴
const RX_TUNE_CONSTANT: u64 = 126_906;
/// 1.6 · 2π / ln 2, scaled by 10⁴
const TX_TUNE_CONSTANT: u64 = 145_036;
/// 1.6 · π · 10⁴ / 3.2, corner of the TX second pole
const TX_SECOND_CORNER: u64 = 15_708;

const MAX_TUNE_DIV: u64 = 511;

/// RX baseband bandwidth limits, Hz
pub const RX_BB_BW_RANGE: (u32, u32) = (200_000, 28_000_000);
/// TX baseband bandwidth limits, Hz
pub const TX_BB_BW_RANGE: (u32, u32) = (625_000, 20_000_000);
/// TX second filter bandwidth limits, Hz
pub const TX_SECOND_BW_RANGE: (u32, u32) = (530_000, 20_000_000);
/// TIA bandwidth limits, Hz
pub const TIA_BW_RANGE: (u32, u32) = (200_000, 20_000_000);

/// Tune divider for the RX baseband filter
#[must_use]
pub fn rx_tune_divider(bbpll: u64, bb_bw: u32) -> u16 {
    tune_divider(bbpll, bb_bw.clamp(RX_BB_BW_RANGE.0, RX_BB_BW_RANGE.1), RX_TUNE_CONSTANT)
}

/// Tune divider for the TX baseband filter
#[must_use]
pub fn tx_tune_divider(bbpll: u64, bb_bw: u32) -> u16 {
    tune_divider(bbpll, bb_bw.clamp(TX_BB_BW_RANGE.0, TX_BB_BW_RANGE.1), TX_TUNE_CONSTANT)
}

fn tune_divider(bbpll: u64, bb_bw: u32, constant: u64) -> u16 {
    let target = constant * (u64::from(bb_bw) / 10_000);
    let div = bbpll.div_ceil(target.max(1)).clamp(1, MAX_TUNE_DIV);
    div as u16
}

/// RX bandwidth readback words: whole MHz and the remainder in 1/128 MHz
#[must_use]
pub fn rx_bandwidth_words(bb_bw: u32) -> (u8, u8) {
    let bb_bw = bb_bw.clamp(RX_BB_BW_RANGE.0, RX_BB_BW_RANGE.1);
    let mhz = (bb_bw / 1_000_000) as u8;
    let frac = ((bb_bw % 1_000_000) * 128 + 500_000) / 1_000_000;
    (mhz, frac.min(127) as u8)
}

/// TIA register settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TiaSettings {
    /// RX_TIA_CONFIG
    pub config: u8,
    /// TIA1/TIA2 C LSB
    pub c_lsb: u8,
    /// TIA1/TIA2 C MSB
    pub c_msb: u8,
}

/// Solve the TIA feedback capacitor from the tuned filter capacitor and
/// resistor readbacks.
#[must_use]
pub fn tia_settings(c3_msb: u8, c3_lsb: u8, r2346: u8, bb_bw: u32) -> TiaSettings {
    let bb_bw = bb_bw.clamp(TIA_BW_RANGE.0, TIA_BW_RANGE.1);

    // femtofarads and ohms
    let cbbf = u64::from(c3_msb) * 160 + u64::from(c3_lsb) * 10 + 140;
    let r = 18_300 * u64::from(r2346 & regs::RX_BBF_R2346_MASK);
    let ctia = (cbbf * r * 560) / 3_500_000;

    let config = match bb_bw {
        0..=3_000_000 => 0xE0,
        3_000_001..=10_000_000 => 0x60,
        _ => 0x20,
    };

    let (c_lsb, c_msb) = if ctia > 2920 {
        let msb = (ctia - 400 + 160) / 320;
        (0x40, msb.min(127) as u8)
    } else {
        let lsb = (ctia.saturating_sub(400) + 20) / 40;
        ((lsb.min(0x3F) as u8) + 0x40, 0)
    };

    TiaSettings { config, c_lsb, c_msb }
}

/// TX second filter register settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecondFilterSettings {
    /// Resistor multiplier picked by the search: 1, 2, 4 or 8
    pub multiplier: u32,
    /// CONFIG0
    pub config: u8,
    /// RESISTOR
    pub resistor: u8,
    /// CAPACITOR, at most 63
    pub capacitor: u8,
}

/// Walk the resistor multiplier up until the capacitor code fits 6 bits.
#[must_use]
pub fn second_filter_settings(tx_bb_bw: u32) -> SecondFilterSettings {
    let bw = tx_bb_bw.clamp(TX_SECOND_BW_RANGE.0, TX_SECOND_BW_RANGE.1);
    let corner = TX_SECOND_CORNER * (u64::from(bw) / 10_000);

    let mut multiplier = 1u32;
    let mut cap = u64::MAX;
    for i in 0..4 {
        let div = corner * u64::from(multiplier);
        cap = ((500_000_000 + div / 2) / div).saturating_sub(12);
        if cap < 64 || i == 3 {
            break;
        }
        multiplier <<= 1;
    }

    let config = match bw {
        0..=4_500_000 => 0x59,
        4_500_001..=12_000_000 => 0x56,
        _ => 0x57,
    };
    let resistor = match multiplier {
        1 => 0x0C,
        2 => 0x04,
        4 => 0x03,
        _ => 0x01,
    };

    SecondFilterSettings {
        multiplier,
        config,
        resistor,
        capacitor: cap.min(63) as u8,
    }
}

/// ADC configuration words derived from the tuned RX bandwidth.
///
/// Entries outside the scaled positions are fixed characterization values.
#[must_use]
pub fn adc_setup_words(bbpll: u64, adc: u64, rx_tune_div: u16) -> [u8; 40] {
    let mut data = ADC_SETUP_BASE;

    let bb_bw = (bbpll * 10_000 / (RX_TUNE_CONSTANT * u64::from(rx_tune_div.max(1))))
        .clamp(u64::from(RX_BB_BW_RANGE.0), u64::from(RX_BB_BW_RANGE.1));

    // inverse RC time constant and the ADC clock, both normalized to 640 MHz
    let inv_rc_1e3 = bb_bw * 2_000 / 1_400;
    let adc_1e3 = (adc / 640_000).max(1);
    let scale_snr = if adc < 80_000_000 { 1_000 } else { 1_585 };
    let ratio = (inv_rc_1e3 * 1_000 / adc_1e3).max(1);

    let sqrt_term = isqrt(ratio * 1_000).max(1);
    let word = |base: u64| -> u8 { ((base * scale_snr / sqrt_term) / 1_000).min(127) as u8 };

    data[7] = word(82_000);
    data[8] = word(59_000);
    data[9] = word(46_000);
    data[10] = word(36_000);
    data[11] = ((u64::from(data[7]) * 3) / 4).min(127) as u8;
    data[12] = ((u64::from(data[8]) * 3) / 4).min(127) as u8;
    data[13] = ((u64::from(data[9]) * 3) / 4).min(127) as u8;
    data
}

fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

const ADC_SETUP_BASE: [u8; 40] = [
    0x00, 0x00, 0x00, 0x24, 0x24, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x40, //
    0x2C, 0x00, 0x2C, 0x00, 0x1E, 0x00, 0x40, 0x40, //
    0x40, 0x00, 0x00, 0x2C, 0x00, 0x2C, 0x00, 0x1E, //
    0x00, 0x40, 0x40, 0x40, 0x00, 0x00, 0x00, 0x00,
];

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Tune the RX baseband filter for a corner of `bb_bw` Hz.
    pub fn rx_bb_analog_filter_calib(&mut self, bb_bw: u32) -> Result<(), T::Error> {
        let bbpll = self.clocks.rate(crate::clock::ClockId::Bbpll);
        let div = rx_tune_divider(bbpll, bb_bw);
        debug!("rx bb filter: bw {} Hz, tune divider {}", bb_bw, div);

        self.bus.write(regs::RX_BBF_TUNE_DIVIDE, div as u8)?;
        self.bus.write_field(regs::RX_BBF_TUNE_CONFIG, regs::RX_BBF_TUNE_DIVIDE_MSB, (div >> 8) as u8)?;

        let (mhz, frac) = rx_bandwidth_words(bb_bw);
        self.bus.write(regs::RX_BBBW_MHZ, mhz)?;
        self.bus.write(regs::RX_BBBW_KHZ, frac)?;

        self.bus.write(regs::RX_MIX_LO_CM, 0x3F)?;
        self.bus.write(regs::RX_MIX_GM_CONFIG, 0x03)?;

        self.bus.write(regs::RX1_TUNE_CTRL, regs::RX_TUNE_RESAMPLE)?;
        self.bus.write(regs::RX2_TUNE_CTRL, regs::RX_TUNE_RESAMPLE)?;
        let cal = self.run_calibration(regs::RX_BB_TUNE_CAL);
        self.bus.write(regs::RX1_TUNE_CTRL, regs::RX_TUNE_RESAMPLE | regs::PD_TUNE)?;
        self.bus.write(regs::RX2_TUNE_CTRL, regs::RX_TUNE_RESAMPLE | regs::PD_TUNE)?;
        cal
    }

    /// Tune the TX baseband filter for a corner of `bb_bw` Hz.
    pub fn tx_bb_analog_filter_calib(&mut self, bb_bw: u32) -> Result<(), T::Error> {
        let bbpll = self.clocks.rate(crate::clock::ClockId::Bbpll);
        let div = tx_tune_divider(bbpll, bb_bw);
        debug!("tx bb filter: bw {} Hz, tune divider {}", bb_bw, div);

        self.bus.write(regs::TX_BBF_TUNE_DIVIDER, div as u8)?;
        self.bus.write_field(regs::TX_BBF_TUNE_MODE, regs::TX_BBF_TUNE_DIVIDE_MSB, (div >> 8) as u8)?;

        self.bus.write(regs::TX_TUNE_CTRL, regs::TX_TUNE_CTRL_1 | regs::TX_TUNER_RESAMPLE)?;
        let cal = self.run_calibration(regs::TX_BB_TUNE_CAL);
        self.bus.write(
            regs::TX_TUNE_CTRL,
            regs::TX_TUNE_CTRL_1 | regs::TX_TUNER_RESAMPLE | regs::TX_PD_TUNE,
        )?;
        cal
    }

    /// Set the TIA capacitors for a baseband bandwidth. Uses the RX filter
    /// tune results, so runs after [`Self::rx_bb_analog_filter_calib`].
    pub fn rx_tia_calib(&mut self, bb_bw: u32) -> Result<(), T::Error> {
        let c3_msb = self.bus.read(regs::RX_BBF_C3_MSB)?;
        let c3_lsb = self.bus.read(regs::RX_BBF_C3_LSB)?;
        let r2346 = self.bus.read(regs::RX_BBF_R2346)?;
        let tia = tia_settings(c3_msb, c3_lsb, r2346, bb_bw);
        debug!("tia: config {:#x}, c {:#x}/{:#x}", tia.config, tia.c_msb, tia.c_lsb);

        self.bus.write(regs::RX_TIA_CONFIG, tia.config)?;
        self.bus.write(regs::TIA1_C_LSB, tia.c_lsb)?;
        self.bus.write(regs::TIA1_C_MSB, tia.c_msb)?;
        self.bus.write(regs::TIA2_C_LSB, tia.c_lsb)?;
        self.bus.write(regs::TIA2_C_MSB, tia.c_msb)
    }

    /// Set the TX second-pole filter for a baseband bandwidth.
    pub fn tx_bb_second_filter_calib(&mut self, bb_bw: u32) -> Result<(), T::Error> {
        let s = second_filter_settings(bb_bw);
        debug!(
            "tx second filter: x{} resistor {:#x} capacitor {}",
            s.multiplier, s.resistor, s.capacitor
        );
        self.bus.write(regs::CONFIG0, s.config)?;
        self.bus.write(regs::RESISTOR, s.resistor)?;
        self.bus.write(regs::CAPACITOR, s.capacitor)
    }

    /// Write the ADC configuration block for the current RX filter tuning.
    pub fn rx_adc_setup(&mut self, bbpll: u64, adc: u64) -> Result<(), T::Error> {
        let div_lsb = self.bus.read(regs::RX_BBF_TUNE_DIVIDE)?;
        let div_msb = self.bus.read_field(regs::RX_BBF_TUNE_CONFIG, regs::RX_BBF_TUNE_DIVIDE_MSB)?;
        let div = (u16::from(div_msb) << 8) | u16::from(div_lsb);

        let data = adc_setup_words(bbpll, adc, div);
        for (addr, value) in (regs::ADC_SETUP..).zip(data) {
            self.bus.write(addr, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_divider_rounds_up() {
        // 9 MHz corner: target 126906 * 900 = 114 215 400
        assert_eq!(rx_tune_divider(983_040_000, 9_000_000), 9);
        assert_eq!(rx_tune_divider(1_228_800_000, 200_000), 485);
    }

    #[test]
    fn dividers_clamp_to_nine_bits() {
        assert_eq!(rx_tune_divider(1_430_000_000, 1), 511);
        assert_eq!(tx_tune_divider(1_430_000_000, 1), 160);
    }

    #[test]
    fn bandwidth_words() {
        assert_eq!(rx_bandwidth_words(9_000_000), (9, 0));
        assert_eq!(rx_bandwidth_words(1_500_000), (1, 64));
        assert_eq!(rx_bandwidth_words(28_999_999), (28, 0));
    }

    #[test]
    fn tia_ranges() {
        let narrow = tia_settings(0x10, 0x10, 0x02, 1_000_000);
        assert_eq!(narrow.config, 0xE0);
        let wide = tia_settings(0x10, 0x10, 0x02, 18_000_000);
        assert_eq!(wide.config, 0x20);

        // cbbf 2860 fF, r 36600: ctia 16 748 fF, MSB path
        assert_eq!(wide.c_lsb, 0x40);
        assert_eq!(wide.c_msb, 51);
    }

    #[test]
    fn tia_small_capacitor_uses_lsb() {
        // cbbf 300 fF, r 18300: ctia 878 fF
        let tia = tia_settings(0x00, 0x10, 0x01, 5_000_000);
        assert_eq!(tia.c_msb, 0);
        assert_eq!(tia.c_lsb, 0x40 + 12);
    }

    #[test]
    fn second_filter_capacitor_fits_six_bits() {
        for bw in [530_000u32, 1_000_000, 4_500_000, 9_000_000, 20_000_000] {
            let s = second_filter_settings(bw);
            assert!(s.capacitor <= 63, "{bw}: {s:?}");
        }
        let narrow = second_filter_settings(530_000);
        assert_eq!(narrow.multiplier, 8);
        assert_eq!(narrow.resistor, 0x01);
        let wide = second_filter_settings(9_000_000);
        assert_eq!(wide.multiplier, 1);
        assert_eq!(wide.config, 0x56);
        assert_eq!(wide.resistor, 0x0C);
    }

    #[test]
    fn adc_words_keep_fixed_entries() {
        let data = adc_setup_words(983_040_000, 245_760_000, 9);
        assert_eq!(data[3], 0x24);
        assert_eq!(data[4], 0x24);
        assert_eq!(data[14], 0x40);
        assert!(data[7..14].iter().all(|&w| w <= 127));
    }
}
