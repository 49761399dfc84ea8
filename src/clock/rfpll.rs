//! RF synthesizer frequency calculation
//!
//! The RX and TX LOs come from a fractional-N VCO followed by a
//! power-of-two output divider:
//!
//! FLO = FREF × (integer + fract / 8 388 593) / 2^(div + 1)
//!
//! The divider is the smallest one that keeps the VCO above 6 GHz.

use crate::config::{MAX_CARRIER_FREQ, MIN_CARRIER_FREQ, MIN_VCO_FREQ, RFPLL_MODULUS};

/// RF synthesizer programming word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RfpllWord {
    /// Integer part, 11 bits
    pub integer: u16,
    /// Fraction numerator, below the modulus
    pub fract: u32,
    /// VCO output divider code; the LO is VCO / 2^(code + 1)
    pub vco_div: u8,
}

impl RfpllWord {
    /// Solve the word for carrier `lo` from a synthesizer reference of `parent` Hz.
    #[must_use]
    pub fn calc(parent: u64, lo: u64) -> Self {
        let mut vco = lo;
        let mut vco_div = 0u8;
        // first doubling brings the LO to the divide-by-2 output
        vco <<= 1;
        while vco <= MIN_VCO_FREQ {
            vco <<= 1;
            vco_div += 1;
        }

        let mut integer = vco / parent;
        let rem = vco % parent;
        let mut fract = (rem * RFPLL_MODULUS + parent / 2) / parent;
        if fract >= RFPLL_MODULUS {
            integer += 1;
            fract -= RFPLL_MODULUS;
        }

        Self {
            integer: u16::try_from(integer).unwrap_or(u16::MAX) & 0x7FF,
            fract: fract as u32,
            vco_div,
        }
    }

    /// VCO frequency for a reference of `parent` Hz
    #[must_use]
    pub fn vco_frequency(&self, parent: u64) -> u64 {
        let whole = parent * u64::from(self.integer);
        let part = (parent * u64::from(self.fract) + RFPLL_MODULUS / 2) / RFPLL_MODULUS;
        whole + part
    }

    /// Carrier frequency for a reference of `parent` Hz
    #[must_use]
    pub fn frequency(&self, parent: u64) -> u64 {
        self.vco_frequency(parent) >> (self.vco_div + 1)
    }

    /// Register bytes in descending address order from FRACT_BYTE_2:
    /// fraction 22:16, 15:8, 7:0, then integer 10:8, 7:0
    #[must_use]
    pub const fn to_registers(&self) -> [u8; 5] {
        let f = self.fract;
        let n = self.integer;
        [
            ((f >> 16) & 0x7F) as u8,
            (f >> 8) as u8,
            f as u8,
            ((n >> 8) & 0x07) as u8,
            n as u8,
        ]
    }

    /// Inverse of [`Self::to_registers`], divider supplied separately
    #[must_use]
    pub const fn from_registers(buf: [u8; 5], vco_div: u8) -> Self {
        Self {
            fract: ((buf[0] as u32 & 0x7F) << 16) | ((buf[1] as u32) << 8) | buf[2] as u32,
            integer: ((buf[3] as u16 & 0x07) << 8) | buf[4] as u16,
            vco_div,
        }
    }
}

/// Whether `lo` is a tunable carrier
#[must_use]
pub const fn in_range(lo: u64) -> bool {
    lo >= MIN_CARRIER_FREQ && lo <= MAX_CARRIER_FREQ
}

/// Nearest achievable carrier for a requested one
#[must_use]
pub fn round_rate(parent: u64, lo: u64) -> u64 {
    let lo = lo.clamp(MIN_CARRIER_FREQ, MAX_CARRIER_FREQ);
    RfpllWord::calc(parent, lo).frequency(parent)
}

/// VCO bias and loop settings for one VCO frequency band.
///
/// Values are characterization data and are written unchanged.
#[derive(Clone, Copy, Debug)]
pub struct VcoSettings {
    /// Lowest VCO frequency of the band, MHz
    pub min_mhz: u32,
    pub(crate) vco_output_level: u8,
    pub(crate) vco_varactor: u8,
    pub(crate) vco_bias_ref: u8,
    pub(crate) vco_bias_tcf: u8,
    pub(crate) vco_cal_offset: u8,
    pub(crate) vco_varactor_reference: u8,
    pub(crate) charge_pump_current: u8,
    pub(crate) loop_filter: [u8; 3],
}

#[allow(clippy::too_many_arguments)]
const fn vco(
    min_mhz: u32,
    level: u8,
    varactor: u8,
    bias: u8,
    tcf: u8,
    cal_offset: u8,
    var_ref: u8,
    icp: u8,
    loop_filter: [u8; 3],
) -> VcoSettings {
    VcoSettings {
        min_mhz,
        vco_output_level: level,
        vco_varactor: varactor,
        vco_bias_ref: bias,
        vco_bias_tcf: tcf,
        vco_cal_offset: cal_offset,
        vco_varactor_reference: var_ref,
        charge_pump_current: icp,
        loop_filter,
    }
}

/// VCO settings by band, ascending; the last band whose `min_mhz` does not
/// exceed the VCO frequency applies
pub const VCO_TABLE: [VcoSettings; 9] = [
    vco(6000, 0x0A, 0x0E, 0x06, 0x28, 0x0B, 0x0F, 0x15, [0xF1, 0xFB, 0x0D]),
    vco(6750, 0x0A, 0x0E, 0x06, 0x28, 0x0B, 0x0F, 0x16, [0xF1, 0xFB, 0x0D]),
    vco(7500, 0x0A, 0x0D, 0x06, 0x28, 0x0B, 0x0F, 0x17, [0xF2, 0xFB, 0x0E]),
    vco(8250, 0x0A, 0x0D, 0x06, 0x28, 0x0B, 0x0E, 0x18, [0xF2, 0xFB, 0x0E]),
    vco(9000, 0x0A, 0x0C, 0x06, 0x28, 0x0B, 0x0E, 0x19, [0xE2, 0xF3, 0x0E]),
    vco(9750, 0x0A, 0x0C, 0x06, 0x28, 0x0B, 0x0D, 0x1A, [0xE2, 0xF3, 0x0E]),
    vco(10500, 0x0A, 0x0B, 0x05, 0x28, 0x0B, 0x0D, 0x1B, [0xE3, 0xF3, 0x0F]),
    vco(11250, 0x0A, 0x0B, 0x05, 0x28, 0x0B, 0x0C, 0x1C, [0xE3, 0xF3, 0x0F]),
    vco(12000, 0x0A, 0x0A, 0x05, 0x28, 0x0B, 0x0C, 0x1D, [0xE3, 0xF3, 0x0F]),
];

/// Settings for a VCO frequency in Hz
#[must_use]
pub fn vco_settings(vco_hz: u64) -> &'static VcoSettings {
    let mhz = vco_hz / 1_000_000;
    VCO_TABLE
        .iter()
        .rev()
        .find(|band| u64::from(band.min_mhz) <= mhz)
        .unwrap_or(&VCO_TABLE[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lo_2g4_from_80mhz_reference() {
        let word = RfpllWord::calc(80_000_000, 2_400_000_000);
        assert_eq!(word, RfpllWord { integer: 120, fract: 0, vco_div: 1 });
        assert_eq!(word.vco_frequency(80_000_000), 9_600_000_000);
        assert_eq!(word.frequency(80_000_000), 2_400_000_000);
    }

    #[test]
    fn vco_stays_above_minimum() {
        for lo in [70_000_000u64, 433_920_000, 915_000_000, 3_000_000_001, 6_000_000_000] {
            let word = RfpllWord::calc(80_000_000, lo);
            let vco = word.vco_frequency(80_000_000);
            assert!(vco > MIN_VCO_FREQ, "{lo}: vco {vco}");
            assert!(word.frequency(80_000_000).abs_diff(lo) <= 2, "{lo}");
        }
    }

    #[test]
    fn register_bytes_round_trip() {
        let word = RfpllWord::calc(80_000_000, 5_805_000_123);
        let regs = word.to_registers();
        assert_eq!(RfpllWord::from_registers(regs, word.vco_div), word);
    }

    #[test]
    fn carrier_range_check() {
        assert!(!in_range(69_999_999));
        assert!(in_range(70_000_000));
        assert!(in_range(6_000_000_000));
        assert!(!in_range(6_000_000_001));
    }

    #[test]
    fn vco_band_lookup() {
        assert_eq!(vco_settings(9_600_000_000).min_mhz, 9000);
        assert_eq!(vco_settings(6_000_000_001).min_mhz, 6000);
        assert_eq!(vco_settings(12_000_000_000).min_mhz, 12000);
    }
}
