//! Baseband PLL frequency calculation
//!
//! The BBPLL is fractional-N with a fixed modulus:
//!
//! FBBPLL = FREF × (integer + fract / 2 088 960)
//!
//! Pure arithmetic, testable on the host. Register programming lives in
//! the parent module.

use crate::config::{BBPLL_MODULUS, MAX_BBPLL_FREQ, MIN_BBPLL_FREQ};

/// BBPLL frequency word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BbpllWord {
    /// Integer multiplier
    pub integer: u8,
    /// Fraction numerator, below the modulus
    pub fract: u32,
}

impl BbpllWord {
    /// Solve the word for `rate` from a reference of `parent` Hz.
    ///
    /// The fraction is rounded to the nearest step.
    #[must_use]
    pub fn calc(parent: u64, rate: u64) -> Self {
        let mut integer = rate / parent;
        let rem = rate % parent;
        let mut fract = (rem * BBPLL_MODULUS + parent / 2) / parent;
        if fract >= BBPLL_MODULUS {
            integer += 1;
            fract -= BBPLL_MODULUS;
        }
        Self {
            integer: u8::try_from(integer).unwrap_or(u8::MAX),
            fract: fract as u32,
        }
    }

    /// Output frequency for a reference of `parent` Hz
    #[must_use]
    pub fn frequency(&self, parent: u64) -> u64 {
        let whole = parent * u64::from(self.integer);
        let part = (parent * u64::from(self.fract) + BBPLL_MODULUS / 2) / BBPLL_MODULUS;
        whole + part
    }

    /// Register bytes: integer word, then fraction bits 20:16, 15:8, 7:0
    #[must_use]
    pub const fn to_registers(&self) -> (u8, [u8; 3]) {
        let f = self.fract;
        (
            self.integer,
            [((f >> 16) & 0x1F) as u8, (f >> 8) as u8, f as u8],
        )
    }

    /// Inverse of [`Self::to_registers`]
    #[must_use]
    pub const fn from_registers(integer: u8, fract: [u8; 3]) -> Self {
        Self {
            integer,
            fract: ((fract[0] as u32 & 0x1F) << 16) | ((fract[1] as u32) << 8) | fract[2] as u32,
        }
    }
}

/// Whether `rate` lies inside the BBPLL window
#[must_use]
pub const fn in_range(rate: u64) -> bool {
    rate >= MIN_BBPLL_FREQ && rate <= MAX_BBPLL_FREQ
}

/// Nearest achievable BBPLL rate, clamped to the BBPLL window
#[must_use]
pub fn round_rate(parent: u64, rate: u64) -> u64 {
    let rate = rate.clamp(MIN_BBPLL_FREQ, MAX_BBPLL_FREQ);
    BbpllWord::calc(parent, rate).frequency(parent)
}

/// Charge pump current code for a target rate.
///
/// Scales 150 µA at 1280 MHz from a 40 MHz reference; 25 µA per LSB with a
/// 25 µA offset, clamped to the 6-bit field.
#[must_use]
pub fn charge_pump_code(parent: u64, rate: u64) -> u8 {
    let den = (parent >> 7) * 32;
    if den == 0 {
        return 1;
    }
    let icp_ua = ((rate >> 7) * 150 + den / 2) / den;
    let code = ((icp_ua + 12) / 25).saturating_sub(1);
    code.clamp(1, 63) as u8
}

/// Loop filter settings written with every rate change
pub const LOOP_FILTER: [u8; 3] = [0x35, 0x5B, 0xE8];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ratio_has_no_fraction() {
        let word = BbpllWord::calc(40_000_000, 800_000_000);
        assert_eq!(word, BbpllWord { integer: 20, fract: 0 });
        assert_eq!(word.frequency(40_000_000), 800_000_000);
    }

    #[test]
    fn rounded_rate_within_one_step() {
        let parent = 40_000_000u64;
        let step = parent / BBPLL_MODULUS + 1;
        for rate in [737_280_000u64, 983_040_000, 1_024_000_000, 1_228_800_001] {
            let got = round_rate(parent, rate);
            assert!(got.abs_diff(rate) <= step, "{rate} -> {got}");
        }
    }

    #[test]
    fn round_clamps_to_window() {
        assert_eq!(round_rate(40_000_000, 100_000_000), round_rate(40_000_000, MIN_BBPLL_FREQ));
        assert!(round_rate(40_000_000, 5_000_000_000) <= MAX_BBPLL_FREQ + 20);
    }

    #[test]
    fn register_bytes_round_trip() {
        let word = BbpllWord::calc(40_000_000, 983_040_000);
        let (integer, fract) = word.to_registers();
        assert_eq!(integer, 24);
        assert_eq!(BbpllWord::from_registers(integer, fract), word);
    }

    #[test]
    fn charge_pump_nominal_point() {
        // 150 µA at 1280 MHz / 40 MHz
        assert_eq!(charge_pump_code(40_000_000, 1_280_000_000), 5);
        assert_eq!(charge_pump_code(40_000_000, 715_829_067), 2);
    }
}
