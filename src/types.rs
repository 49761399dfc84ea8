//! Shared types used across the driver
//!
//! Small enums that name hardware concepts: ENSM states, signal
//! directions, channels and gain-control modes.

use core::fmt;

/// Enable State Machine state as reported by the STATE register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnsmState {
    /// Clocks gated, lowest power
    Sleep,
    /// Transition state out of sleep
    SleepWait,
    /// Synthesizers up, RX/TX off
    Alert,
    /// TDD receive
    Rx,
    /// TDD receive flush
    RxFlush,
    /// TDD transmit
    Tx,
    /// TDD transmit flush
    TxFlush,
    /// Full duplex
    Fdd,
    /// Full duplex flush
    FddFlush,
    /// Unknown or not recorded
    Invalid,
}

impl EnsmState {
    /// Decode the STATE register field.
    #[must_use]
    pub const fn from_reg(value: u8) -> Self {
        match value {
            0x0 => Self::SleepWait,
            0x5 => Self::Alert,
            0x6 => Self::Tx,
            0x7 => Self::TxFlush,
            0x8 => Self::Rx,
            0x9 => Self::RxFlush,
            0xA => Self::Fdd,
            0xB => Self::FddFlush,
            0x80 => Self::Sleep,
            _ => Self::Invalid,
        }
    }

    /// Encoding used by the STATE register
    #[must_use]
    pub const fn as_reg(self) -> u8 {
        match self {
            Self::SleepWait => 0x0,
            Self::Alert => 0x5,
            Self::Tx => 0x6,
            Self::TxFlush => 0x7,
            Self::Rx => 0x8,
            Self::RxFlush => 0x9,
            Self::Fdd => 0xA,
            Self::FddFlush => 0xB,
            Self::Sleep => 0x80,
            Self::Invalid => 0xFF,
        }
    }

    /// True for the states only reachable in TDD operation
    #[must_use]
    pub const fn is_tdd_only(self) -> bool {
        matches!(self, Self::Rx | Self::Tx | Self::RxFlush | Self::TxFlush)
    }

    /// True for the states only reachable in FDD operation
    #[must_use]
    pub const fn is_fdd_only(self) -> bool {
        matches!(self, Self::Fdd | Self::FddFlush)
    }
}

impl fmt::Display for EnsmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sleep => "sleep",
            Self::SleepWait => "sleep_wait",
            Self::Alert => "alert",
            Self::Rx => "rx",
            Self::RxFlush => "rx_flush",
            Self::Tx => "tx",
            Self::TxFlush => "tx_flush",
            Self::Fdd => "fdd",
            Self::FddFlush => "fdd_flush",
            Self::Invalid => "invalid",
        };
        f.write_str(name)
    }
}

/// Signal direction of a synthesizer or data path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Receive path
    Rx,
    /// Transmit path
    Tx,
}

impl Direction {
    /// Offset of this direction's synthesizer register bank
    #[must_use]
    pub const fn synth_offset(self) -> u16 {
        match self {
            Self::Rx => 0,
            Self::Tx => crate::regs::TX_SYNTH_OFFSET,
        }
    }

    /// Index for per-direction arrays
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Rx => 0,
            Self::Tx => 1,
        }
    }
}

/// Receive or transmit channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Channel 1
    One,
    /// Channel 2
    Two,
}

impl Channel {
    /// Index for per-channel arrays
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Receive gain control mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GainControlMode {
    /// Manual gain control
    #[default]
    Manual,
    /// Fast-attack AGC
    FastAttack,
    /// Slow-attack AGC
    SlowAttack,
    /// Hybrid AGC
    Hybrid,
}

impl GainControlMode {
    /// Two-bit encoding used in AGC_CONFIG_1
    #[must_use]
    pub const fn as_reg(self) -> u8 {
        match self {
            Self::Manual => 0,
            Self::FastAttack => 1,
            Self::SlowAttack => 2,
            Self::Hybrid => 3,
        }
    }
}

/// RF gain-table band selected by the RX carrier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GainBand {
    /// Up to 1.3 GHz
    Low,
    /// 1.3 GHz to 4 GHz
    Mid,
    /// Above 4 GHz
    High,
}

impl GainBand {
    /// Band for a carrier frequency in Hz
    #[must_use]
    pub const fn from_frequency(freq: u64) -> Self {
        if freq <= crate::config::GT_BAND_LOW_MAX {
            Self::Low
        } else if freq <= crate::config::GT_BAND_MID_MAX {
            Self::Mid
        } else {
            Self::High
        }
    }

    /// Table index
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Mid => 1,
            Self::High => 2,
        }
    }
}

/// Clock output pin source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOutMode {
    /// Output disabled
    #[default]
    Disabled,
    /// Buffered reference
    Reference,
    /// ADC clock divided by 2
    AdcDiv2,
    /// ADC clock divided by 3
    AdcDiv3,
    /// ADC clock divided by 4
    AdcDiv4,
    /// ADC clock divided by 8
    AdcDiv8,
    /// ADC clock divided by 16
    AdcDiv16,
}

impl ClockOutMode {
    /// Select field value, `None` when disabled
    #[must_use]
    pub const fn select(self) -> Option<u8> {
        match self {
            Self::Disabled => None,
            Self::Reference => Some(0),
            Self::AdcDiv2 => Some(1),
            Self::AdcDiv3 => Some(2),
            Self::AdcDiv4 => Some(3),
            Self::AdcDiv8 => Some(4),
            Self::AdcDiv16 => Some(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensm_state_encoding_is_stable() {
        for state in [
            EnsmState::Sleep,
            EnsmState::SleepWait,
            EnsmState::Alert,
            EnsmState::Rx,
            EnsmState::RxFlush,
            EnsmState::Tx,
            EnsmState::TxFlush,
            EnsmState::Fdd,
            EnsmState::FddFlush,
        ] {
            assert_eq!(EnsmState::from_reg(state.as_reg()), state);
        }
        assert_eq!(EnsmState::from_reg(0x3), EnsmState::Invalid);
    }

    #[test]
    fn gain_band_edges() {
        assert_eq!(GainBand::from_frequency(1_300_000_000), GainBand::Low);
        assert_eq!(GainBand::from_frequency(1_300_000_001), GainBand::Mid);
        assert_eq!(GainBand::from_frequency(4_000_000_000), GainBand::Mid);
        assert_eq!(GainBand::from_frequency(5_800_000_000), GainBand::High);
    }
}
