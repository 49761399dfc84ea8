//! Programmable RX/TX FIR filters
//!
//! Coefficients are written one at a time through the filter's address and
//! data registers with the coefficient clock running. The filter's
//! decimation or interpolation is a divider in the clock chain, so turning
//! a filter on or off re-plans the chain.

use embedded_hal::delay::DelayNs;

use crate::clock::{self, ClockId};
use crate::device::{Ad9361, FirState};
use crate::error::{Error, Result};
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::{Direction, EnsmState};

/// Most coefficients one filter holds
pub const MAX_FIR_TAPS: usize = 128;

/// Which channels a coefficient set is written to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FirChannels {
    /// Channel 1 only
    One,
    /// Channel 2 only
    Two,
    /// Both channels
    #[default]
    Both,
}

impl FirChannels {
    const fn select(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Both => 3,
        }
    }
}

/// A filter to load
#[derive(Clone, Copy, Debug)]
pub struct FirConfig<'a> {
    /// Target channels
    pub channels: FirChannels,
    /// Filter gain in dB: -12, -6, 0 or 6 for RX, -6 or 0 for TX
    pub gain_db: i8,
    /// Decimation (RX) or interpolation (TX): 1, 2 or 4
    pub intdec: u8,
    /// Coefficients; a multiple of 16, 16 to 128 of them
    pub coefficients: &'a [i16],
}

/// Register code for a tap count
#[must_use]
pub fn taps_code(taps: usize) -> Option<u8> {
    if taps == 0 || taps > MAX_FIR_TAPS || taps % 16 != 0 {
        return None;
    }
    Some((taps / 16 - 1) as u8)
}

/// RX filter gain field for `gain_db`
#[must_use]
pub const fn rx_gain_code(gain_db: i8) -> Option<u8> {
    match gain_db {
        6 => Some(0),
        0 => Some(1),
        -6 => Some(2),
        -12 => Some(3),
        _ => None,
    }
}

/// Whether a TX gain of `gain_db` needs the -6 dB bit
#[must_use]
pub const fn tx_gain_minus_6db(gain_db: i8) -> Option<bool> {
    match gain_db {
        0 => Some(false),
        -6 => Some(true),
        _ => None,
    }
}

fn fir_offset(dir: Direction) -> u16 {
    match dir {
        Direction::Tx => 0,
        Direction::Rx => regs::RX_FILTER_COEF_ADDR - regs::TX_FILTER_COEF_ADDR,
    }
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Current FIR state of one direction
    #[must_use]
    pub const fn fir_state(&self, dir: Direction) -> FirState {
        match dir {
            Direction::Rx => self.rx_fir,
            Direction::Tx => self.tx_fir,
        }
    }

    /// Load a coefficient set.
    ///
    /// The chip is held in ALERT while the coefficient RAM is written. The
    /// filter keeps its bypass setting; the new decimation takes effect
    /// the next time the filter is enabled or the clock chain is planned.
    pub fn load_fir(&mut self, dir: Direction, config: &FirConfig<'_>) -> Result<(), T::Error> {
        let taps = config.coefficients.len();
        let Some(taps_code) = taps_code(taps) else {
            return Err(Error::invalid("FIR tap count", taps as i64));
        };
        if !matches!(config.intdec, 1 | 2 | 4) {
            return Err(Error::invalid("FIR decimation", config.intdec));
        }
        let mut conf = field_prep(taps_code, regs::FIR_NUM_TAPS)
            | field_prep(config.channels.select(), regs::FIR_SELECT)
            | regs::FIR_START_CLK;
        let rx_gain = match dir {
            Direction::Rx => Some(rx_gain_code(config.gain_db).ok_or(Error::invalid("RX FIR gain", config.gain_db))?),
            Direction::Tx => {
                if tx_gain_minus_6db(config.gain_db).ok_or(Error::invalid("TX FIR gain", config.gain_db))? {
                    conf |= regs::FIR_TX_GAIN_6DB;
                }
                None
            }
        };

        let token = self.force_state(EnsmState::Alert)?;
        let result = self.write_fir_coefficients(dir, conf, config.coefficients);
        self.restore_state(token)?;
        result?;

        if let Some(code) = rx_gain {
            self.bus.write_field(regs::RX_FILTER_GAIN, regs::FILTER_GAIN, code)?;
        }
        match dir {
            Direction::Rx => self.rx_fir.intdec = config.intdec,
            Direction::Tx => self.tx_fir.intdec = config.intdec,
        }
        info!("{:?} FIR loaded: {} taps, intdec {}", dir, taps, config.intdec);
        Ok(())
    }

    fn write_fir_coefficients(&mut self, dir: Direction, conf: u8, coefficients: &[i16]) -> Result<(), T::Error> {
        let offs = fir_offset(dir);
        self.bus.write(regs::TX_FILTER_CONF + offs, conf)?;
        for (i, &coef) in coefficients.iter().enumerate() {
            let [low, high] = coef.to_le_bytes();
            self.bus.write(regs::TX_FILTER_COEF_ADDR + offs, i as u8)?;
            self.bus.write(regs::TX_FILTER_COEF_WRITE_DATA_1 + offs, low)?;
            self.bus.write(regs::TX_FILTER_COEF_WRITE_DATA_2 + offs, high)?;
            self.bus.write(regs::TX_FILTER_CONF + offs, conf | regs::FIR_WRITE)?;
            // two dummy writes clock the coefficient in
            self.bus.write(regs::TX_FILTER_COEF_READ_DATA_2 + offs, 0)?;
            self.bus.write(regs::TX_FILTER_COEF_READ_DATA_2 + offs, 0)?;
        }
        self.bus.write(regs::TX_FILTER_CONF + offs, conf)?;
        self.bus.write(regs::TX_FILTER_CONF + offs, conf & !regs::FIR_START_CLK)?;
        self.bus.write(regs::TX_FILTER_COEF_READ_DATA_2 + offs, 0)
    }

    /// Enable or bypass the FIR of one direction.
    ///
    /// Re-plans the clock chain for the current RX sample rate with the
    /// new decimation and refreshes everything derived from it.
    pub fn set_fir_enable(&mut self, dir: Direction, enable: bool) -> Result<(), T::Error> {
        let mut rx = self.rx_fir;
        let mut tx = self.tx_fir;
        match dir {
            Direction::Rx => rx.bypass = !enable,
            Direction::Tx => tx.bypass = !enable,
        }
        if rx == self.rx_fir && tx == self.tx_fir {
            return Ok(());
        }

        let rate = self.clocks.rate(ClockId::RxSampl);
        let chain = clock::calculate_rf_clock_chain(rate, self.rate_governor, rx.effective(), tx.effective())
            .ok_or_else(|| Error::invalid("sample rate", clock::clamp_i64(rate)))?;

        self.rx_fir = rx;
        self.tx_fir = tx;
        self.set_trx_clock_chain(chain.rx, chain.tx)?;
        info!("{:?} FIR {}", dir, if enable { "enabled" } else { "bypassed" });
        Ok(())
    }

    /// Clear the FIR enable field of bypassed directions. The clock layer
    /// encodes a pass-through divider as an enabled filter.
    pub(crate) fn write_fir_bypass(&mut self) -> Result<(), T::Error> {
        if self.rx_fir.bypass {
            self.bus.write_field(regs::RX_ENABLE_FILTER_CTRL, regs::FIR_ENABLE, 0)?;
        }
        if self.tx_fir.bypass {
            self.bus.write_field(regs::TX_ENABLE_FILTER_CTRL, regs::FIR_ENABLE, 0)?;
        }
        Ok(())
    }
}
