//! Digital interface timing calibration
//!
//! The data port delays are swept while the baseband processor checks a
//! PRBS pattern. RX timing is tuned with the chip's BIST generator driving
//! the port, TX timing with the baseband pattern looped back through the
//! chip's data port. Each sweep covers
//! the clock-delay and data-delay axes at a low and at the operating
//! sample rate; a delay only counts as good if it passed every run.

use embedded_hal::delay::DelayNs;

use crate::calib::search::{find_opt, Run};
use crate::clock::{self, ClockId};
use crate::config::{DIG_TUNE_LOW_RATE, DIG_TUNE_SETTLE_MS, DIG_TUNE_TAPS};
use crate::device::Ad9361;
use crate::error::{Calibration, Error, Result};
use crate::params::DigTuneSkip;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::Direction;

/// Test-pattern access to the baseband side of the data port.
///
/// Implemented by the FPGA or baseband layer that owns the other end of
/// the interface. The chip side of the test (PRBS source, loopback) is
/// programmed by the driver.
pub trait DataPathMonitor {
    /// Start or stop the baseband checker (RX), or generator and checker
    /// (TX, with the chip looping the data back).
    fn enable_test_pattern(&mut self, dir: Direction, enable: bool);

    /// Clear the pattern checker's error flags.
    fn reset_status(&mut self);

    /// Whether the checker saw the pattern without errors since the last
    /// reset.
    fn pattern_ok(&mut self) -> bool;
}

/// Delay pair chosen by a tuning run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterfaceDelay {
    /// Clock delay tap
    pub clk: u8,
    /// Data delay tap
    pub data: u8,
}

/// Pick the delay pair from the passing windows of both axes.
///
/// The wider window wins; on a tie the clock axis is used. Returns `None`
/// when neither axis passed anywhere.
#[must_use]
pub fn select_delay(clk: Run, data: Run) -> Option<InterfaceDelay> {
    if clk.is_empty() && data.is_empty() {
        return None;
    }
    Some(if clk.len >= data.len {
        InterfaceDelay {
            clk: clk.center() as u8,
            data: 0,
        }
    } else {
        InterfaceDelay {
            clk: 0,
            data: data.center() as u8,
        }
    })
}

#[derive(Clone, Copy)]
enum Axis {
    Clock,
    Data,
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Tune the digital interface delays.
    ///
    /// Fails with [`Error::ConvergenceFailure`] when a direction has no
    /// passing delay on either axis. The clock chain in use before the call
    /// is restored either way.
    pub fn dig_tune<M: DataPathMonitor>(&mut self, monitor: &mut M, skip: DigTuneSkip) -> Result<(), T::Error> {
        if skip == DigTuneSkip::All {
            debug!("digital interface tuning skipped");
            return Ok(());
        }

        let saved = self.chain;
        let operating = self.clocks.rate(ClockId::RxSampl);

        let mut result = self.dig_tune_direction(monitor, Direction::Rx, operating);
        if result.is_ok() && skip != DigTuneSkip::Tx {
            result = self.dig_tune_direction(monitor, Direction::Tx, operating);
        }

        let restored = match saved {
            Some(chain) => self.apply_clock_chain(chain.rx, chain.tx),
            None => Ok(()),
        };
        result.and(restored)
    }

    fn dig_tune_direction<M: DataPathMonitor>(
        &mut self,
        monitor: &mut M,
        dir: Direction,
        operating: u64,
    ) -> Result<(), T::Error> {
        let mut clk_field = [0u8; DIG_TUNE_TAPS];
        let mut data_field = [0u8; DIG_TUNE_TAPS];

        let mut rates = [DIG_TUNE_LOW_RATE, operating];
        let runs = if operating > DIG_TUNE_LOW_RATE { 2 } else { 1 };
        if runs == 1 {
            rates[0] = operating;
        }

        let sweep = match self.dig_tune_test_mode(dir, true) {
            Ok(()) => {
                monitor.enable_test_pattern(dir, true);
                let sweep = self.dig_tune_runs(monitor, dir, &rates[..runs], &mut clk_field, &mut data_field);
                monitor.enable_test_pattern(dir, false);
                sweep
            }
            Err(e) => Err(e),
        };
        let cleared = self.dig_tune_test_mode(dir, false);
        sweep.and(cleared)?;

        let clk = find_opt(&clk_field);
        let data = find_opt(&data_field);
        let Some(delay) = select_delay(clk, data) else {
            error!("{:?} interface tuning: no passing delay", dir);
            let which = match dir {
                Direction::Rx => Calibration::DigitalRx,
                Direction::Tx => Calibration::DigitalTx,
            };
            return Err(Error::ConvergenceFailure(which));
        };

        let (clk_delay, data_delay) = match dir {
            Direction::Rx => (self.params.port_ctrl.rx_clk_delay, self.params.port_ctrl.rx_data_delay),
            Direction::Tx => (self.params.port_ctrl.tx_clk_delay, self.params.port_ctrl.tx_data_delay),
        };
        info!(
            "{:?} interface delay: clk {} data {} (was {}/{})",
            dir, delay.clk, delay.data, clk_delay, data_delay
        );
        self.write_interface_delay(dir, delay.clk, delay.data)
    }

    /// Chip side of the interface test: PRBS onto the RX port, or TX to RX
    /// loopback. Disabling clears both.
    fn dig_tune_test_mode(&mut self, dir: Direction, enable: bool) -> Result<(), T::Error> {
        if enable {
            match dir {
                Direction::Rx => self.set_bist_prbs(true),
                Direction::Tx => self.set_bist_loopback(true),
            }
        } else {
            self.set_bist_prbs(false)?;
            self.set_bist_loopback(false)
        }
    }

    /// Drive the RX data port from the chip's PRBS generator.
    pub fn set_bist_prbs(&mut self, enable: bool) -> Result<(), T::Error> {
        let value = if enable {
            field_prep(regs::BIST_POINT_RX, regs::BIST_CTRL_POINT) | regs::BIST_ENABLE
        } else {
            0
        };
        self.bus.write(regs::BIST_CONFIG, value)
    }

    /// Loop the TX data port back onto the RX data port inside the chip.
    pub fn set_bist_loopback(&mut self, enable: bool) -> Result<(), T::Error> {
        let mut observe = self.bus.read(regs::OBSERVE_CONFIG)?;
        observe &= !(regs::DATA_PORT_SP_HD_LOOP_TEST_OE | regs::DATA_PORT_LOOP_TEST_ENABLE);
        if enable {
            // single-port half-duplex needs the port output enabled too
            let port = self.bus.read(regs::PARALLEL_PORT_CONF_3)?;
            if port & regs::SINGLE_PORT_MODE != 0 && port & regs::HALF_DUPLEX_MODE != 0 {
                observe |= regs::DATA_PORT_SP_HD_LOOP_TEST_OE;
            }
            observe |= regs::DATA_PORT_LOOP_TEST_ENABLE;
        }
        self.bus.write(regs::OBSERVE_CONFIG, observe)
    }

    fn dig_tune_runs<M: DataPathMonitor>(
        &mut self,
        monitor: &mut M,
        dir: Direction,
        rates: &[u64],
        clk_field: &mut [u8; DIG_TUNE_TAPS],
        data_field: &mut [u8; DIG_TUNE_TAPS],
    ) -> Result<(), T::Error> {
        for &rate in rates {
            self.dig_tune_rate(rate)?;
            self.dig_tune_sweep(monitor, dir, Axis::Clock, clk_field)?;
            self.dig_tune_sweep(monitor, dir, Axis::Data, data_field)?;
        }
        Ok(())
    }

    fn dig_tune_rate(&mut self, rate: u64) -> Result<(), T::Error> {
        if self.clocks.rate(ClockId::RxSampl) == rate {
            return Ok(());
        }
        let chain = clock::calculate_rf_clock_chain(
            rate,
            self.rate_governor,
            self.rx_fir.effective(),
            self.tx_fir.effective(),
        )
        .ok_or_else(|| Error::invalid("tuning sample rate", clock::clamp_i64(rate)))?;
        self.apply_clock_chain(chain.rx, chain.tx)
    }

    /// Sweep one axis, marking taps that fail in `field`.
    fn dig_tune_sweep<M: DataPathMonitor>(
        &mut self,
        monitor: &mut M,
        dir: Direction,
        axis: Axis,
        field: &mut [u8; DIG_TUNE_TAPS],
    ) -> Result<(), T::Error> {
        for (tap, score) in field.iter_mut().enumerate() {
            let tap = tap as u8;
            let (clk, data) = match axis {
                Axis::Clock => (tap, 0),
                Axis::Data => (0, tap),
            };
            self.write_interface_delay(dir, clk, data)?;
            monitor.reset_status();
            self.bus.sleep_ms(DIG_TUNE_SETTLE_MS);
            *score |= u8::from(!monitor.pattern_ok());
        }
        Ok(())
    }
}
