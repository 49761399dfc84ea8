//! Device context and bring-up
//!
//! [`Ad9361`] owns everything that belongs to one physical chip: its
//! register bus, the initialization record, the clock graph and the
//! software view of the ENSM. All operations take `&mut self`, so one
//! context never runs two operations at once. Several contexts may share
//! one transport through `&mut T` with distinct chip ids.
//!
//! The other modules add `impl` blocks for their own concerns (ENSM,
//! calibrations, gain control, fast lock, FIR, auxiliary I/O).

use embedded_hal::delay::DelayNs;

use crate::calib::DataPathMonitor;
use crate::clock::{self, ClockChain, ClockGraph, ClockId, RateGovernor};
use crate::config::{
    MAX_SYNTH_REF, MAX_TX_ATTEN_MDB, PRODUCT_ID_AD9361, TX_ATTEN_STEP_MDB,
};
use crate::error::{Error, Result, SetupStep};
use crate::params::InitParams;
use crate::regs;
use crate::transport::{RegisterBus, RegisterTransport};
use crate::types::{Channel, Direction, EnsmState, GainBand, GainControlMode};

/// Calibration tracking loops that run while the chip is active
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackingState {
    /// Baseband DC offset tracking
    pub bbdc: bool,
    /// RF DC offset tracking
    pub rfdc: bool,
    /// RX quadrature tracking
    pub quad: bool,
}

/// FIR state of one direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirState {
    /// FIR is bypassed
    pub bypass: bool,
    /// Decimation (RX) or interpolation (TX): 1, 2 or 4
    pub intdec: u8,
}

impl Default for FirState {
    fn default() -> Self {
        Self {
            bypass: true,
            intdec: 1,
        }
    }
}

impl FirState {
    /// Rate change applied by the FIR stage
    #[must_use]
    pub fn effective(&self) -> u64 {
        if self.bypass {
            1
        } else {
            u64::from(self.intdec.max(1))
        }
    }
}

/// One AD9361 and its driver state
pub struct Ad9361<T, D> {
    pub(crate) bus: RegisterBus<T, D>,
    pub(crate) params: InitParams,
    pub(crate) clocks: ClockGraph,
    pub(crate) ensm: EnsmState,
    pub(crate) gain_band: Option<GainBand>,
    pub(crate) gain_mode: [GainControlMode; 2],
    pub(crate) last_tx_quad_cal_phase: Option<u8>,
    pub(crate) last_tx_quad_cal_freq: u64,
    pub(crate) rx_fir: FirState,
    pub(crate) tx_fir: FirState,
    pub(crate) tracking: TrackingState,
    pub(crate) fastlock: [Option<u8>; 2],
    pub(crate) current_rx_bw: u32,
    pub(crate) current_tx_bw: u32,
    pub(crate) chain: Option<ClockChain>,
    pub(crate) rate_governor: RateGovernor,
    pub(crate) ready: bool,
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Create a context for the chip at `chip`. No register is touched
    /// until [`Self::init`].
    pub fn new(transport: T, delay: D, chip: u8, params: InitParams) -> Self {
        let gain_mode = [params.gain_ctrl.rx1_mode, params.gain_ctrl.rx2_mode];
        Self {
            bus: RegisterBus::new(transport, delay, chip),
            clocks: ClockGraph::new(params.reference_clk_rate),
            gain_mode,
            params,
            ensm: EnsmState::Invalid,
            gain_band: None,
            last_tx_quad_cal_phase: None,
            last_tx_quad_cal_freq: 0,
            rx_fir: FirState::default(),
            tx_fir: FirState::default(),
            tracking: TrackingState::default(),
            fastlock: [None; 2],
            current_rx_bw: 0,
            current_tx_bw: 0,
            chain: None,
            rate_governor: RateGovernor::default(),
            ready: false,
        }
    }

    /// Release transport and delay.
    pub fn free(self) -> (T, D) {
        self.bus.free()
    }

    /// Initialization record in use
    #[must_use]
    pub const fn params(&self) -> &InitParams {
        &self.params
    }

    /// Clock graph with the last derived rates
    #[must_use]
    pub const fn clocks(&self) -> &ClockGraph {
        &self.clocks
    }

    /// Whether the last `init` completed
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Select the oversampling policy used by [`Self::set_sample_rate`].
    pub fn set_rate_governor(&mut self, governor: RateGovernor) {
        self.rate_governor = governor;
    }

    /// Run the full bring-up sequence.
    ///
    /// A product-ID mismatch returns [`Error::DeviceNotFound`] before any
    /// register is written. Any later failure stops the sequence and is
    /// reported as [`Error::SetupAborted`] naming the step.
    pub fn init(&mut self) -> Result<(), T::Error> {
        self.ready = false;

        let id = self.bus.read(regs::PRODUCT_ID)?;
        if id & regs::PRODUCT_ID_MASK != PRODUCT_ID_AD9361 {
            error!("unsupported product id {:#x}", id);
            return Err(Error::DeviceNotFound { product_id: id });
        }
        info!("AD9361 found, revision {}", id & regs::REV_MASK);

        let p = self.params.clone();

        self.clocks = ClockGraph::new(p.reference_clk_rate);
        self.gain_band = None;
        self.last_tx_quad_cal_phase = None;
        self.ensm = EnsmState::Invalid;
        self.fastlock = [None; 2];

        step(SetupStep::ReferenceClocks, self.setup_reference(&p))?;
        step(SetupStep::ClockChain, self.apply_clock_chain(p.rx_path_clock_frequencies, p.tx_path_clock_frequencies))?;
        step(SetupStep::PortConfig, self.setup_ports(&p))?;
        step(SetupStep::AuxConverters, self.auxdac_setup())?;
        step(SetupStep::AuxConverters, self.auxadc_setup())?;
        step(SetupStep::ControlOutputs, self.ctrl_outs_setup())?;
        step(SetupStep::ControlOutputs, self.gpo_setup())?;
        step(
            SetupStep::ControlOutputs,
            self.bus.write(regs::REFERENCE_CLOCK_CYCLES, reference_clock_cycles(p.reference_clk_rate)),
        )?;
        step(SetupStep::ExternalLna, self.elna_setup())?;

        let synth_ref = p.trx_synthesizer_target_fref_overwrite_hz.min(MAX_SYNTH_REF);
        step(SetupStep::SynthReference, self.set_rate(ClockId::RxRefClk, synth_ref).map(drop))?;
        step(SetupStep::SynthReference, self.set_rate(ClockId::TxRefClk, synth_ref).map(drop))?;

        step(SetupStep::ChargePumpCal, self.txrx_synth_cp_calib(Direction::Rx))?;
        step(SetupStep::ChargePumpCal, self.txrx_synth_cp_calib(Direction::Tx))?;
        self.ensm = EnsmState::Alert;

        step(SetupStep::LoSetup, self.set_rx_lo_freq(p.rx_synthesizer_frequency))?;
        step(SetupStep::LoSetup, self.program_tx_lo(p.tx_synthesizer_frequency).map(drop))?;

        step(SetupStep::MixerSubTable, self.load_mixer_gm_subtable())?;
        step(SetupStep::GainControl, self.gain_control_setup())?;

        step(SetupStep::FilterCal, self.update_rf_bandwidth(p.rf_rx_bandwidth_hz, p.rf_tx_bandwidth_hz))?;

        step(SetupStep::DcOffsetCal, self.bb_dc_offset_calib())?;
        step(SetupStep::DcOffsetCal, self.rf_dc_offset_calib(p.rx_synthesizer_frequency))?;

        step(SetupStep::TxQuadCal, self.tx_quad_calib(None))?;
        self.last_tx_quad_cal_freq = p.tx_synthesizer_frequency;

        step(
            SetupStep::Tracking,
            self.tracking_control(
                p.bb_dc_offset_tracking_enable,
                p.rf_dc_offset_tracking_enable,
                p.quad_tracking_enable,
            ),
        )?;

        if !p.frequency_division_duplex_mode && p.txmon_ctrl.txmon_cal_enable {
            step(SetupStep::TxMonitorCal, self.txmon_calibration())?;
        }

        step(SetupStep::PortConfig, self.bus.write(regs::PARALLEL_PORT_CONF_3, p.port_ctrl.pp_conf[2]))?;
        step(SetupStep::EnsmMode, self.ensm_mode_setup(&p))?;
        step(
            SetupStep::TxAttenuation,
            self.set_tx_attenuation(p.tx_attenuation_mdb, true, true, true),
        )?;
        step(SetupStep::Rssi, self.rssi_setup(false))?;
        step(SetupStep::ClockOutput, self.clk_out_setup(p.clk_output_mode_select))?;
        step(SetupStep::TxMonitor, self.txmon_setup())?;
        step(SetupStep::OperatingState, self.set_ensm_state(p.operating_state()))?;

        self.ready = true;
        info!(
            "setup done: rx lo {} Hz, tx lo {} Hz",
            self.clocks.rate(ClockId::RxRfpll),
            self.clocks.rate(ClockId::TxRfpll)
        );
        Ok(())
    }

    /// Tune the digital interface and reapply the clock chain.
    pub fn post_setup<M: DataPathMonitor>(&mut self, monitor: &mut M) -> Result<(), T::Error> {
        let skip = self.params.digital_interface_tune_skip_mode;
        step(SetupStep::DigitalTune, self.dig_tune(monitor, skip))?;
        if let Some(chain) = self.chain {
            step(SetupStep::ClockChain, self.set_trx_clock_chain(chain.rx, chain.tx))?;
        }
        Ok(())
    }

    fn setup_reference(&mut self, p: &InitParams) -> Result<(), T::Error> {
        let mut clocks = regs::DIGITAL_POWER_UP | regs::CLOCK_ENABLE_DFLT | regs::BBPLL_ENABLE;
        if p.xo_disable_use_ext_refclk {
            clocks |= regs::XO_BYPASS;
        }
        self.bus.write(regs::CLOCK_ENABLE, clocks)?;
        self.set_rate(ClockId::BbRefClk, p.reference_clk_rate)?;
        Ok(())
    }

    fn setup_ports(&mut self, p: &InitParams) -> Result<(), T::Error> {
        let rx_mask = channel_mask(p.two_rx_two_tx_mode, p.one_rx_one_tx_use_rx_num);
        let tx_mask = channel_mask(p.two_rx_two_tx_mode, p.one_rx_one_tx_use_tx_num);
        self.bus.write_field(regs::RX_ENABLE_FILTER_CTRL, regs::CHANNEL_ENABLE, rx_mask)?;
        self.bus.write_field(regs::TX_ENABLE_FILTER_CTRL, regs::CHANNEL_ENABLE, tx_mask)?;

        let tx_port = if p.tx_rf_port_input_select == 0 { 0 } else { regs::TX_OUTPUT_SELECT };
        self.bus.write(regs::INPUT_SELECT, (p.rx_rf_port_input_select & regs::RX_INPUT_SELECT) | tx_port)?;

        let port = &p.port_ctrl;
        self.bus.write(regs::PARALLEL_PORT_CONF_1, port.pp_conf[0])?;
        self.bus.write(regs::PARALLEL_PORT_CONF_2, port.pp_conf[1])?;
        self.bus.write(regs::PARALLEL_PORT_CONF_3, port.pp_conf[2])?;
        self.write_interface_delay(Direction::Rx, port.rx_clk_delay, port.rx_data_delay)?;
        self.write_interface_delay(Direction::Tx, port.tx_clk_delay, port.tx_data_delay)?;
        self.bus.write(regs::DIGITAL_IO_CTRL, port.digital_io_ctrl)?;

        let bias = u8::try_from(port.lvds_bias_mv.saturating_sub(75) / 75).unwrap_or(7) & regs::LVDS_BIAS;
        let term = if port.lvds_rx_onchip_termination { regs::LVDS_RX_ON_CHIP_TERM } else { 0 };
        self.bus.write(regs::LVDS_BIAS_CTRL, bias | term)?;
        self.bus.write(regs::LVDS_INVERT_CTRL1, port.lvds_invert[0])?;
        self.bus.write(regs::LVDS_INVERT_CTRL2, port.lvds_invert[1])
    }

    pub(crate) fn write_interface_delay(
        &mut self,
        dir: Direction,
        clk_delay: u8,
        data_delay: u8,
    ) -> Result<(), T::Error> {
        let addr = match dir {
            Direction::Rx => regs::RX_CLOCK_DATA_DELAY,
            Direction::Tx => regs::TX_CLOCK_DATA_DELAY,
        };
        self.bus.write(
            addr,
            crate::transport::field_prep(clk_delay, regs::DATA_CLK_DELAY)
                | crate::transport::field_prep(data_delay, regs::DATA_DELAY),
        )
    }

    fn ensm_mode_setup(&mut self, p: &InitParams) -> Result<(), T::Error> {
        let mut config_2 = 0;
        if p.tdd_use_dual_synth_mode || p.frequency_division_duplex_mode {
            config_2 |= regs::DUAL_SYNTH_MODE;
        }
        if !p.frequency_division_duplex_mode && !p.tdd_use_dual_synth_mode {
            config_2 |= regs::TXNRX_SPI_CTRL;
        }
        if p.rx1rx2_phase_inversion_enable {
            config_2 |= regs::INVERT_RX2;
        }
        self.bus.write(regs::ENSM_CONFIG_2, config_2)?;

        let mode = if p.frequency_division_duplex_mode { regs::FDD_MODE } else { 0 };
        self.bus.write(regs::ENSM_MODE, mode)?;

        let mut config_1 = regs::TO_ALERT | regs::FORCE_ALERT_STATE;
        if !p.ensm_enable_pin_pulse_mode {
            config_1 |= regs::LEVEL_MODE;
        }
        if p.ensm_enable_pin_ctrl {
            config_1 |= regs::ENABLE_ENSM_PIN_CTRL;
        }
        self.bus.write(regs::ENSM_CONFIG_1, config_1)
    }

    // ------------------------------------------------------------------
    // Clocks
    // ------------------------------------------------------------------

    /// Re-read a clock from hardware.
    pub fn get_rate(&mut self, id: ClockId) -> Result<u64, T::Error> {
        self.clocks.get_rate(&mut self.bus, id)
    }

    /// Nearest achievable rate for a clock. Writes nothing.
    #[must_use]
    pub fn round_rate(&self, id: ClockId, rate: u64) -> u64 {
        self.clocks.round_rate(id, rate)
    }

    /// Program a clock and re-derive its descendants.
    pub fn set_rate(&mut self, id: ClockId, rate: u64) -> Result<u64, T::Error> {
        self.clocks.set_rate(&mut self.bus, id, rate)
    }

    pub(crate) fn apply_clock_chain(&mut self, rx: [u64; 6], tx: [u64; 6]) -> Result<(), T::Error> {
        use clock::path::{ADC_DAC, BBPLL, HB1, HB2, HB3, SAMPL};

        self.set_rate(ClockId::Bbpll, rx[BBPLL])?;
        for (rx_id, tx_id, n) in [
            (ClockId::Adc, ClockId::Dac, ADC_DAC),
            (ClockId::R2, ClockId::T2, HB3),
            (ClockId::R1, ClockId::T1, HB2),
            (ClockId::ClkRf, ClockId::ClkTf, HB1),
            (ClockId::RxSampl, ClockId::TxSampl, SAMPL),
        ] {
            self.set_rate(rx_id, rx[n])?;
            self.set_rate(tx_id, tx[n])?;
        }
        self.write_fir_bypass()?;
        self.chain = Some(ClockChain { rx, tx });
        debug!("clock chain: bbpll {} Hz, rx sample {} Hz, tx sample {} Hz", rx[BBPLL], rx[SAMPL], tx[SAMPL]);
        Ok(())
    }

    /// Apply RX and TX path clock vectors, then refresh everything that
    /// depends on the baseband clocks.
    pub fn set_trx_clock_chain(&mut self, rx: [u64; 6], tx: [u64; 6]) -> Result<(), T::Error> {
        self.apply_clock_chain(rx, tx)?;
        self.bb_clock_changed()
    }

    /// Refresh settings derived from the baseband clocks: gain control
    /// timing, RSSI timing and the aux ADC clock.
    pub fn bb_clock_changed(&mut self) -> Result<(), T::Error> {
        self.gain_update()?;
        self.rssi_setup(true)?;
        self.auxadc_setup()
    }

    /// Change the baseband sample rate.
    ///
    /// Plans a new clock chain for the current FIR settings, applies it and
    /// re-runs the bandwidth calibrations for the new BBPLL rate.
    pub fn set_sample_rate(&mut self, rate: u64) -> Result<(), T::Error> {
        let chain = clock::calculate_rf_clock_chain(
            rate,
            self.rate_governor,
            self.rx_fir.effective(),
            self.tx_fir.effective(),
        )
        .ok_or_else(|| Error::invalid("sample rate", clock::clamp_i64(rate)))?;

        self.set_trx_clock_chain(chain.rx, chain.tx)?;

        let rx_bw = nonzero_or(self.current_rx_bw, self.params.rf_rx_bandwidth_hz);
        let tx_bw = nonzero_or(self.current_tx_bw, self.params.rf_tx_bandwidth_hz);
        self.current_rx_bw = 0;
        self.current_tx_bw = 0;
        let token = self.force_state(EnsmState::Alert)?;
        let result = self.update_rf_bandwidth(rx_bw, tx_bw);
        let restored = self.restore_state(token);
        result.and(restored)?;
        info!("sample rate {} Hz", rate);
        Ok(())
    }

    /// TX sample rate read back from hardware
    pub fn get_sample_rate(&mut self) -> Result<u64, T::Error> {
        self.get_rate(ClockId::TxSampl)
    }

    // ------------------------------------------------------------------
    // Local oscillators
    // ------------------------------------------------------------------

    /// Tune the RX LO. Reloads the gain table when the band changes.
    pub fn set_rx_lo_freq(&mut self, freq: u64) -> Result<(), T::Error> {
        if !clock::rfpll::in_range(freq) {
            return Err(Error::invalid("RX LO frequency", clock::clamp_i64(freq)));
        }
        self.fastlock_unprepare(Direction::Rx)?;
        self.set_rate(ClockId::RxRfpll, freq)?;
        self.load_gain_table(freq)?;
        info!("rx lo {} Hz", self.clocks.rate(ClockId::RxRfpll));
        Ok(())
    }

    /// RX LO read back from hardware
    pub fn get_rx_lo_freq(&mut self) -> Result<u64, T::Error> {
        self.get_rate(ClockId::RxRfpll)
    }

    /// Tune the TX LO. Re-runs the TX quadrature calibration when the LO
    /// moved more than the configured threshold since the last one.
    pub fn set_tx_lo_freq(&mut self, freq: u64) -> Result<(), T::Error> {
        if !clock::rfpll::in_range(freq) {
            return Err(Error::invalid("TX LO frequency", clock::clamp_i64(freq)));
        }
        let rate = self.program_tx_lo(freq)?;
        if self.ready && rate.abs_diff(self.last_tx_quad_cal_freq) > self.params.cal_threshold_freq {
            debug!("tx lo moved to {} Hz, recalibrating quadrature", rate);
            let token = self.force_state(EnsmState::Alert)?;
            let cal = self.tx_quad_calib(self.last_tx_quad_cal_phase);
            let restored = self.restore_state(token);
            cal.and(restored)?;
            self.last_tx_quad_cal_freq = rate;
        }
        info!("tx lo {} Hz", rate);
        Ok(())
    }

    fn program_tx_lo(&mut self, freq: u64) -> Result<u64, T::Error> {
        self.fastlock_unprepare(Direction::Tx)?;
        self.set_rate(ClockId::TxRfpll, freq)
    }

    /// TX LO read back from hardware
    pub fn get_tx_lo_freq(&mut self) -> Result<u64, T::Error> {
        self.get_rate(ClockId::TxRfpll)
    }

    // ------------------------------------------------------------------
    // TX attenuation
    // ------------------------------------------------------------------

    /// Set TX attenuation in millidB on the selected channels.
    ///
    /// Values above 89 750 mdB are rejected before any write. With
    /// `immediate` the new value takes effect without waiting for the
    /// next ENSM transition.
    pub fn set_tx_attenuation(&mut self, mdb: u32, tx1: bool, tx2: bool, immediate: bool) -> Result<(), T::Error> {
        if mdb > MAX_TX_ATTEN_MDB {
            return Err(Error::invalid("TX attenuation", mdb));
        }
        let code = mdb / TX_ATTEN_STEP_MDB;
        let buf = [(code >> 8) as u8 & 0x01, code as u8];

        if immediate {
            self.bus.write_flag(regs::TX2_DIG_ATTEN, regs::IMMEDIATELY_UPDATE_TPC_ATTEN, false)?;
        }
        if tx1 {
            self.bus.write_block(regs::TX1_ATTEN_1, &buf)?;
        }
        if tx2 {
            self.bus.write_block(regs::TX2_ATTEN_1, &buf)?;
        }
        if immediate {
            self.bus.write_flag(regs::TX2_DIG_ATTEN, regs::IMMEDIATELY_UPDATE_TPC_ATTEN, true)?;
        }
        debug!("tx attenuation {} mdB", code * TX_ATTEN_STEP_MDB);
        Ok(())
    }

    /// TX attenuation of a channel in millidB
    pub fn get_tx_attenuation(&mut self, channel: Channel) -> Result<u32, T::Error> {
        let addr = match channel {
            Channel::One => regs::TX1_ATTEN_1,
            Channel::Two => regs::TX2_ATTEN_1,
        };
        let mut buf = [0u8; 2];
        self.bus.read_block(addr, &mut buf)?;
        let code = (u32::from(buf[0] & 0x01) << 8) | u32::from(buf[1]);
        Ok(code * TX_ATTEN_STEP_MDB)
    }

    // ------------------------------------------------------------------
    // Bandwidth
    // ------------------------------------------------------------------

    /// Set RX and TX RF bandwidth in Hz, re-running the analog filter
    /// calibrations with the chip parked in ALERT.
    pub fn set_rf_bandwidth(&mut self, rx_bw: u32, tx_bw: u32) -> Result<(), T::Error> {
        if rx_bw == 0 || tx_bw == 0 {
            return Err(Error::invalid("RF bandwidth", 0));
        }
        let token = self.force_state(EnsmState::Alert)?;
        let result = self.update_rf_bandwidth(rx_bw, tx_bw);
        let restored = self.restore_state(token);
        result.and(restored)
    }

    /// Filter, TIA and ADC calibrations for a bandwidth pair. The RX and
    /// TX baseband bandwidths are half the RF bandwidths.
    pub(crate) fn update_rf_bandwidth(&mut self, rx_bw: u32, tx_bw: u32) -> Result<(), T::Error> {
        // zero marks a filter left half-tuned, so the next call retunes it
        if rx_bw != self.current_rx_bw {
            self.current_rx_bw = 0;
            self.rx_bb_analog_filter_calib(rx_bw / 2)?;
            self.current_rx_bw = rx_bw;
        }
        if tx_bw != self.current_tx_bw {
            self.current_tx_bw = 0;
            self.tx_bb_analog_filter_calib(tx_bw / 2)?;
            self.current_tx_bw = tx_bw;
        }
        self.rx_tia_calib(rx_bw / 2)?;
        self.tx_bb_second_filter_calib(tx_bw / 2)?;

        let bbpll = self.clocks.rate(ClockId::Bbpll);
        let adc = self.clocks.rate(ClockId::Adc);
        self.rx_adc_setup(bbpll, adc)
    }

    /// Current RX and TX RF bandwidths in Hz
    #[must_use]
    pub const fn rf_bandwidth(&self) -> (u32, u32) {
        (self.current_rx_bw, self.current_tx_bw)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Read `buf.len()` consecutive registers starting at `start`, ascending.
    pub fn read_registers(&mut self, start: u16, buf: &mut [u8]) -> Result<(), T::Error> {
        for (addr, byte) in (start..).zip(buf.iter_mut()) {
            *byte = self.bus.read(addr)?;
        }
        Ok(())
    }
}

/// Map a step failure to [`Error::SetupAborted`].
fn step<R, E>(at: SetupStep, result: Result<R, E>) -> Result<R, E> {
    result.map_err(|e| {
        let kind = e.kind();
        let detail = e.detail();
        error!("setup aborted at {:?}: {:?} {:?}", at, kind, detail);
        Error::SetupAborted { step: at, kind, detail }
    })
}

pub(crate) const fn nonzero_or(value: u32, fallback: u32) -> u32 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

fn channel_mask(two_channels: bool, one: Channel) -> u8 {
    if two_channels {
        0b11
    } else {
        match one {
            Channel::One => 0b01,
            Channel::Two => 0b10,
        }
    }
}

/// REFERENCE_CLOCK_CYCLES: reference cycles per µs, minus one
fn reference_clock_cycles(reference: u64) -> u8 {
    u8::try_from((reference / 1_000_000).saturating_sub(1)).unwrap_or(u8::MAX) & 0x7F
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_masks() {
        assert_eq!(channel_mask(true, Channel::Two), 0b11);
        assert_eq!(channel_mask(false, Channel::One), 0b01);
        assert_eq!(channel_mask(false, Channel::Two), 0b10);
    }

    #[test]
    fn reference_cycles_per_microsecond() {
        assert_eq!(reference_clock_cycles(40_000_000), 39);
        assert_eq!(reference_clock_cycles(0), 0);
    }

    #[test]
    fn fir_effective_rate_change() {
        assert_eq!(FirState::default().effective(), 1);
        assert_eq!(FirState { bypass: false, intdec: 4 }.effective(), 4);
    }
}
