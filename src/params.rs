//! Initialization parameters
//!
//! [`InitParams`] is the flat record handed to [`crate::Ad9361::init`].
//! It is supplied wholesale; nothing in the driver parses text. The
//! defaults describe an FMComms-style board: 40 MHz reference, 2.4 GHz
//! LOs, 18 MHz RF bandwidth and a 30.72 MSPS sample-rate chain.

use crate::config::{DEFAULT_RX_PATH_CLOCKS, DEFAULT_TX_PATH_CLOCKS, MAX_SYNTH_REF};
use crate::types::{Channel, ClockOutMode, EnsmState, GainControlMode};

/// Which digital interface tuning passes `post_setup` runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DigTuneSkip {
    /// Tune RX and TX timing
    #[default]
    None,
    /// Tune RX timing only
    Tx,
    /// Skip interface tuning entirely
    All,
}

/// Complete bring-up configuration
#[derive(Clone, Debug)]
pub struct InitParams {
    /// Reference clock feeding the chip, Hz
    pub reference_clk_rate: u64,
    /// External reference clock instead of a crystal
    pub xo_disable_use_ext_refclk: bool,
    /// Two receivers and two transmitters active
    pub two_rx_two_tx_mode: bool,
    /// Receiver used in 1R1T mode
    pub one_rx_one_tx_use_rx_num: Channel,
    /// Transmitter used in 1R1T mode
    pub one_rx_one_tx_use_tx_num: Channel,
    /// Frequency division duplex
    pub frequency_division_duplex_mode: bool,
    /// Keep both synthesizers running in TDD
    pub tdd_use_dual_synth_mode: bool,
    /// Skip VCO calibration on TDD turnarounds
    pub tdd_skip_vco_cal: bool,
    /// ENSM state forced at the end of `init`; `None` picks FDD or ALERT
    pub ensm_state_after_init: Option<EnsmState>,
    /// ENSM driven by ENABLE/TXNRX pins instead of SPI
    pub ensm_enable_pin_ctrl: bool,
    /// ENABLE pin pulse mode instead of level mode
    pub ensm_enable_pin_pulse_mode: bool,
    /// Initial RX carrier, Hz
    pub rx_synthesizer_frequency: u64,
    /// Initial TX carrier, Hz
    pub tx_synthesizer_frequency: u64,
    /// Highest reference frequency allowed at the RF synthesizers, Hz
    pub trx_synthesizer_target_fref_overwrite_hz: u64,
    /// RX chain: BBPLL, ADC, R2, R1, CLKRF, RX sample
    pub rx_path_clock_frequencies: [u64; 6],
    /// TX chain: BBPLL, DAC, T2, T1, CLKTF, TX sample
    pub tx_path_clock_frequencies: [u64; 6],
    /// RX RF bandwidth, Hz
    pub rf_rx_bandwidth_hz: u32,
    /// TX RF bandwidth, Hz
    pub rf_tx_bandwidth_hz: u32,
    /// RX input port select
    pub rx_rf_port_input_select: u8,
    /// TX output port select
    pub tx_rf_port_input_select: u8,
    /// Initial TX attenuation, millidB
    pub tx_attenuation_mdb: u32,
    /// Apply TX attenuation changes while in ALERT
    pub update_tx_gain_in_alert_enable: bool,
    /// TX LO move that triggers a new quadrature calibration, Hz
    pub cal_threshold_freq: u64,
    /// BB DC offset count for carriers above 4 GHz
    pub dc_offset_count_high_range: u8,
    /// BB DC offset count up to 4 GHz
    pub dc_offset_count_low_range: u8,
    /// RF DC offset attenuation above 4 GHz
    pub dc_offset_attenuation_high_range: u8,
    /// RF DC offset attenuation up to 4 GHz
    pub dc_offset_attenuation_low_range: u8,
    /// Event mask for DC tracking updates
    pub dc_offset_tracking_update_event_mask: u8,
    /// Enable BB DC tracking after init
    pub bb_dc_offset_tracking_enable: bool,
    /// Enable RF DC tracking after init
    pub rf_dc_offset_tracking_enable: bool,
    /// Enable RX quadrature tracking after init
    pub quad_tracking_enable: bool,
    /// Slow quadrature tracking
    pub qec_tracking_slow_mode_enable: bool,
    /// Invert RX2 relative to RX1
    pub rx1rx2_phase_inversion_enable: bool,
    /// RX fast-lock initial delay, ns
    pub rx_fastlock_delay_ns: u32,
    /// TX fast-lock initial delay, ns
    pub tx_fastlock_delay_ns: u32,
    /// RX fast-lock profile selected by pins
    pub rx_fastlock_pincontrol_enable: bool,
    /// TX fast-lock profile selected by pins
    pub tx_fastlock_pincontrol_enable: bool,
    /// Digital interface tuning done in `post_setup`
    pub digital_interface_tune_skip_mode: DigTuneSkip,
    /// Clock output pin
    pub clk_output_mode_select: ClockOutMode,
    /// Gain control
    pub gain_ctrl: GainControl,
    /// RSSI measurement
    pub rssi_ctrl: RssiControl,
    /// Auxiliary ADC and temperature sensor
    pub aux_adc_ctrl: AuxAdcControl,
    /// Auxiliary DACs
    pub aux_dac_ctrl: AuxDacControl,
    /// Digital data port
    pub port_ctrl: PortControl,
    /// Control output mux
    pub ctrl_outs_ctrl: CtrlOutsControl,
    /// General purpose outputs
    pub gpo_ctrl: GpoControl,
    /// External LNA
    pub elna_ctrl: ElnaControl,
    /// TX monitor
    pub txmon_ctrl: TxMonControl,
}

impl InitParams {
    /// ENSM state the device is left in after `init`
    #[must_use]
    pub fn operating_state(&self) -> EnsmState {
        self.ensm_state_after_init.unwrap_or(if self.frequency_division_duplex_mode {
            EnsmState::Fdd
        } else {
            EnsmState::Alert
        })
    }
}

impl Default for InitParams {
    fn default() -> Self {
        Self {
            reference_clk_rate: 40_000_000,
            xo_disable_use_ext_refclk: false,
            two_rx_two_tx_mode: false,
            one_rx_one_tx_use_rx_num: Channel::One,
            one_rx_one_tx_use_tx_num: Channel::One,
            frequency_division_duplex_mode: true,
            tdd_use_dual_synth_mode: false,
            tdd_skip_vco_cal: false,
            ensm_state_after_init: None,
            ensm_enable_pin_ctrl: false,
            ensm_enable_pin_pulse_mode: false,
            rx_synthesizer_frequency: 2_400_000_000,
            tx_synthesizer_frequency: 2_400_000_000,
            trx_synthesizer_target_fref_overwrite_hz: MAX_SYNTH_REF,
            rx_path_clock_frequencies: DEFAULT_RX_PATH_CLOCKS,
            tx_path_clock_frequencies: DEFAULT_TX_PATH_CLOCKS,
            rf_rx_bandwidth_hz: 18_000_000,
            rf_tx_bandwidth_hz: 18_000_000,
            rx_rf_port_input_select: 0,
            tx_rf_port_input_select: 0,
            tx_attenuation_mdb: 10_000,
            update_tx_gain_in_alert_enable: false,
            cal_threshold_freq: 100_000_000,
            dc_offset_count_high_range: 0x28,
            dc_offset_count_low_range: 0x32,
            dc_offset_attenuation_high_range: 6,
            dc_offset_attenuation_low_range: 5,
            dc_offset_tracking_update_event_mask: 5,
            bb_dc_offset_tracking_enable: true,
            rf_dc_offset_tracking_enable: true,
            quad_tracking_enable: true,
            qec_tracking_slow_mode_enable: false,
            rx1rx2_phase_inversion_enable: false,
            rx_fastlock_delay_ns: 0,
            tx_fastlock_delay_ns: 0,
            rx_fastlock_pincontrol_enable: false,
            tx_fastlock_pincontrol_enable: false,
            digital_interface_tune_skip_mode: DigTuneSkip::None,
            clk_output_mode_select: ClockOutMode::Disabled,
            gain_ctrl: GainControl::default(),
            rssi_ctrl: RssiControl::default(),
            aux_adc_ctrl: AuxAdcControl::default(),
            aux_dac_ctrl: AuxDacControl::default(),
            port_ctrl: PortControl::default(),
            ctrl_outs_ctrl: CtrlOutsControl::default(),
            gpo_ctrl: GpoControl::default(),
            elna_ctrl: ElnaControl::default(),
            txmon_ctrl: TxMonControl::default(),
        }
    }
}

/// Receive gain control settings
#[derive(Clone, Copy, Debug)]
pub struct GainControl {
    /// RX1 gain control mode
    pub rx1_mode: GainControlMode,
    /// RX2 gain control mode
    pub rx2_mode: GainControlMode,
    /// Split gain table instead of the full table
    pub split_gain_table_mode_enable: bool,
    /// ADC overload sample size, 1..=8
    pub adc_ovr_sample_size: u8,
    /// ADC small overload threshold
    pub adc_small_overload_thresh: u8,
    /// ADC large overload threshold
    pub adc_large_overload_thresh: u8,
    /// LMT large overload threshold, mV
    pub lmt_overload_high_thresh: u16,
    /// LMT small overload threshold, mV
    pub lmt_overload_low_thresh: u16,
    /// Power measurement duration in samples (regular AGC)
    pub dec_pow_measurement_duration: u32,
    /// Low power threshold, -dBFS
    pub low_power_thresh: u8,
    /// Digital gain enable
    pub dig_gain_en: bool,
    /// Maximum digital gain
    pub max_dig_gain: u8,
    /// MGC increment step
    pub mgc_inc_gain_step: u8,
    /// MGC decrement step
    pub mgc_dec_gain_step: u8,
    /// Extra margin added to the attack delay, µs
    pub agc_attack_delay_extra_margin_us: u8,
    /// Outer high threshold
    pub agc_outer_thresh_high: u8,
    /// Outer high threshold decrement steps
    pub agc_outer_thresh_high_dec_steps: u8,
    /// Inner high threshold
    pub agc_inner_thresh_high: u8,
    /// Inner high threshold decrement steps
    pub agc_inner_thresh_high_dec_steps: u8,
    /// Inner low threshold
    pub agc_inner_thresh_low: u8,
    /// Inner low threshold increment steps
    pub agc_inner_thresh_low_inc_steps: u8,
    /// Outer low threshold
    pub agc_outer_thresh_low: u8,
    /// Outer low threshold increment steps
    pub agc_outer_thresh_low_inc_steps: u8,
    /// ADC small overload exceed counter
    pub adc_small_overload_exceed_counter: u8,
    /// ADC large overload exceed counter
    pub adc_large_overload_exceed_counter: u8,
    /// ADC large overload gain step
    pub adc_large_overload_inc_steps: u8,
    /// Block gain increase on small ADC/LMT overload
    pub adc_lmt_small_overload_prevent_gain_inc: bool,
    /// LMT large overload exceed counter
    pub lmt_overload_large_exceed_counter: u8,
    /// LMT small overload exceed counter
    pub lmt_overload_small_exceed_counter: u8,
    /// LMT large overload gain step
    pub lmt_overload_large_inc_steps: u8,
    /// Digital saturation exceed counter
    pub dig_saturation_exceed_counter: u8,
    /// Digital gain step size
    pub dig_gain_step_size: u8,
    /// Sync gain counter to the ENABLE pin
    pub sync_for_gain_counter_en: bool,
    /// Gain update interval, µs
    pub gain_update_interval_us: u32,
    /// Immediate gain change on large ADC overload
    pub immed_gain_change_if_large_adc_overload: bool,
    /// Immediate gain change on large LMT overload
    pub immed_gain_change_if_large_lmt_overload: bool,
    /// Fast AGC: wait time per state, ns
    pub f_agc_state_wait_time_ns: u32,
    /// Fast AGC: power measurement duration in samples
    pub f_agc_dec_pow_measurement_duration: u32,
    /// Fast AGC: low power threshold increment time
    pub f_agc_lp_thresh_increment_time: u8,
    /// Fast AGC: low power threshold increment steps
    pub f_agc_lp_thresh_increment_steps: u8,
    /// Fast AGC: lock level
    pub f_agc_lock_level: u8,
    /// Fast AGC: lock level gain increase upper limit
    pub f_agc_lock_level_gain_increase_upper_limit: u8,
    /// Fast AGC: final LPF settling steps
    pub f_agc_lpf_final_settling_steps: u8,
    /// Fast AGC: final LMT settling steps
    pub f_agc_lmt_final_settling_steps: u8,
    /// Fast AGC: final over-range count
    pub f_agc_final_overrange_count: u8,
    /// Fast AGC: allow gain increase after lock
    pub f_agc_gain_increase_after_gain_lock_en: bool,
    /// Fast AGC: optimized gain offset
    pub f_agc_optimized_gain_offset: u8,
    /// Fast AGC: stronger signal threshold above lock level
    pub f_agc_rst_gla_stronger_sig_thresh_above_ll: u8,
    /// Fast AGC: energy lost threshold below lock level
    pub f_agc_rst_gla_engergy_lost_sig_thresh_below_ll: u8,
    /// Fast AGC: gain lock exit count
    pub f_agc_energy_lost_stronger_sig_gain_lock_exit_cnt: u8,
    /// Fast AGC: reset on large ADC overload
    pub f_agc_rst_gla_large_adc_overload_en: bool,
    /// Fast AGC: reset on large LMT overload
    pub f_agc_rst_gla_large_lmt_overload_en: bool,
}

impl Default for GainControl {
    fn default() -> Self {
        Self {
            rx1_mode: GainControlMode::SlowAttack,
            rx2_mode: GainControlMode::SlowAttack,
            split_gain_table_mode_enable: false,
            adc_ovr_sample_size: 4,
            adc_small_overload_thresh: 47,
            adc_large_overload_thresh: 58,
            lmt_overload_high_thresh: 800,
            lmt_overload_low_thresh: 704,
            dec_pow_measurement_duration: 8192,
            low_power_thresh: 24,
            dig_gain_en: false,
            max_dig_gain: 15,
            mgc_inc_gain_step: 2,
            mgc_dec_gain_step: 2,
            agc_attack_delay_extra_margin_us: 1,
            agc_outer_thresh_high: 5,
            agc_outer_thresh_high_dec_steps: 2,
            agc_inner_thresh_high: 10,
            agc_inner_thresh_high_dec_steps: 1,
            agc_inner_thresh_low: 12,
            agc_inner_thresh_low_inc_steps: 1,
            agc_outer_thresh_low: 18,
            agc_outer_thresh_low_inc_steps: 2,
            adc_small_overload_exceed_counter: 10,
            adc_large_overload_exceed_counter: 10,
            adc_large_overload_inc_steps: 2,
            adc_lmt_small_overload_prevent_gain_inc: false,
            lmt_overload_large_exceed_counter: 10,
            lmt_overload_small_exceed_counter: 10,
            lmt_overload_large_inc_steps: 2,
            dig_saturation_exceed_counter: 3,
            dig_gain_step_size: 4,
            sync_for_gain_counter_en: false,
            gain_update_interval_us: 1000,
            immed_gain_change_if_large_adc_overload: false,
            immed_gain_change_if_large_lmt_overload: false,
            f_agc_state_wait_time_ns: 260,
            f_agc_dec_pow_measurement_duration: 64,
            f_agc_lp_thresh_increment_time: 5,
            f_agc_lp_thresh_increment_steps: 1,
            f_agc_lock_level: 10,
            f_agc_lock_level_gain_increase_upper_limit: 5,
            f_agc_lpf_final_settling_steps: 1,
            f_agc_lmt_final_settling_steps: 1,
            f_agc_final_overrange_count: 3,
            f_agc_gain_increase_after_gain_lock_en: false,
            f_agc_optimized_gain_offset: 5,
            f_agc_rst_gla_stronger_sig_thresh_above_ll: 10,
            f_agc_rst_gla_engergy_lost_sig_thresh_below_ll: 10,
            f_agc_energy_lost_stronger_sig_gain_lock_exit_cnt: 8,
            f_agc_rst_gla_large_adc_overload_en: true,
            f_agc_rst_gla_large_lmt_overload_en: true,
        }
    }
}

/// RSSI measurement settings
#[derive(Clone, Copy, Debug)]
pub struct RssiControl {
    /// Restart trigger, 0..=7
    pub restart_mode: u8,
    /// Durations below are in RX samples rather than µs
    pub unit_is_rx_samples: bool,
    /// Delay before the first measurement
    pub delay: u32,
    /// Wait between measurements
    pub wait: u32,
    /// Total measurement duration
    pub duration: u32,
}

impl Default for RssiControl {
    fn default() -> Self {
        Self {
            restart_mode: 3,
            unit_is_rx_samples: false,
            delay: 1,
            wait: 1,
            duration: 1000,
        }
    }
}

/// Auxiliary ADC and temperature sensor settings
#[derive(Clone, Copy, Debug)]
pub struct AuxAdcControl {
    /// Aux ADC clock, Hz
    pub clock_rate: u32,
    /// Aux ADC decimation, 256..=32768
    pub decimation: u32,
    /// Temperature sensor decimation, 256..=32768
    pub temp_sensor_decimation: u32,
    /// Temperature measurement interval, ms
    pub temp_sense_measurement_interval_ms: u32,
    /// Temperature sensor offset
    pub offset: i8,
    /// Periodic temperature measurement
    pub periodic_temp_measurement: bool,
}

impl Default for AuxAdcControl {
    fn default() -> Self {
        Self {
            clock_rate: 40_000_000,
            decimation: 256,
            temp_sensor_decimation: 256,
            temp_sense_measurement_interval_ms: 1000,
            offset: -50,
            periodic_temp_measurement: true,
        }
    }
}

/// One auxiliary DAC
#[derive(Clone, Copy, Debug, Default)]
pub struct AuxDac {
    /// Output level after init, mV
    pub default_value_mv: u32,
    /// Active while in RX
    pub active_in_rx: bool,
    /// Active while in TX
    pub active_in_tx: bool,
    /// Active while in ALERT
    pub active_in_alert: bool,
    /// Delay after entering RX, µs
    pub rx_delay_us: u8,
    /// Delay after entering TX, µs
    pub tx_delay_us: u8,
}

/// Auxiliary DAC settings
#[derive(Clone, Copy, Debug, Default)]
pub struct AuxDacControl {
    /// Levels are held by software rather than the ENSM
    pub manual_mode_enable: bool,
    /// DAC1
    pub dac1: AuxDac,
    /// DAC2
    pub dac2: AuxDac,
}

/// Digital data port settings
#[derive(Clone, Copy, Debug)]
pub struct PortControl {
    /// Parallel port configuration registers 1..=3
    pub pp_conf: [u8; 3],
    /// RX data clock delay
    pub rx_clk_delay: u8,
    /// RX data delay
    pub rx_data_delay: u8,
    /// TX feedback clock delay
    pub tx_clk_delay: u8,
    /// TX data delay
    pub tx_data_delay: u8,
    /// Digital I/O drive control
    pub digital_io_ctrl: u8,
    /// LVDS bias, mV
    pub lvds_bias_mv: u16,
    /// LVDS on-chip termination
    pub lvds_rx_onchip_termination: bool,
    /// LVDS inversion masks
    pub lvds_invert: [u8; 2],
}

impl Default for PortControl {
    fn default() -> Self {
        Self {
            pp_conf: [0x00, 0x00, 0x10],
            rx_clk_delay: 0,
            rx_data_delay: 4,
            tx_clk_delay: 0,
            tx_data_delay: 7,
            digital_io_ctrl: 0,
            lvds_bias_mv: 150,
            lvds_rx_onchip_termination: true,
            lvds_invert: [0xFF, 0x0F],
        }
    }
}

/// Control output mux
#[derive(Clone, Copy, Debug)]
pub struct CtrlOutsControl {
    /// Pointer selecting the signal group
    pub index: u8,
    /// Enabled outputs
    pub enable_mask: u8,
}

impl Default for CtrlOutsControl {
    fn default() -> Self {
        Self {
            index: 0,
            enable_mask: 0xFF,
        }
    }
}

/// General purpose output settings
#[derive(Clone, Copy, Debug, Default)]
pub struct GpoControl {
    /// Outputs held by software
    pub manual_mode_enable: bool,
    /// Manual output levels, one bit per GPO
    pub manual_mode_mask: u8,
    /// Inactive level, one bit per GPO
    pub inactive_state_high: u8,
    /// GPOs raised automatically in RX, one bit per GPO
    pub auto_rx: u8,
    /// GPOs raised automatically in TX, one bit per GPO
    pub auto_tx: u8,
    /// Per-GPO delay after entering RX, µs
    pub rx_delay_us: [u8; 4],
    /// Per-GPO delay after entering TX, µs
    pub tx_delay_us: [u8; 4],
}

/// External LNA settings
#[derive(Clone, Copy, Debug, Default)]
pub struct ElnaControl {
    /// LNA gain, millidB
    pub gain_mdb: u32,
    /// Bypass loss, millidB
    pub bypass_loss_mdb: u32,
    /// LNA settling time, ns
    pub settling_delay_ns: u32,
    /// Drive the LNA from GPO0
    pub elna_1_control_en: bool,
    /// Drive the LNA from GPO1
    pub elna_2_control_en: bool,
}

/// TX monitor settings
#[derive(Clone, Copy, Debug)]
pub struct TxMonControl {
    /// Attenuation above which the high gain setting is used, millidB
    pub low_high_gain_threshold_mdb: u32,
    /// Monitor gain below the threshold, dB
    pub low_gain_db: u8,
    /// Monitor gain above the threshold, dB
    pub high_gain_db: u8,
    /// Continuous tracking
    pub tx_mon_track_en: bool,
    /// One-shot measurement
    pub one_shot_mode_en: bool,
    /// Delay before measurement, RX samples
    pub tx_mon_delay: u16,
    /// Measurement duration, RX samples
    pub tx_mon_duration: u16,
    /// TX1 monitor front-end gain
    pub tx1_mon_front_end_gain: u8,
    /// TX2 monitor front-end gain
    pub tx2_mon_front_end_gain: u8,
    /// TX1 monitor LO common mode
    pub tx1_mon_lo_cm: u8,
    /// TX2 monitor LO common mode
    pub tx2_mon_lo_cm: u8,
    /// Run the TX monitor calibration in TDD
    pub txmon_cal_enable: bool,
}

impl Default for TxMonControl {
    fn default() -> Self {
        Self {
            low_high_gain_threshold_mdb: 37_000,
            low_gain_db: 0,
            high_gain_db: 24,
            tx_mon_track_en: false,
            one_shot_mode_en: false,
            tx_mon_delay: 511,
            tx_mon_duration: 8192,
            tx1_mon_front_end_gain: 2,
            tx2_mon_front_end_gain: 2,
            tx1_mon_lo_cm: 48,
            tx2_mon_lo_cm: 48,
            txmon_cal_enable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_operating_state_follows_duplex_mode() {
        let mut params = InitParams::default();
        assert_eq!(params.operating_state(), EnsmState::Fdd);
        params.frequency_division_duplex_mode = false;
        assert_eq!(params.operating_state(), EnsmState::Alert);
        params.ensm_state_after_init = Some(EnsmState::Rx);
        assert_eq!(params.operating_state(), EnsmState::Rx);
    }
}
