//! Receive gain control and RSSI configuration
//!
//! [`Ad9361::gain_control_setup`] writes the static AGC/MGC settings once
//! at bring-up. Everything that depends on the baseband clocks lives in
//! [`Ad9361::gain_update`], which also runs whenever the clock chain
//! changes.

use embedded_hal::delay::DelayNs;

use crate::clock::{clamp_i64, ClockId};
use crate::device::Ad9361;
use crate::error::{Error, Result};
use crate::params::{GainControl, RssiControl};
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::{Channel, GainControlMode};

/// Largest gain update counter the two counter registers plus the
/// doubling bit can express
const MAX_GAIN_UPDATE_COUNTER: u64 = 131_071;

/// Sum of the four RSSI weights
const RSSI_WEIGHT_TOTAL: u32 = 0xFF;

/// Clock-derived gain control timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainTiming {
    /// AGC attack delay, µs
    pub attack_delay: u8,
    /// Peak overload wait time, ClkRF cycles
    pub peak_wait: u8,
    /// Gain settling delay, 2 ClkRF cycle units
    pub settling_delay: u8,
    /// Gain update counter, already halved when `double_counter` is set
    pub update_counter: u16,
    /// Counter runs at half rate
    pub double_counter: bool,
    /// Power measurement duration code, log2(samples / 16)
    pub dec_pow_duration: u8,
    /// Fast AGC energy detect count
    pub energy_detect_count: u8,
}

const fn div_round_up(n: u64, d: u64) -> u64 {
    (n + d - 1) / d
}

const fn div_round_closest(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}

fn clamp_u8(value: u64, max: u8) -> u8 {
    value.min(u64::from(max)) as u8
}

/// Compute the gain control timing for a ClkRF rate of `clkrf` Hz and an
/// RX sample rate of `rx_sampl` Hz.
///
/// Returns `None` while the baseband clocks are not running.
#[must_use]
pub fn gain_timing(
    ctrl: &GainControl,
    lna_settle_ns: u32,
    clkrf: u64,
    rx_sampl: u64,
    modes: [GainControlMode; 2],
) -> Option<GainTiming> {
    let clkrf_khz = clkrf / 1000;
    if clkrf_khz == 0 || rx_sampl == 0 {
        return None;
    }
    let lna = u64::from(lna_settle_ns);

    let attack = div_round_up(100 * lna + 14_000_000 / (clkrf / 500), 1000)
        + u64::from(ctrl.agc_attack_delay_extra_margin_us);
    let peak = div_round_up((lna + 100) * clkrf_khz, 1_000_000) + 1;
    let settling = div_round_up((lna + 200) * (clkrf / 2000), 1_000_000).min(31);

    let counter = div_round_closest(
        (u64::from(ctrl.gain_update_interval_us) * clkrf_khz).saturating_sub(settling * 2000 + 2000),
        2000,
    )
    .min(MAX_GAIN_UPDATE_COUNTER);

    let dur = if modes.contains(&GainControlMode::FastAttack) {
        u64::from(ctrl.f_agc_dec_pow_measurement_duration)
    } else {
        let fir_div = div_round_closest(clkrf, rx_sampl).max(1);
        let dur = u64::from(ctrl.dec_pow_measurement_duration);
        if dur == 0 || (counter * 2 / fir_div) / dur < 2 {
            counter / fir_div
        } else {
            dur
        }
    };
    let dec_pow_duration = clamp_u8(u64::from((dur / 16).max(1).ilog2()), 0x0F);

    let double_counter = counter > u64::from(u16::MAX);
    let update_counter = (if double_counter { counter / 2 } else { counter }) as u16;

    let energy = div_round_closest(u64::from(ctrl.f_agc_state_wait_time_ns) * clkrf_khz, 1_000_000);

    Some(GainTiming {
        attack_delay: clamp_u8(attack, 31),
        peak_wait: clamp_u8(peak, 31),
        settling_delay: settling as u8,
        update_counter,
        double_counter,
        dec_pow_duration,
        energy_detect_count: clamp_u8(energy, 31),
    })
}

/// AGC_CONFIG_1 mode bits for both receivers
#[must_use]
pub fn agc_mode_bits(modes: [GainControlMode; 2]) -> u8 {
    let mut value = field_prep(modes[0].as_reg(), regs::RX1_GAIN_CTRL_SETUP)
        | field_prep(modes[1].as_reg(), regs::RX2_GAIN_CTRL_SETUP);
    if modes.contains(&GainControlMode::Hybrid) {
        value |= regs::SLOW_ATTACK_HYBRID_MODE;
    }
    value
}

/// Limiter threshold in mV to its register code
fn lmt_thresh_code(mv: u16) -> u8 {
    (mv.clamp(16, 800) / 16 - 1) as u8 & regs::SMALL_LMT_OVERLOAD_MASK
}

/// Step count in 1..=8 to its three-bit code
fn step_code(steps: u8) -> u8 {
    steps.clamp(1, 8) - 1
}

/// RSSI averaging plan: duration codes and weights
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RssiDurations {
    /// log2 of each measurement length in samples
    pub codes: [u8; 4],
    /// Weight of each measurement; the weights sum to 255
    pub weights: [u8; 4],
}

/// Split a measurement of `samples` into at most four power-of-two pieces
/// and weight them by length.
///
/// Returns `None` for an empty measurement.
#[must_use]
pub fn rssi_durations(samples: u32) -> Option<RssiDurations> {
    if samples == 0 {
        return None;
    }

    let mut codes = [0u8; 4];
    let mut pieces = 0;
    let mut left = samples;
    while left > 0 && pieces < codes.len() {
        let code = left.ilog2().min(15);
        codes[pieces] = code as u8;
        left -= 1 << code;
        pieces += 1;
    }

    let total: u32 = codes[..pieces].iter().map(|&c| 1u32 << c).sum();
    let mut weights = [0u8; 4];
    let mut sum = 0;
    for (w, &c) in weights.iter_mut().zip(&codes[..pieces]) {
        let weight = ((RSSI_WEIGHT_TOTAL << c) + total / 2) / total;
        *w = weight as u8;
        sum += weight;
    }
    // rounding slack goes to the longest piece
    weights[0] = (u32::from(weights[0]) + RSSI_WEIGHT_TOTAL).saturating_sub(sum) as u8;

    Some(RssiDurations { codes, weights })
}

/// Convert an RSSI time to chip units.
///
/// `value` is in RX samples when `in_samples` is set, otherwise in µs at
/// `rx_sampl` Hz. `divider` scales the result to the register's units.
fn rssi_units(value: u32, in_samples: bool, rx_sampl: u64, divider: u64) -> u64 {
    let samples = if in_samples {
        u64::from(value)
    } else {
        u64::from(value) * rx_sampl
    };
    let scale = if in_samples { divider } else { divider * 1_000_000 };
    div_round_closest(samples, scale)
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Write the static gain control settings, then the clock-derived
    /// timing.
    pub fn gain_control_setup(&mut self) -> Result<(), T::Error> {
        let c = self.params.gain_ctrl;
        let modes = [c.rx1_mode, c.rx2_mode];
        let fast = modes.contains(&GainControlMode::FastAttack);

        self.bus.write(
            regs::AGC_CONFIG_1,
            agc_mode_bits(modes)
                | regs::DEC_PWR_FOR_LOW_PWR
                | regs::DEC_PWR_FOR_LOCK_LEVEL
                | regs::DEC_PWR_FOR_GAIN_LOCK_EXIT,
        )?;
        self.gain_mode = modes;

        self.bus.write_flag(regs::AGC_CONFIG_2, regs::DIG_GAIN_EN, c.dig_gain_en)?;

        let mut config_3 = field_prep(step_code(c.adc_ovr_sample_size), regs::ADC_OVERRANGE_SAMPLE_SIZE);
        if c.immed_gain_change_if_large_adc_overload {
            config_3 |= regs::IMMED_GAIN_CHANGE_LARGE_ADC;
        }
        if c.immed_gain_change_if_large_lmt_overload {
            config_3 |= regs::IMMED_GAIN_CHANGE_LARGE_LMT;
        }
        self.bus.write(regs::AGC_CONFIG_3, config_3)?;

        self.bus.write(
            regs::GAIN_STP_CONFIG1,
            field_prep(step_code(c.mgc_dec_gain_step), regs::MANUAL_DECR_STEP_SIZE)
                | field_prep(c.lmt_overload_large_inc_steps.min(7), regs::LARGE_LMT_INC_STEPS),
        )?;
        self.bus.write(
            regs::GAIN_STP_CONFIG_2,
            field_prep(step_code(c.mgc_inc_gain_step), regs::MANUAL_INCR_STEP_SIZE)
                | field_prep(c.adc_large_overload_inc_steps.min(7), regs::LARGE_ADC_INC_STEPS),
        )?;
        self.bus.write(
            regs::DIGITAL_GAIN,
            field_prep(c.max_dig_gain.min(31), regs::MAXIMUM_DIGITAL_GAIN)
                | field_prep(step_code(c.dig_gain_step_size), regs::DIG_GAIN_STEP_SIZE),
        )?;

        self.bus.write(regs::ADC_SMALL_OVERLOAD_THRESH, c.adc_small_overload_thresh)?;
        self.bus.write(regs::ADC_LARGE_OVERLOAD_THRESH, c.adc_large_overload_thresh)?;
        self.bus.write_field(
            regs::SMALL_LMT_OVERLOAD_THRESH,
            regs::SMALL_LMT_OVERLOAD_MASK,
            lmt_thresh_code(c.lmt_overload_low_thresh),
        )?;
        self.bus.write(regs::LARGE_LMT_OVERLOAD_THRESH, lmt_thresh_code(c.lmt_overload_high_thresh))?;

        let lock_level = if fast { c.f_agc_lock_level } else { c.agc_inner_thresh_high };
        self.bus.write_field(regs::AGC_LOCK_LEVEL, regs::AGC_LOCK_LEVEL_MASK, lock_level.min(127))?;

        let mut inner_low = field_prep(c.agc_inner_thresh_low.min(127), regs::INNER_LOW_THRESH);
        if c.adc_lmt_small_overload_prevent_gain_inc {
            inner_low |= regs::PREVENT_GAIN_INC;
        }
        self.bus.write(regs::AGC_INNER_LOW_THRESH, inner_low)?;

        self.bus.write(
            regs::LMT_OVERLOAD_COUNTERS,
            field_prep(c.lmt_overload_large_exceed_counter.min(15), regs::LARGE_EXCEED_COUNTER)
                | field_prep(c.lmt_overload_small_exceed_counter.min(15), regs::SMALL_EXCEED_COUNTER),
        )?;
        self.bus.write(
            regs::ADC_OVERLOAD_COUNTERS,
            field_prep(c.adc_large_overload_exceed_counter.min(15), regs::LARGE_EXCEED_COUNTER)
                | field_prep(c.adc_small_overload_exceed_counter.min(15), regs::SMALL_EXCEED_COUNTER),
        )?;
        self.bus.write(
            regs::GAIN_STP1,
            field_prep(c.agc_inner_thresh_high_dec_steps.min(7), regs::INNER_HIGH_DEC_STEPS)
                | field_prep(c.agc_inner_thresh_low_inc_steps.min(7), regs::INNER_LOW_INC_STEPS),
        )?;
        self.bus.write(
            regs::OUTER_POWER_THRESHS,
            field_prep(c.agc_outer_thresh_high.min(15), regs::OUTER_HIGH_THRESH)
                | field_prep(c.agc_outer_thresh_low.min(15), regs::OUTER_LOW_THRESH),
        )?;
        self.bus.write(
            regs::GAIN_STP_2,
            field_prep(c.agc_outer_thresh_high_dec_steps.min(15), regs::OUTER_HIGH_DEC_STEPS)
                | field_prep(c.agc_outer_thresh_low_inc_steps.min(15), regs::OUTER_LOW_INC_STEPS),
        )?;

        let mut sat = field_prep(c.dig_saturation_exceed_counter.min(15), regs::DIG_SATURATION_EXCEED_COUNTER);
        if c.sync_for_gain_counter_en {
            sat |= regs::ENABLE_SYNC_FOR_GAIN_COUNTER;
        }
        self.bus.write(regs::DIGITAL_SAT_COUNTER, sat)?;

        self.fast_agc_setup(&c)?;
        self.gain_update()?;
        debug!("gain control: rx1 {:?} rx2 {:?}", modes[0], modes[1]);
        Ok(())
    }

    fn fast_agc_setup(&mut self, c: &GainControl) -> Result<(), T::Error> {
        let mut config = 0;
        if c.f_agc_gain_increase_after_gain_lock_en {
            config |= regs::FAST_GAIN_INC_AFTER_LOCK;
        }
        if c.f_agc_rst_gla_large_adc_overload_en {
            config |= regs::FAST_RST_GLA_LARGE_ADC;
        }
        if c.f_agc_rst_gla_large_lmt_overload_en {
            config |= regs::FAST_RST_GLA_LARGE_LMT;
        }
        self.bus.write(regs::FAST_CONFIG_1, config)?;

        self.bus.write_field(
            regs::FAST_CONFIG_2_SETTLING_DELAY,
            regs::INCREMENT_GAIN_STEP,
            step_code(c.f_agc_lp_thresh_increment_steps),
        )?;
        self.bus.write(
            regs::FAST_ENERGY_LOST_THRESH,
            field_prep(c.f_agc_rst_gla_engergy_lost_sig_thresh_below_ll.min(63), regs::FAST_THRESH)
                | field_prep(c.f_agc_lpf_final_settling_steps.min(3), regs::FAST_FINAL_SETTLING_STEPS),
        )?;
        self.bus.write(
            regs::FAST_STRONGER_SIGNAL_THRESH,
            field_prep(c.f_agc_rst_gla_stronger_sig_thresh_above_ll.min(63), regs::FAST_THRESH)
                | field_prep(c.f_agc_lmt_final_settling_steps.min(3), regs::FAST_FINAL_SETTLING_STEPS),
        )?;
        self.bus.write(regs::FAST_LOW_POWER_THRESH, c.low_power_thresh.min(127))?;
        self.bus.write(
            regs::FAST_FINAL_OVER_RANGE_AND_OPT_GAIN,
            field_prep(c.f_agc_final_overrange_count.min(7), regs::FAST_FINAL_OVERRANGE_COUNT)
                | field_prep(c.f_agc_optimized_gain_offset.min(15), regs::FAST_OPTIMIZED_GAIN_OFFSET),
        )?;
        self.bus.write(regs::FAST_AGCLL_UPPER_LIMIT, c.f_agc_lock_level_gain_increase_upper_limit.min(63))?;
        self.bus.write(
            regs::FAST_GAIN_LOCK_EXIT_COUNT,
            c.f_agc_energy_lost_stronger_sig_gain_lock_exit_cnt.min(63),
        )?;
        self.bus.write(regs::FAST_INCREMENT_TIME, c.f_agc_lp_thresh_increment_time)
    }

    /// Rewrite the gain control timing for the current baseband clocks.
    pub fn gain_update(&mut self) -> Result<(), T::Error> {
        let clkrf = self.clocks.rate(ClockId::ClkRf);
        let Some(t) = gain_timing(
            &self.params.gain_ctrl,
            self.params.elna_ctrl.settling_delay_ns,
            clkrf,
            self.clocks.rate(ClockId::RxSampl),
            self.gain_mode,
        ) else {
            return Err(Error::invalid("ClkRF rate", clamp_i64(clkrf)));
        };

        self.bus.write_field(regs::AGC_ATTACK_DELAY, regs::AGC_ATTACK_DELAY_MASK, t.attack_delay)?;
        self.bus.write_field(regs::PEAK_WAIT_TIME, regs::PEAK_OVERLOAD_WAIT_TIME, t.peak_wait)?;
        self.bus.write_field(regs::FAST_CONFIG_2_SETTLING_DELAY, regs::SETTLING_DELAY, t.settling_delay)?;
        self.bus.write_field(
            regs::DEC_POWER_MEASURE_DURATION_0,
            regs::DEC_POWER_MEASUREMENT_DURATION,
            t.dec_pow_duration,
        )?;
        self.bus.write_flag(regs::DIGITAL_SAT_COUNTER, regs::DOUBLE_GAIN_COUNTER, t.double_counter)?;
        let [low, high] = t.update_counter.to_le_bytes();
        self.bus.write(regs::GAIN_UPDATE_COUNTER1, low)?;
        self.bus.write(regs::GAIN_UPDATE_COUNTER2, high)?;
        self.bus.write_field(regs::FAST_ENERGY_DETECT_COUNT, regs::ENERGY_DETECT_COUNT, t.energy_detect_count)?;

        debug!(
            "gain timing: attack {} peak {} settle {} counter {}",
            t.attack_delay, t.peak_wait, t.settling_delay, t.update_counter
        );
        Ok(())
    }

    /// Current gain control mode of `channel`
    #[must_use]
    pub fn rx_gain_control_mode(&self, channel: Channel) -> GainControlMode {
        self.gain_mode[channel.index()]
    }

    /// Switch one receiver between manual gain and the AGC modes.
    ///
    /// The power measurement duration depends on whether any receiver runs
    /// the fast AGC, so the clock-derived timing is rewritten as well.
    pub fn set_rx_gain_control_mode(&mut self, channel: Channel, mode: GainControlMode) -> Result<(), T::Error> {
        let mut modes = self.gain_mode;
        modes[channel.index()] = mode;

        let mask = regs::RX1_GAIN_CTRL_SETUP | regs::RX2_GAIN_CTRL_SETUP | regs::SLOW_ATTACK_HYBRID_MODE;
        let value = self.bus.read(regs::AGC_CONFIG_1)?;
        self.bus.write(regs::AGC_CONFIG_1, (value & !mask) | agc_mode_bits(modes))?;
        self.gain_mode = modes;

        self.gain_update()?;
        info!("{:?} gain control {:?}", channel, mode);
        Ok(())
    }

    /// Program the RSSI measurement.
    ///
    /// With `is_update` set this is a clock-change refresh, which is a
    /// no-op when the timings are given in samples. Delay and wait are
    /// counted in units of 8 RX samples and must fit in a byte.
    pub fn rssi_setup(&mut self, is_update: bool) -> Result<(), T::Error> {
        let r: RssiControl = self.params.rssi_ctrl;
        if is_update && r.unit_is_rx_samples {
            return Ok(());
        }
        if r.restart_mode > 7 {
            return Err(Error::invalid("RSSI restart mode", r.restart_mode));
        }

        let rx_sampl = self.clocks.rate(ClockId::RxSampl);
        let samples = rssi_units(r.duration, r.unit_is_rx_samples, rx_sampl, 1);
        let plan = u32::try_from(samples)
            .ok()
            .and_then(rssi_durations)
            .ok_or_else(|| Error::invalid("RSSI duration", r.duration))?;

        let delay = rssi_units(r.delay, r.unit_is_rx_samples, rx_sampl, 8);
        let wait = rssi_units(r.wait, r.unit_is_rx_samples, rx_sampl, 8);
        let delay = u8::try_from(delay).map_err(|_| Error::invalid("RSSI delay", r.delay))?;
        let wait = u8::try_from(wait).map_err(|_| Error::invalid("RSSI wait", r.wait))?;

        let c = plan.codes;
        self.bus.write(
            regs::MEASURE_DURATION_01,
            field_prep(c[0], regs::RSSI_MEAS_DURATION_LOW) | field_prep(c[1], regs::RSSI_MEAS_DURATION_HIGH),
        )?;
        self.bus.write(
            regs::MEASURE_DURATION_23,
            field_prep(c[2], regs::RSSI_MEAS_DURATION_LOW) | field_prep(c[3], regs::RSSI_MEAS_DURATION_HIGH),
        )?;
        for (i, &weight) in plan.weights.iter().enumerate() {
            self.bus.write(regs::RSSI_WEIGHT_0 + i as u16, weight)?;
        }
        self.bus.write(regs::RSSI_DELAY, delay)?;
        self.bus.write(regs::RSSI_WAIT_TIME, wait)?;
        self.bus.write_field(regs::RSSI_CONFIG, regs::RSSI_MODE_SELECT, r.restart_mode)?;
        self.bus.write_flag(regs::RSSI_CONFIG, regs::DEFAULT_RSSI_MEAS_MODE, true)?;

        debug!("rssi: {} samples, delay {} wait {}", samples, delay, wait);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOW: [GainControlMode; 2] = [GainControlMode::SlowAttack; 2];

    #[test]
    fn timing_at_default_chain() {
        let ctrl = GainControl::default();
        let t = gain_timing(&ctrl, 0, 61_440_000, 30_720_000, SLOW).unwrap();
        assert_eq!(t.attack_delay, 2);
        assert_eq!(t.peak_wait, 8);
        assert_eq!(t.settling_delay, 7);
        assert_eq!(t.update_counter, 30_712);
        assert!(!t.double_counter);
        assert_eq!(t.dec_pow_duration, 9);
        assert_eq!(t.energy_detect_count, 16);
    }

    #[test]
    fn fast_attack_uses_its_own_duration() {
        let ctrl = GainControl::default();
        let modes = [GainControlMode::FastAttack, GainControlMode::Manual];
        let t = gain_timing(&ctrl, 0, 61_440_000, 30_720_000, modes).unwrap();
        assert_eq!(t.dec_pow_duration, 2);
    }

    #[test]
    fn long_interval_doubles_counter() {
        let ctrl = GainControl {
            gain_update_interval_us: 3000,
            ..GainControl::default()
        };
        let t = gain_timing(&ctrl, 0, 61_440_000, 30_720_000, SLOW).unwrap();
        assert!(t.double_counter);
        assert_eq!(t.update_counter, 46_076);
    }

    #[test]
    fn lna_delay_stretches_timing_with_clamp() {
        let ctrl = GainControl::default();
        let t = gain_timing(&ctrl, 1_000, 61_440_000, 30_720_000, SLOW).unwrap();
        assert_eq!(t.peak_wait, 31);
        assert_eq!(t.attack_delay, 31);
        assert_eq!(t.settling_delay, 31);
    }

    #[test]
    fn no_timing_without_clocks() {
        assert_eq!(gain_timing(&GainControl::default(), 0, 0, 30_720_000, SLOW), None);
    }

    #[test]
    fn hybrid_sets_mode_bit() {
        let bits = agc_mode_bits([GainControlMode::Hybrid, GainControlMode::Manual]);
        assert_eq!(bits, 0x03 | regs::SLOW_ATTACK_HYBRID_MODE);
        assert_eq!(agc_mode_bits(SLOW), 0x02 | 0x08);
    }

    #[test]
    fn lmt_threshold_codes() {
        assert_eq!(lmt_thresh_code(800), 49);
        assert_eq!(lmt_thresh_code(704), 43);
        assert_eq!(lmt_thresh_code(0), 0);
    }

    #[test]
    fn rssi_split_and_weights() {
        let plan = rssi_durations(30_720).unwrap();
        assert_eq!(plan.codes, [14, 13, 12, 11]);
        assert_eq!(plan.weights, [136, 68, 34, 17]);
    }

    #[test]
    fn rssi_weights_always_sum_to_full_scale() {
        for samples in [1, 3, 100, 1000, 30_721, 65_535, 200_000] {
            let plan = rssi_durations(samples).unwrap();
            let sum: u32 = plan.weights.iter().map(|&w| u32::from(w)).sum();
            assert_eq!(sum, 255, "samples {samples}");
        }
        assert_eq!(rssi_durations(0), None);
    }

    #[test]
    fn rssi_time_units() {
        assert_eq!(rssi_units(1000, false, 30_720_000, 1), 30_720);
        assert_eq!(rssi_units(1, false, 30_720_000, 8), 4);
        assert_eq!(rssi_units(64, true, 30_720_000, 8), 8);
    }
}
