//! Clock tree
//!
//! The chip's clocks form a fixed tree rooted at the external reference:
//!
//! ```text
//! REF ─┬─ BB_REFCLK ── BBPLL ── ADC ─┬─ R2 ── R1 ── CLKRF ── RX_SAMPL
//!      │                              └─ DAC ── T2 ── T1 ── CLKTF ── TX_SAMPL
//!      ├─ RX_REFCLK ── RX_RFPLL
//!      └─ TX_REFCLK ── TX_RFPLL
//! ```
//!
//! Each node is one [`ClockId`]. Its behavior is selected by a closed
//! [`ClockKind`]: reference scaler, BBPLL, integer divider or RF synthesizer.
//! [`ClockGraph`] caches the last derived rate of every node; rates are
//! recomputed from hardware on [`ClockGraph::get_rate`] and every
//! descendant is re-derived after [`ClockGraph::set_rate`].

pub mod bbpll;
pub mod rfpll;

use embedded_hal::delay::DelayNs;

use crate::config::{MAX_ADC_CLK, MAX_BASEBAND_RATE, MAX_BBPLL_DIV, MAX_BBPLL_FREQ, MAX_DAC_CLK, MIN_ADC_CLK, MIN_BBPLL_DIV};
use crate::error::{Error, Result};
use crate::regs;
use crate::transport::{RegisterBus, RegisterTransport};
use crate::types::Direction;

use bbpll::BbpllWord;
use rfpll::RfpllWord;

/// Number of clock nodes
pub const CLOCK_COUNT: usize = 16;

/// Clock tree node, in topological order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum ClockId {
    BbRefClk,
    RxRefClk,
    TxRefClk,
    Bbpll,
    Adc,
    R2,
    R1,
    ClkRf,
    RxSampl,
    Dac,
    T2,
    T1,
    ClkTf,
    TxSampl,
    RxRfpll,
    TxRfpll,
}

impl ClockId {
    /// Every node; parents always precede their children
    pub const ALL: [Self; CLOCK_COUNT] = [
        Self::BbRefClk,
        Self::RxRefClk,
        Self::TxRefClk,
        Self::Bbpll,
        Self::Adc,
        Self::R2,
        Self::R1,
        Self::ClkRf,
        Self::RxSampl,
        Self::Dac,
        Self::T2,
        Self::T1,
        Self::ClkTf,
        Self::TxSampl,
        Self::RxRfpll,
        Self::TxRfpll,
    ];

    /// Position in [`Self::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parent node; `None` for nodes fed by the external reference
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::BbRefClk | Self::RxRefClk | Self::TxRefClk => None,
            Self::Bbpll => Some(Self::BbRefClk),
            Self::Adc => Some(Self::Bbpll),
            Self::R2 | Self::Dac => Some(Self::Adc),
            Self::R1 => Some(Self::R2),
            Self::ClkRf => Some(Self::R1),
            Self::RxSampl => Some(Self::ClkRf),
            Self::T2 => Some(Self::Dac),
            Self::T1 => Some(Self::T2),
            Self::ClkTf => Some(Self::T1),
            Self::TxSampl => Some(Self::ClkTf),
            Self::RxRfpll => Some(Self::RxRefClk),
            Self::TxRfpll => Some(Self::TxRefClk),
        }
    }

    /// Whether `ancestor` lies on this node's path to the reference
    #[must_use]
    pub fn descends_from(self, ancestor: Self) -> bool {
        let mut node = self.parent();
        while let Some(n) = node {
            if n == ancestor {
                return true;
            }
            node = n.parent();
        }
        false
    }

    const fn kind(self) -> ClockKind {
        use regs::{
            BBPLL, BBPLL_DIVIDER, DAC_CLK_DIV2, FIR_ENABLE, HB1_ENABLE, HB2_ENABLE, HB3_ENABLE,
            RX_ENABLE_FILTER_CTRL, TX_ENABLE_FILTER_CTRL,
        };
        const fn div(addr: u16, mask: u8, divider: Divider) -> ClockKind {
            ClockKind::Divider { addr, mask, divider }
        }
        match self {
            Self::BbRefClk => ClockKind::Scaler(RefPath::Baseband),
            Self::RxRefClk => ClockKind::Scaler(RefPath::Rx),
            Self::TxRefClk => ClockKind::Scaler(RefPath::Tx),
            Self::Bbpll => ClockKind::Bbpll,
            Self::Adc => div(BBPLL, BBPLL_DIVIDER, Divider::Pow2),
            Self::R2 => div(RX_ENABLE_FILTER_CTRL, HB3_ENABLE, Divider::Hb3),
            Self::R1 => div(RX_ENABLE_FILTER_CTRL, HB2_ENABLE, Divider::Half),
            Self::ClkRf => div(RX_ENABLE_FILTER_CTRL, HB1_ENABLE, Divider::Half),
            Self::RxSampl => div(RX_ENABLE_FILTER_CTRL, FIR_ENABLE, Divider::Fir),
            Self::Dac => div(BBPLL, DAC_CLK_DIV2, Divider::Half),
            Self::T2 => div(TX_ENABLE_FILTER_CTRL, HB3_ENABLE, Divider::Hb3),
            Self::T1 => div(TX_ENABLE_FILTER_CTRL, HB2_ENABLE, Divider::Half),
            Self::ClkTf => div(TX_ENABLE_FILTER_CTRL, HB1_ENABLE, Divider::Half),
            Self::TxSampl => div(TX_ENABLE_FILTER_CTRL, FIR_ENABLE, Divider::Fir),
            Self::RxRfpll => ClockKind::Rfpll(Direction::Rx),
            Self::TxRfpll => ClockKind::Rfpll(Direction::Tx),
        }
    }
}

/// Which reference scaler a node uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RefPath {
    Baseband,
    Rx,
    Tx,
}

/// Integer divider encodings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Divider {
    /// 2^field, field 1..=6
    Pow2,
    /// One bit: divide by 1 or 2
    Half,
    /// field + 1, field 0..=2
    Hb3,
    /// FIR decimation: 0 and 1 pass through, 2 halves, 3 quarters
    Fir,
}

impl Divider {
    const fn divisors(self) -> &'static [u32] {
        match self {
            Self::Pow2 => &[2, 4, 8, 16, 32, 64],
            Self::Half => &[1, 2],
            Self::Hb3 => &[1, 2, 3],
            Self::Fir => &[1, 2, 4],
        }
    }

    const fn decode(self, field: u8) -> u32 {
        match self {
            Self::Pow2 => {
                let f = if field == 0 { 1 } else { field };
                1 << f
            }
            Self::Half => 1 + field as u32,
            Self::Hb3 => 1 + field as u32,
            Self::Fir => match field {
                0 | 1 => 1,
                2 => 2,
                _ => 4,
            },
        }
    }

    const fn encode(self, div: u32) -> u8 {
        match self {
            Self::Pow2 => div.trailing_zeros() as u8,
            Self::Half | Self::Hb3 => (div - 1) as u8,
            Self::Fir => match div {
                1 => 1,
                2 => 2,
                _ => 3,
            },
        }
    }

    /// Divisor bringing `parent` closest to `rate`
    fn nearest(self, parent: u64, rate: u64) -> u32 {
        let mut best = self.divisors()[0];
        let mut best_err = u64::MAX;
        for &div in self.divisors() {
            let err = (parent / u64::from(div)).abs_diff(rate);
            if err < best_err {
                best = div;
                best_err = err;
            }
        }
        best
    }
}

/// Reference scaler settings: field code 0 = ×1, 1 = ÷2, 2 = ÷4, 3 = ×2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefScaler(u8);

impl RefScaler {
    const CODES: [u8; 4] = [0, 3, 1, 2];

    /// Scaler closest to `rate` from `parent`
    #[must_use]
    pub fn nearest(parent: u64, rate: u64) -> Self {
        Self::CODES
            .iter()
            .map(|&c| Self(c))
            .min_by_key(|s| s.apply(parent).abs_diff(rate))
            .unwrap_or(Self(0))
    }

    /// Output rate for an input of `parent` Hz
    #[must_use]
    pub const fn apply(self, parent: u64) -> u64 {
        match self.0 & 0x3 {
            0 => parent,
            1 => parent / 2,
            2 => parent / 4,
            _ => parent * 2,
        }
    }

    /// Field code
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }
}

/// Node behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockKind {
    Scaler(RefPath),
    Bbpll,
    Divider { addr: u16, mask: u8, divider: Divider },
    Rfpll(Direction),
}

/// Rates of every clock node of one chip
#[derive(Clone, Debug)]
pub struct ClockGraph {
    reference: u64,
    rates: [u64; CLOCK_COUNT],
}

impl ClockGraph {
    /// Graph fed by a reference of `reference` Hz; node rates start unknown (0).
    #[must_use]
    pub const fn new(reference: u64) -> Self {
        Self {
            reference,
            rates: [0; CLOCK_COUNT],
        }
    }

    /// External reference, Hz
    #[must_use]
    pub const fn reference(&self) -> u64 {
        self.reference
    }

    /// Last derived rate of a node, without touching hardware
    #[must_use]
    pub const fn rate(&self, id: ClockId) -> u64 {
        self.rates[id.index()]
    }

    fn parent_rate(&self, id: ClockId) -> u64 {
        id.parent().map_or(self.reference, |p| self.rates[p.index()])
    }

    /// Re-read a node and its ancestors from hardware.
    pub fn get_rate<T, D>(&mut self, bus: &mut RegisterBus<T, D>, id: ClockId) -> Result<u64, T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        if let Some(parent) = id.parent() {
            self.get_rate(bus, parent)?;
        }
        let rate = self.recalc(bus, id)?;
        self.rates[id.index()] = rate;
        Ok(rate)
    }

    /// Nearest achievable rate for a node given its parent's current rate.
    /// Writes nothing.
    #[must_use]
    pub fn round_rate(&self, id: ClockId, rate: u64) -> u64 {
        let parent = self.parent_rate(id);
        if parent == 0 {
            return 0;
        }
        match id.kind() {
            ClockKind::Scaler(_) => RefScaler::nearest(parent, rate).apply(parent),
            ClockKind::Bbpll => bbpll::round_rate(parent, rate),
            ClockKind::Divider { divider, .. } => parent / u64::from(divider.nearest(parent, rate)),
            ClockKind::Rfpll(_) => rfpll::round_rate(parent, rate),
        }
    }

    /// Program a node to the nearest achievable rate, then re-derive every
    /// descendant in topological order. Returns the node's new rate.
    ///
    /// BBPLL and RF synthesizer targets outside their windows are rejected
    /// before any write. A lock timeout leaves the written words in place.
    pub fn set_rate<T, D>(
        &mut self,
        bus: &mut RegisterBus<T, D>,
        id: ClockId,
        rate: u64,
    ) -> Result<u64, T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        let parent = self.parent_rate(id);
        if parent == 0 {
            return Err(Error::invalid("parent clock rate", 0));
        }

        match id.kind() {
            ClockKind::Scaler(path) => {
                let scaler = RefScaler::nearest(parent, rate);
                Self::write_scaler(bus, path, scaler)?;
            }
            ClockKind::Bbpll => {
                if !bbpll::in_range(rate) {
                    return Err(Error::invalid("BBPLL rate", clamp_i64(rate)));
                }
                Self::program_bbpll(bus, parent, rate)?;
            }
            ClockKind::Divider { addr, mask, divider } => {
                let div = divider.nearest(parent, rate);
                bus.write_field(addr, mask, divider.encode(div))?;
            }
            ClockKind::Rfpll(dir) => {
                if !rfpll::in_range(rate) {
                    return Err(Error::invalid("LO frequency", clamp_i64(rate)));
                }
                Self::program_rfpll(bus, dir, parent, rate)?;
            }
        }

        let new_rate = self.recalc(bus, id)?;
        self.rates[id.index()] = new_rate;
        debug!("clock {:?} set to {} Hz", id, new_rate);

        for child in ClockId::ALL.iter().skip(id.index() + 1) {
            if child.descends_from(id) {
                let r = self.recalc(bus, *child)?;
                self.rates[child.index()] = r;
            }
        }
        Ok(new_rate)
    }

    fn recalc<T, D>(&self, bus: &mut RegisterBus<T, D>, id: ClockId) -> Result<u64, T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        let parent = self.parent_rate(id);
        if parent == 0 {
            return Ok(0);
        }
        let rate = match id.kind() {
            ClockKind::Scaler(path) => Self::read_scaler(bus, path)?.apply(parent),
            ClockKind::Bbpll => {
                let integer = bus.read(regs::INTEGER_BB_FREQ_WORD)?;
                let mut buf = [0u8; 3];
                bus.read_block(regs::FRACT_BB_FREQ_WORD_3, &mut buf)?;
                BbpllWord::from_registers(integer, [buf[2], buf[1], buf[0]]).frequency(parent)
            }
            ClockKind::Divider { addr, mask, divider } => {
                parent / u64::from(divider.decode(bus.read_field(addr, mask)?))
            }
            ClockKind::Rfpll(dir) => {
                let mut buf = [0u8; 5];
                bus.read_block(regs::RX_FRACT_BYTE_2 + dir.synth_offset(), &mut buf)?;
                let vco_div = bus.read_field(regs::RFPLL_DIVIDERS, vco_divider_mask(dir))?;
                RfpllWord::from_registers(buf, vco_div).frequency(parent)
            }
        };
        Ok(rate)
    }

    fn read_scaler<T, D>(bus: &mut RegisterBus<T, D>, path: RefPath) -> Result<RefScaler, T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        let code = match path {
            RefPath::Baseband => bus.read_field(regs::CLOCK_CTRL, regs::REF_FREQ_SCALER)?,
            RefPath::Rx => {
                let msb = bus.read_field(regs::REF_DIVIDE_CONFIG_1, regs::RX_REF_DIVIDER_MSB)?;
                let lsb = bus.read_field(regs::REF_DIVIDE_CONFIG_2, regs::RX_REF_DIVIDER_LSB)?;
                (msb << 1) | lsb
            }
            RefPath::Tx => bus.read_field(regs::REF_DIVIDE_CONFIG_2, regs::TX_REF_DIVIDER)?,
        };
        Ok(RefScaler(code))
    }

    fn write_scaler<T, D>(bus: &mut RegisterBus<T, D>, path: RefPath, scaler: RefScaler) -> Result<(), T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        let code = scaler.code();
        match path {
            RefPath::Baseband => bus.write_field(regs::CLOCK_CTRL, regs::REF_FREQ_SCALER, code),
            RefPath::Rx => {
                bus.write_field(regs::REF_DIVIDE_CONFIG_1, regs::RX_REF_DIVIDER_MSB, code >> 1)?;
                bus.write_field(regs::REF_DIVIDE_CONFIG_2, regs::RX_REF_DIVIDER_LSB, code & 1)
            }
            RefPath::Tx => bus.write_field(regs::REF_DIVIDE_CONFIG_2, regs::TX_REF_DIVIDER, code),
        }
    }

    fn program_bbpll<T, D>(bus: &mut RegisterBus<T, D>, parent: u64, rate: u64) -> Result<(), T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        bus.write(regs::CP_CURRENT, bbpll::charge_pump_code(parent, rate))?;
        bus.write_block(regs::LOOP_FILTER_3, &bbpll::LOOP_FILTER)?;
        bus.write(regs::VCO_CTRL, regs::FREQ_CAL_ENABLE | regs::FREQ_CAL_COUNT_LENGTH)?;
        bus.write(regs::SDM_CTRL, 0x10)?;

        let word = BbpllWord::calc(parent, rate);
        let (integer, fract) = word.to_registers();
        bus.write(regs::FRACT_BB_FREQ_WORD_1, fract[0])?;
        bus.write(regs::FRACT_BB_FREQ_WORD_2, fract[1])?;
        bus.write(regs::FRACT_BB_FREQ_WORD_3, fract[2])?;
        bus.write(regs::INTEGER_BB_FREQ_WORD, integer)?;

        bus.write(regs::SDM_CTRL_1, regs::INIT_BB_FO_CAL | regs::BBPLL_RESET_BAR)?;
        bus.write(regs::SDM_CTRL_1, regs::BBPLL_RESET_BAR)?;

        bus.poll_field(regs::CH_1_OVERFLOW, regs::BBPLL_LOCK, 1)
    }

    fn program_rfpll<T, D>(
        bus: &mut RegisterBus<T, D>,
        dir: Direction,
        parent: u64,
        lo: u64,
    ) -> Result<(), T::Error>
    where
        T: RegisterTransport,
        D: DelayNs,
    {
        let offs = dir.synth_offset();
        let word = RfpllWord::calc(parent, lo);
        let vco = rfpll::vco_settings(word.vco_frequency(parent));

        bus.write(regs::RX_VCO_OUTPUT + offs, vco.vco_output_level)?;
        bus.write(regs::RX_ALC_VARACTOR + offs, vco.vco_varactor)?;
        bus.write(regs::RX_VCO_BIAS_1 + offs, vco.vco_bias_ref | vco.vco_bias_tcf)?;
        bus.write(regs::RX_VCO_CAL_REF + offs, vco.vco_cal_offset)?;
        bus.write(regs::RX_VCO_VARACTOR_CTRL_1 + offs, vco.vco_varactor_reference)?;
        bus.write(regs::RX_CP_CURRENT + offs, vco.charge_pump_current)?;
        bus.write(regs::RX_LOOP_FILTER_1 + offs, vco.loop_filter[0])?;
        bus.write(regs::RX_LOOP_FILTER_2 + offs, vco.loop_filter[1])?;
        bus.write(regs::RX_LOOP_FILTER_3 + offs, vco.loop_filter[2])?;

        bus.write_block(regs::RX_FRACT_BYTE_2 + offs, &word.to_registers())?;
        bus.write_field(regs::RFPLL_DIVIDERS, vco_divider_mask(dir), word.vco_div)?;

        bus.poll_field(regs::RX_CP_OVERRANGE_VCO_LOCK + offs, regs::VCO_LOCK, 1)
    }
}

const fn vco_divider_mask(dir: Direction) -> u8 {
    match dir {
        Direction::Rx => regs::RX_VCO_DIVIDER,
        Direction::Tx => regs::TX_VCO_DIVIDER,
    }
}

pub(crate) fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Index of each rate in a path clock vector
#[allow(missing_docs)]
pub mod path {
    pub const BBPLL: usize = 0;
    pub const ADC_DAC: usize = 1;
    pub const HB3: usize = 2;
    pub const HB2: usize = 3;
    pub const HB1: usize = 4;
    pub const SAMPL: usize = 5;
}

/// How aggressively the planner oversamples
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateGovernor {
    /// Highest ADC oversampling that fits
    #[default]
    HighOsr,
    /// Nominal oversampling
    Nominal,
}

/// RX and TX path clock vectors: BBPLL, ADC/DAC, HB3, HB2, HB1, sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockChain {
    /// BBPLL, ADC, R2, R1, CLKRF, RX sample
    pub rx: [u64; 6],
    /// BBPLL, DAC, T2, T1, CLKTF, TX sample
    pub tx: [u64; 6],
}

/// ADC over CLKRF ratio, then HB3, HB2, HB1 divisors
const CLK_DIVIDERS: [[u64; 4]; 7] = [
    [12, 3, 2, 2],
    [8, 2, 2, 2],
    [6, 3, 1, 2],
    [4, 2, 2, 1],
    [3, 3, 1, 1],
    [2, 2, 1, 1],
    [1, 1, 1, 1],
];

/// Plan the RX and TX clock chains for a sample rate.
///
/// `rx_intdec` and `tx_intdec` are the FIR decimation and interpolation
/// (1 when bypassed). Returns `None` when no divider set keeps the ADC
/// clock and BBPLL inside their limits.
#[must_use]
pub fn calculate_rf_clock_chain(
    sample_rate: u64,
    governor: RateGovernor,
    rx_intdec: u64,
    tx_intdec: u64,
) -> Option<ClockChain> {
    if sample_rate == 0 || sample_rate > MAX_BASEBAND_RATE || rx_intdec == 0 || tx_intdec == 0 {
        return None;
    }

    let clkrf = sample_rate * rx_intdec;
    let clktf = sample_rate * tx_intdec;

    let mut first = match governor {
        RateGovernor::HighOsr => 0,
        RateGovernor::Nominal => 1,
    };
    // nominal oversampling that would starve the ADC falls back to the highest
    if first == 1 && clkrf * 8 < MIN_ADC_CLK {
        first = 0;
    }

    for start in first..CLK_DIVIDERS.len() {
        if let Some(chain) = plan_from(start, clkrf, clktf, rx_intdec, tx_intdec) {
            return Some(chain);
        }
    }

    warn!("no clock chain for {} Hz", sample_rate);
    None
}

fn plan_from(start: usize, clkrf: u64, clktf: u64, rx_intdec: u64, tx_intdec: u64) -> Option<ClockChain> {
    let mut found = None;
    for (i, row) in CLK_DIVIDERS.iter().enumerate().skip(start) {
        let adc = clkrf * row[0];
        let dac = clktf * row[0];
        if !(MIN_ADC_CLK..=MAX_ADC_CLK).contains(&adc) {
            continue;
        }
        let ratio = (adc / dac) as usize;
        let (index_tx, dac) = if adc <= MAX_DAC_CLK {
            (i.checked_sub(if ratio == 1 { 0 } else { ratio })?, adc)
        } else if i == 4 && ratio >= 2 {
            (7usize.checked_sub(ratio)?, adc / 2)
        } else {
            let step = if i == 5 && ratio >= 2 { 1 } else { 2 };
            ((i + step).checked_sub(if ratio == 1 { 0 } else { ratio })?, adc / 2)
        };
        found = Some((i, index_tx, adc, dac));
        break;
    }

    let (index_rx, index_tx, adc, dac) = found?;
    if index_tx >= CLK_DIVIDERS.len() {
        return None;
    }

    let mut div = u64::from(MAX_BBPLL_DIV);
    let bbpll = loop {
        let rate = adc * div;
        div >>= 1;
        if rate <= MAX_BBPLL_FREQ || div < u64::from(MIN_BBPLL_DIV) {
            break rate;
        }
    };
    if !bbpll::in_range(bbpll) {
        return None;
    }

    let r = CLK_DIVIDERS[index_rx];
    let t = CLK_DIVIDERS[index_tx];
    let r2 = adc / r[1];
    let r1 = r2 / r[2];
    let rf = r1 / r[3];
    let t2 = dac / t[1];
    let t1 = t2 / t[2];
    let tf = t1 / t[3];

    Some(ClockChain {
        rx: [bbpll, adc, r2, r1, rf, rf / rx_intdec],
        tx: [bbpll, dac, t2, t1, tf, tf / tx_intdec],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topological_order() {
        for id in ClockId::ALL {
            if let Some(parent) = id.parent() {
                assert!(parent.index() < id.index(), "{id:?}");
            }
            assert_eq!(ClockId::ALL[id.index()], id);
        }
    }

    #[test]
    fn descendants_of_bbpll() {
        for id in [ClockId::Adc, ClockId::R2, ClockId::ClkRf, ClockId::Dac, ClockId::TxSampl] {
            assert!(id.descends_from(ClockId::Bbpll));
        }
        assert!(!ClockId::RxRfpll.descends_from(ClockId::Bbpll));
        assert!(!ClockId::Bbpll.descends_from(ClockId::Bbpll));
    }

    #[test]
    fn divider_encodings() {
        assert_eq!(Divider::Pow2.decode(Divider::Pow2.encode(16)), 16);
        assert_eq!(Divider::Hb3.encode(3), 2);
        assert_eq!(Divider::Fir.decode(0), 1);
        assert_eq!(Divider::Fir.encode(4), 3);
        assert_eq!(Divider::Half.nearest(245_760_000, 122_880_000), 2);
        assert_eq!(Divider::Fir.nearest(30_720_000, 10_000_000), 4);
    }

    #[test]
    fn reference_scaler_picks_doubler() {
        let s = RefScaler::nearest(40_000_000, 80_000_000);
        assert_eq!(s.code(), 3);
        assert_eq!(s.apply(40_000_000), 80_000_000);
        assert_eq!(RefScaler::nearest(40_000_000, 40_000_000).code(), 0);
        assert_eq!(RefScaler::nearest(40_000_000, 10_000_000).code(), 2);
    }

    #[test]
    fn chain_for_lte20_rate() {
        let chain = calculate_rf_clock_chain(30_720_000, RateGovernor::HighOsr, 1, 1).unwrap();
        assert_eq!(chain.rx, [737_280_000, 368_640_000, 122_880_000, 61_440_000, 30_720_000, 30_720_000]);
        assert_eq!(chain.tx, [737_280_000, 184_320_000, 61_440_000, 61_440_000, 30_720_000, 30_720_000]);
    }

    #[test]
    fn chain_nominal_governor() {
        let chain = calculate_rf_clock_chain(30_720_000, RateGovernor::Nominal, 1, 1).unwrap();
        assert_eq!(chain.rx[path::BBPLL], 983_040_000);
        assert_eq!(chain.rx[path::ADC_DAC], 245_760_000);
        assert_eq!(chain.rx[path::SAMPL], 30_720_000);
        assert_eq!(chain.tx[path::SAMPL], 30_720_000);
    }

    #[test]
    fn chain_rejects_out_of_range_rate() {
        assert!(calculate_rf_clock_chain(0, RateGovernor::HighOsr, 1, 1).is_none());
        assert!(calculate_rf_clock_chain(100_000_000, RateGovernor::HighOsr, 1, 1).is_none());
    }
}
