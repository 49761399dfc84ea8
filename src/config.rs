//! Driver constants and hardware limits
//!
//! Limits of the AD9361 clock tree, synthesizers and calibration engine.
//! All frequencies are in Hz unless the name says otherwise.

/// Expected value of the product-ID field (upper five bits)
pub const PRODUCT_ID_AD9361: u8 = 0x08;

/// Poll budget shared by every "wait for done bit" loop
pub const CAL_POLL_RETRIES: u32 = 5_000;

/// Inter-poll delay when polling the calibration control register
pub const CAL_CTRL_POLL_DELAY_US: u32 = 1_200;

/// Inter-poll delay for every other polled register (lock/valid bits)
pub const STATUS_POLL_DELAY_US: u32 = 120;

/// BBPLL fractional modulus (21-bit fraction field)
pub const BBPLL_MODULUS: u64 = 2_088_960;

/// Lowest BBPLL frequency
pub const MIN_BBPLL_FREQ: u64 = 715_829_067;

/// Highest BBPLL frequency
pub const MAX_BBPLL_FREQ: u64 = 1_430_000_000;

/// Smallest BBPLL to ADC divider
pub const MIN_BBPLL_DIV: u32 = 2;

/// Largest BBPLL to ADC divider
pub const MAX_BBPLL_DIV: u32 = 64;

/// RF synthesizer fractional modulus (23-bit fraction field)
pub const RFPLL_MODULUS: u64 = 8_388_593;

/// Minimum RF VCO frequency
pub const MIN_VCO_FREQ: u64 = 6_000_000_000;

/// Maximum RF VCO frequency
pub const MAX_VCO_FREQ: u64 = 12_000_000_000;

/// Lowest tunable carrier
pub const MIN_CARRIER_FREQ: u64 = 70_000_000;

/// Highest tunable carrier
pub const MAX_CARRIER_FREQ: u64 = 6_000_000_000;

/// Maximum reference frequency at the RF synthesizers
pub const MAX_SYNTH_REF: u64 = 80_000_000;

/// Minimum ADC clock (BBPLL minimum over the largest divider)
pub const MIN_ADC_CLK: u64 = MIN_BBPLL_FREQ / MAX_BBPLL_DIV as u64;

/// Maximum ADC clock
pub const MAX_ADC_CLK: u64 = 640_000_000;

/// Maximum DAC clock
pub const MAX_DAC_CLK: u64 = MAX_ADC_CLK / 2;

/// Maximum sample rate with one RX and one TX channel
pub const MAX_BASEBAND_RATE: u64 = 61_440_000;

/// Carrier boundary for the low/high DC offset presets
pub const RF_DC_HIGH_BAND_FREQ: u64 = 4_000_000_000;

/// Upper carrier of the lowest gain-table band
pub const GT_BAND_LOW_MAX: u64 = 1_300_000_000;

/// Upper carrier of the middle gain-table band
pub const GT_BAND_MID_MAX: u64 = 4_000_000_000;

/// Largest TX attenuation in millidB
pub const MAX_TX_ATTEN_MDB: u32 = 89_750;

/// TX attenuation step in millidB
pub const TX_ATTEN_STEP_MDB: u32 = 250;

/// Settle time after enabling clocks when leaving SLEEP
pub const CLOCK_ENABLE_SETTLE_US: u32 = 20;

/// Per-delay settle time while sweeping the digital interface
pub const DIG_TUNE_SETTLE_MS: u32 = 4;

/// Number of delay taps on each digital interface axis
pub const DIG_TUNE_TAPS: usize = 16;

/// Low test rate for digital interface tuning
pub const DIG_TUNE_LOW_RATE: u64 = 10_000_000;

/// Number of RX NCO phase offsets explored by the TX quadrature search
pub const TX_QUAD_PHASES: usize = 32;

/// Fast-lock profiles per direction
pub const FASTLOCK_PROFILES: u8 = 8;

/// Words per fast-lock profile
pub const FASTLOCK_PROFILE_WORDS: usize = 16;

/// Default RX path clocks: BBPLL, ADC, R2, R1, CLKRF, RX sample
pub const DEFAULT_RX_PATH_CLOCKS: [u64; 6] = [
    983_040_000,
    245_760_000,
    122_880_000,
    61_440_000,
    30_720_000,
    30_720_000,
];

/// Default TX path clocks: BBPLL, DAC, T2, T1, CLKTF, TX sample
pub const DEFAULT_TX_PATH_CLOCKS: [u64; 6] = [
    983_040_000,
    122_880_000,
    61_440_000,
    30_720_000,
    30_720_000,
    30_720_000,
];
