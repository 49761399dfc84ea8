//! AD9361 register map
//!
//! Addresses are 10 bits wide. Field masks are given as in-place masks;
//! the transport shifts field values to and from the mask's lowest set bit.
//! TX synthesizer registers mirror the RX bank at [`TX_SYNTH_OFFSET`].

#![allow(missing_docs)]

/* SPI / chip level */
pub const SPI_CONF: u16 = 0x000;
pub const TX_ENABLE_FILTER_CTRL: u16 = 0x002;
pub const RX_ENABLE_FILTER_CTRL: u16 = 0x003;
pub const INPUT_SELECT: u16 = 0x004;
pub const RFPLL_DIVIDERS: u16 = 0x005;
pub const RX_CLOCK_DATA_DELAY: u16 = 0x006;
pub const TX_CLOCK_DATA_DELAY: u16 = 0x007;
pub const CLOCK_ENABLE: u16 = 0x009;
pub const BBPLL: u16 = 0x00A;
pub const START_TEMP_READING: u16 = 0x00B;
pub const TEMPERATURE: u16 = 0x00C;
pub const TEMP_OFFSET: u16 = 0x00D;
pub const TEMP_SENSOR_CONFIG: u16 = 0x00E;
pub const TEMP_SENSE2: u16 = 0x00F;
pub const PARALLEL_PORT_CONF_1: u16 = 0x010;
pub const PARALLEL_PORT_CONF_2: u16 = 0x011;
pub const PARALLEL_PORT_CONF_3: u16 = 0x012;
pub const ENSM_MODE: u16 = 0x013;
pub const ENSM_CONFIG_1: u16 = 0x014;
pub const ENSM_CONFIG_2: u16 = 0x015;
pub const CALIBRATION_CTRL: u16 = 0x016;
pub const STATE: u16 = 0x017;
pub const AUXDAC_1_WORD: u16 = 0x018;
pub const AUXDAC_2_WORD: u16 = 0x019;
pub const AUXDAC_1_CONFIG: u16 = 0x01A;
pub const AUXDAC_2_CONFIG: u16 = 0x01B;
pub const AUXADC_CLOCK_DIVIDER: u16 = 0x01C;
pub const AUXADC_CONFIG: u16 = 0x01D;
pub const AUXADC_WORD_MSB: u16 = 0x01E;
pub const AUXADC_WORD_LSB: u16 = 0x01F;
pub const AUTO_GPO: u16 = 0x020;
pub const AGC_ATTACK_DELAY: u16 = 0x022;
pub const AUXDAC_ENABLE_CTRL: u16 = 0x023;
pub const EXTERNAL_LNA_CTRL: u16 = 0x026;
pub const GPO_FORCE_AND_INIT: u16 = 0x027;
pub const GPO0_RX_DELAY: u16 = 0x028;
pub const GPO0_TX_DELAY: u16 = 0x02C;
pub const AUXDAC1_RX_DELAY: u16 = 0x030;
pub const AUXDAC1_TX_DELAY: u16 = 0x031;
pub const AUXDAC2_RX_DELAY: u16 = 0x032;
pub const AUXDAC2_TX_DELAY: u16 = 0x033;
pub const CTRL_OUTPUT_POINTER: u16 = 0x035;
pub const CTRL_OUTPUT_ENABLE: u16 = 0x036;
pub const PRODUCT_ID: u16 = 0x037;
pub const REFERENCE_CLOCK_CYCLES: u16 = 0x03A;
pub const DIGITAL_IO_CTRL: u16 = 0x03B;
pub const LVDS_BIAS_CTRL: u16 = 0x03C;
pub const LVDS_INVERT_CTRL1: u16 = 0x03D;
pub const LVDS_INVERT_CTRL2: u16 = 0x03E;
pub const SDM_CTRL_1: u16 = 0x03F;
pub const INTEGER_BB_FREQ_WORD: u16 = 0x041;
pub const FRACT_BB_FREQ_WORD_1: u16 = 0x042;
pub const FRACT_BB_FREQ_WORD_2: u16 = 0x043;
pub const FRACT_BB_FREQ_WORD_3: u16 = 0x044;
pub const CLOCK_CTRL: u16 = 0x045;
pub const CP_CURRENT: u16 = 0x046;
pub const LOOP_FILTER_3: u16 = 0x04A;
pub const VCO_CTRL: u16 = 0x04E;
pub const SDM_CTRL: u16 = 0x04F;
pub const CH_1_OVERFLOW: u16 = 0x05E;

/* TX FIR and attenuation */
pub const TX_FILTER_COEF_ADDR: u16 = 0x060;
pub const TX_FILTER_COEF_WRITE_DATA_1: u16 = 0x061;
pub const TX_FILTER_COEF_WRITE_DATA_2: u16 = 0x062;
pub const TX_FILTER_COEF_READ_DATA_2: u16 = 0x064;
pub const TX_FILTER_CONF: u16 = 0x065;
pub const TX1_ATTEN_0: u16 = 0x073;
pub const TX1_ATTEN_1: u16 = 0x074;
pub const TX2_ATTEN_0: u16 = 0x075;
pub const TX2_ATTEN_1: u16 = 0x076;
pub const TX2_DIG_ATTEN: u16 = 0x07C;

/* TX calibration and filters */
pub const TX_TUNE_CTRL: u16 = 0x0CA;
pub const RESISTOR: u16 = 0x0C2;
pub const CAPACITOR: u16 = 0x0C3;
pub const CONFIG0: u16 = 0x0D0;
pub const TX_BBF_TUNE_DIVIDER: u16 = 0x0D6;
pub const TX_BBF_TUNE_MODE: u16 = 0x0D7;
pub const TX_ATTEN_THRESH: u16 = 0x078;

/* RX FIR */
pub const RX_FILTER_COEF_ADDR: u16 = 0x0F0;
pub const RX_FILTER_CONF: u16 = 0x0F5;
pub const RX_FILTER_GAIN: u16 = 0x0F6;

/* Gain control */
pub const AGC_CONFIG_1: u16 = 0x0FA;
pub const AGC_CONFIG_2: u16 = 0x0FB;
pub const AGC_CONFIG_3: u16 = 0x0FC;
pub const MAX_LMT_FULL_GAIN: u16 = 0x0FD;
pub const PEAK_WAIT_TIME: u16 = 0x0FE;
pub const DIGITAL_GAIN: u16 = 0x100;
pub const AGC_LOCK_LEVEL: u16 = 0x101;
pub const GAIN_STP_CONFIG1: u16 = 0x103;
pub const ADC_SMALL_OVERLOAD_THRESH: u16 = 0x104;
pub const ADC_LARGE_OVERLOAD_THRESH: u16 = 0x105;
pub const GAIN_STP_CONFIG_2: u16 = 0x106;
pub const SMALL_LMT_OVERLOAD_THRESH: u16 = 0x107;
pub const LARGE_LMT_OVERLOAD_THRESH: u16 = 0x108;
pub const DEC_POWER_MEASURE_DURATION_0: u16 = 0x10F;
pub const FAST_CONFIG_1: u16 = 0x110;
pub const FAST_CONFIG_2_SETTLING_DELAY: u16 = 0x111;
pub const FAST_ENERGY_LOST_THRESH: u16 = 0x112;
pub const FAST_STRONGER_SIGNAL_THRESH: u16 = 0x113;
pub const FAST_LOW_POWER_THRESH: u16 = 0x114;
pub const FAST_FINAL_OVER_RANGE_AND_OPT_GAIN: u16 = 0x116;
pub const FAST_ENERGY_DETECT_COUNT: u16 = 0x117;
pub const FAST_AGCLL_UPPER_LIMIT: u16 = 0x118;
pub const FAST_GAIN_LOCK_EXIT_COUNT: u16 = 0x119;
pub const FAST_INCREMENT_TIME: u16 = 0x11B;
pub const AGC_INNER_LOW_THRESH: u16 = 0x120;
pub const LMT_OVERLOAD_COUNTERS: u16 = 0x121;
pub const ADC_OVERLOAD_COUNTERS: u16 = 0x122;
pub const GAIN_STP1: u16 = 0x123;
pub const GAIN_UPDATE_COUNTER1: u16 = 0x124;
pub const GAIN_UPDATE_COUNTER2: u16 = 0x125;
pub const DIGITAL_SAT_COUNTER: u16 = 0x128;
pub const OUTER_POWER_THRESHS: u16 = 0x129;
pub const GAIN_STP_2: u16 = 0x12A;
pub const EXT_LNA_HIGH_GAIN: u16 = 0x12C;
pub const EXT_LNA_LOW_GAIN: u16 = 0x12D;

/* Gain table and mixer GM sub-table */
pub const GAIN_TABLE_ADDRESS: u16 = 0x130;
pub const GAIN_TABLE_WRITE_DATA1: u16 = 0x131;
pub const GAIN_TABLE_WRITE_DATA2: u16 = 0x132;
pub const GAIN_TABLE_WRITE_DATA3: u16 = 0x133;
pub const GAIN_TABLE_READ_DATA1: u16 = 0x134;
pub const GAIN_TABLE_CONFIG: u16 = 0x137;
pub const GM_SUB_TABLE_ADDRESS: u16 = 0x138;
pub const GM_SUB_TABLE_GAIN_WRITE: u16 = 0x139;
pub const GM_SUB_TABLE_BIAS_WRITE: u16 = 0x13A;
pub const GM_SUB_TABLE_CTRL_WRITE: u16 = 0x13B;
pub const GM_SUB_TABLE_GAIN_READ: u16 = 0x13C;
pub const GM_SUB_TABLE_CONFIG: u16 = 0x13F;

/* RSSI */
pub const RSSI_CONFIG: u16 = 0x158;
pub const RSSI_DELAY: u16 = 0x159;
pub const RSSI_WAIT_TIME: u16 = 0x15A;
pub const MEASURE_DURATION_01: u16 = 0x150;
pub const MEASURE_DURATION_23: u16 = 0x151;
pub const RSSI_WEIGHT_0: u16 = 0x152;
pub const RSSI_WEIGHT_1: u16 = 0x153;
pub const RSSI_WEIGHT_2: u16 = 0x154;
pub const RSSI_WEIGHT_3: u16 = 0x155;

/* Quadrature / DC calibration */
pub const CALIBRATION_CONFIG_1: u16 = 0x169;
pub const CALIBRATION_CONFIG_2: u16 = 0x16A;
pub const CALIBRATION_CONFIG_3: u16 = 0x16B;
pub const QUAD_CAL_NCO_FREQ_PHASE_OFFSET: u16 = 0x0A0;
pub const QUAD_CAL_CTRL: u16 = 0x0A1;
pub const KEXP_1: u16 = 0x0A2;
pub const KEXP_2: u16 = 0x0A3;
pub const QUAD_CAL_COUNT: u16 = 0x0A4;
pub const TX_QUAD_FULL_LMT_GAIN: u16 = 0x0A5;
pub const QUAD_SETTLE_COUNT: u16 = 0x0A9;
pub const TX_QUAD_LPF_GAIN: u16 = 0x0AA;
pub const QUAD_CAL_STATUS_TX1: u16 = 0x0A7;
pub const QUAD_CAL_STATUS_TX2: u16 = 0x0A8;
pub const WAIT_COUNT: u16 = 0x185;
pub const RF_DC_OFFSET_COUNT: u16 = 0x186;
pub const RF_DC_OFFSET_CONFIG_1: u16 = 0x187;
pub const RF_DC_OFFSET_ATTEN: u16 = 0x188;
pub const INVERT_BITS: u16 = 0x189;
pub const DC_OFFSET_CONFIG2: u16 = 0x18B;
pub const BB_DC_OFFSET_SHIFT: u16 = 0x190;
pub const BB_DC_OFFSET_COUNT: u16 = 0x193;
pub const BB_DC_OFFSET_ATTEN: u16 = 0x194;

/* RX analog filters */
pub const RX_TIA_CONFIG: u16 = 0x1DB;
pub const TIA1_C_LSB: u16 = 0x1DC;
pub const TIA1_C_MSB: u16 = 0x1DD;
pub const TIA2_C_LSB: u16 = 0x1DE;
pub const TIA2_C_MSB: u16 = 0x1DF;
pub const RX1_TUNE_CTRL: u16 = 0x1E2;
pub const RX2_TUNE_CTRL: u16 = 0x1E3;
pub const RX_BBF_R2346: u16 = 0x1E6;
pub const RX_BBF_C3_MSB: u16 = 0x1EB;
pub const RX_BBF_C3_LSB: u16 = 0x1EC;
pub const RX_MIX_LO_CM: u16 = 0x1ED;
pub const RX_MIX_GM_CONFIG: u16 = 0x1EE;
pub const RX_BBF_TUNE_DIVIDE: u16 = 0x1F8;
pub const RX_BBF_TUNE_CONFIG: u16 = 0x1F9;
pub const RX_BBBW_MHZ: u16 = 0x1FB;
pub const RX_BBBW_KHZ: u16 = 0x1FC;

/* ADC setup block, 40 registers */
pub const ADC_SETUP: u16 = 0x200;

/* RX synthesizer bank; TX bank at + TX_SYNTH_OFFSET */
pub const RX_INTEGER_BYTE_0: u16 = 0x231;
pub const RX_INTEGER_BYTE_1: u16 = 0x232;
pub const RX_FRACT_BYTE_0: u16 = 0x233;
pub const RX_FRACT_BYTE_1: u16 = 0x234;
pub const RX_FRACT_BYTE_2: u16 = 0x235;
pub const RX_FORCE_ALC: u16 = 0x236;
pub const RX_FORCE_VCO_TUNE_0: u16 = 0x237;
pub const RX_FORCE_VCO_TUNE_1: u16 = 0x238;
pub const RX_ALC_VARACTOR: u16 = 0x239;
pub const RX_VCO_OUTPUT: u16 = 0x23A;
pub const RX_CP_CURRENT: u16 = 0x23B;
pub const RX_CP_OFFSET: u16 = 0x23C;
pub const RX_CP_CONFIG: u16 = 0x23D;
pub const RX_LOOP_FILTER_1: u16 = 0x23E;
pub const RX_LOOP_FILTER_2: u16 = 0x23F;
pub const RX_LOOP_FILTER_3: u16 = 0x240;
pub const RX_DSM_SETUP_1: u16 = 0x241;
pub const RX_VCO_BIAS_1: u16 = 0x242;
pub const RX_CAL_STATUS: u16 = 0x244;
pub const RX_CP_LEVEL_DETECT: u16 = 0x245;
pub const RX_CP_OVERRANGE_VCO_LOCK: u16 = 0x247;
pub const RX_VCO_LDO: u16 = 0x248;
pub const RX_VCO_PD_OVERRIDES: u16 = 0x249;
pub const RX_LO_GEN_POWER_MODE: u16 = 0x24A;
pub const RX_VCO_VARACTOR_CTRL_1: u16 = 0x250;
pub const RX_VCO_CAL_REF: u16 = 0x251;
pub const RX_VCO_CAL: u16 = 0x252;
pub const RX_FAST_LOCK_SETUP: u16 = 0x25A;
pub const RX_FAST_LOCK_SETUP_INIT_DELAY: u16 = 0x25B;
pub const RX_FAST_LOCK_PROGRAM_ADDR: u16 = 0x25C;
pub const RX_FAST_LOCK_PROGRAM_DATA: u16 = 0x25D;
pub const RX_FAST_LOCK_PROGRAM_READ: u16 = 0x25E;
pub const RX_FAST_LOCK_PROGRAM_CTRL: u16 = 0x25F;
pub const TX_SYNTH_OFFSET: u16 = 0x040;

/* Reference dividers, RF ports, TX monitor */
pub const REF_DIVIDE_CONFIG_1: u16 = 0x2AB;
pub const REF_DIVIDE_CONFIG_2: u16 = 0x2AC;
pub const TPM_MODE_ENABLE: u16 = 0x06D;
pub const TX_MON_DELAY: u16 = 0x06E;
pub const TX_MON_DELAY_HIGH: u16 = 0x06F;
pub const TX_MON_LOW_GAIN: u16 = 0x067;
pub const TX_MON_HIGH_GAIN: u16 = 0x068;
pub const TX_MON_1_CONFIG: u16 = 0x070;
pub const TX_MON_2_CONFIG: u16 = 0x071;

/* Built-in self test */
pub const BIST_CONFIG: u16 = 0x3F4;
pub const OBSERVE_CONFIG: u16 = 0x3F5;

/* BBPLL field bits */
pub const BBPLL_DIVIDER: u8 = 0x07;
pub const DAC_CLK_DIV2: u8 = 1 << 3;
pub const CLKOUT_ENABLE: u8 = 1 << 4;
pub const CLKOUT_SELECT: u8 = 0x07 << 5;
pub const REF_FREQ_SCALER: u8 = 0x03;
pub const RX_REF_DIVIDER_MSB: u8 = 1 << 0;
pub const RX_REF_DIVIDER_LSB: u8 = 1 << 7;
pub const TX_REF_DIVIDER: u8 = 0x03 << 2;
pub const BBPLL_LOCK: u8 = 1 << 7;
pub const FREQ_CAL_ENABLE: u8 = 1 << 7;
pub const FREQ_CAL_COUNT_LENGTH: u8 = 0x03 << 5;
pub const INIT_BB_FO_CAL: u8 = 1 << 2;
pub const BBPLL_RESET_BAR: u8 = 1 << 0;

/* Filter control fields (RX_ENABLE_FILTER_CTRL / TX_ENABLE_FILTER_CTRL) */
pub const CHANNEL_ENABLE: u8 = 0x03 << 6;
pub const HB3_ENABLE: u8 = 0x03 << 4;
pub const HB2_ENABLE: u8 = 1 << 3;
pub const HB1_ENABLE: u8 = 1 << 2;
pub const FIR_ENABLE: u8 = 0x03;

/* RFPLL_DIVIDERS */
pub const RX_VCO_DIVIDER: u8 = 0x0F;
pub const TX_VCO_DIVIDER: u8 = 0xF0;

/* CLOCK_ENABLE */
pub const DIGITAL_POWER_UP: u8 = 1 << 4;
pub const CLOCK_ENABLE_DFLT: u8 = 1 << 2;
pub const BBPLL_ENABLE: u8 = 1 << 1;
pub const XO_BYPASS: u8 = 1 << 0;

/* ENSM */
pub const ENSM_STATE_MASK: u8 = 0x0F;
pub const FORCE_RX_ON: u8 = 1 << 6;
pub const FORCE_TX_ON: u8 = 1 << 5;
pub const ENABLE_ENSM_PIN_CTRL: u8 = 1 << 4;
pub const LEVEL_MODE: u8 = 1 << 3;
pub const FORCE_ALERT_STATE: u8 = 1 << 2;
pub const TO_ALERT: u8 = 1 << 0;
pub const FDD_MODE: u8 = 1 << 3;
pub const DUAL_SYNTH_MODE: u8 = 1 << 7;
pub const TXNRX_SPI_CTRL: u8 = 1 << 1;
pub const RX_SYNTH_READY_MASK: u8 = 1 << 5;
pub const TX_SYNTH_READY_MASK: u8 = 1 << 4;
pub const HALF_DUPLEX_MODE: u8 = 1 << 3;
pub const INVERT_RX2: u8 = 1 << 2;

/* CALIBRATION_CTRL */
pub const RX_BB_TUNE_CAL: u8 = 1 << 7;
pub const TX_BB_TUNE_CAL: u8 = 1 << 6;
pub const RX_QUAD_CAL: u8 = 1 << 5;
pub const TX_QUAD_CAL: u8 = 1 << 4;
pub const TXMON_CAL: u8 = 1 << 2;
pub const RFDC_CAL: u8 = 1 << 1;
pub const BBDC_CAL: u8 = 1 << 0;

/* Synthesizer bank fields */
pub const VCO_LOCK: u8 = 1 << 1;
pub const CP_CAL_VALID: u8 = 1 << 7;
pub const CP_CAL_ENABLE: u8 = 1 << 2;
pub const VCO_CAL_EN: u8 = 1 << 7;
pub const VCO_CAL_COUNT: u8 = 0x03 << 5;
pub const FB_CLOCK_ADV: u8 = 0x03;
pub const FORCE_ALC_ENABLE: u8 = 1 << 7;
pub const FORCE_VCO_TUNE: u8 = 1 << 0;
pub const FAST_LOCK_MODE_ENABLE: u8 = 1 << 0;
pub const FAST_LOCK_PROFILE_PIN_SELECT: u8 = 1 << 1;
pub const FAST_LOCK_PROFILE: u8 = 0x07 << 5;
pub const FAST_LOCK_PROFILE_ADDR: u8 = 0x07 << 4;
pub const FAST_LOCK_PROFILE_WORD: u8 = 0x0F;
pub const FAST_LOCK_PROGRAM_WRITE: u8 = 1 << 1;
pub const FAST_LOCK_PROGRAM_CLOCK_ENABLE: u8 = 1 << 0;

/* Filter tune controls */
pub const RX_TUNE_RESAMPLE: u8 = 1 << 1;
pub const PD_TUNE: u8 = 1 << 0;
pub const TX_TUNER_RESAMPLE: u8 = 1 << 1;
pub const TX_TUNE_CTRL_1: u8 = 1 << 5;
pub const TX_PD_TUNE: u8 = 1 << 2;

/* Quadrature calibration */
pub const TX1_LO_CONV: u8 = 1 << 0;
pub const TX1_SSB_CONV: u8 = 1 << 1;
pub const SETTLE_MAIN_ENABLE: u8 = 1 << 7;
pub const DC_OFFSET_ENABLE: u8 = 1 << 6;
pub const QUAD_CAL_SOFT_RESET: u8 = 1 << 5;
pub const GAIN_ENABLE: u8 = 1 << 4;
pub const PHASE_ENABLE: u8 = 1 << 3;
pub const INVERT_RX1_RF_DC_CGOUT_WORD: u8 = 1 << 6;
pub const INVERT_RX2_RF_DC_CGOUT_WORD: u8 = 1 << 7;
pub const ENABLE_TRACKING_MODE_CH1: u8 = 1 << 6;
pub const ENABLE_TRACKING_MODE_CH2: u8 = 1 << 7;
pub const FREE_RUN_MODE: u8 = 1 << 0;
pub const ENABLE_BB_DC_OFFSET_TRACKING: u8 = 1 << 4;
pub const ENABLE_RF_OFFSET_TRACKING: u8 = 1 << 3;
pub const USE_WAIT_COUNTER_FOR_RF_DC_INIT_CAL: u8 = 1 << 5;
pub const DC_OFFSET_UPDATE: u8 = 0x07 << 1;
pub const RF_DC_CALIBRATION_COUNT: u8 = 0x0F << 4;
pub const RF_DC_OFFSET_ATTEN_MASK: u8 = 0x1F;
pub const BB_DC_M_SHIFT: u8 = 0x0F;
pub const ENABLE_PHASE_CORR: u8 = 1 << 5;
pub const ENABLE_GAIN_CORR: u8 = 1 << 4;
pub const ENABLE_CORR_WORD_DECIMATION: u8 = 1 << 1;
pub const CALIBRATION_CONFIG2_DFLT: u8 = 0x75;
pub const PREVENT_POS_LOOP_GAIN: u8 = 1 << 7;
pub const K_EXP_AMPLITUDE: u8 = 0x1F;
pub const RX_NCO_FREQ: u8 = 0x03 << 5;
pub const RX_NCO_PHASE_OFFSET: u8 = 0x1F;
pub const TX_NCO_FREQ: u8 = 0x03 << 6;
pub const M_DECIM: u8 = 0x07;
pub const KEXP_TX: u8 = 0x03 << 6;
pub const KEXP_TX_COMP: u8 = 0x03 << 4;
pub const KEXP_DC_I: u8 = 0x03 << 2;
pub const KEXP_DC_Q: u8 = 0x03;
pub const RX_BBF_TUNE_DIVIDE_MSB: u8 = 1 << 0;
pub const TX_BBF_TUNE_DIVIDE_MSB: u8 = 1 << 0;
pub const RX_BBF_R2346_MASK: u8 = 0x07;

/* Gain table */
pub const START_GAIN_TABLE_CLOCK: u8 = 1 << 0;
pub const WRITE_GAIN_TABLE: u8 = 1 << 1;
pub const RX_GAIN_TABLE_SELECT: u8 = 0x03 << 2;
pub const AGC_USE_FULL_GAIN_TABLE: u8 = 1 << 3;
pub const START_GM_SUB_TABLE_CLOCK: u8 = 1 << 0;
pub const WRITE_GM_SUB_TABLE: u8 = 1 << 1;

/* FIR */
pub const FIR_START_CLK: u8 = 1 << 1;
pub const FIR_WRITE: u8 = 1 << 2;
pub const FIR_TX_GAIN_6DB: u8 = 1 << 0;
pub const FIR_SELECT: u8 = 0x03 << 3;
pub const FIR_NUM_TAPS: u8 = 0x07 << 5;
pub const FILTER_GAIN: u8 = 0x03;

/* TX attenuation */
pub const IMMEDIATELY_UPDATE_TPC_ATTEN: u8 = 1 << 6;

/* Gain control fields */
pub const RX1_GAIN_CTRL_SETUP: u8 = 0x03;
pub const RX2_GAIN_CTRL_SETUP: u8 = 0x03 << 2;
pub const SLOW_ATTACK_HYBRID_MODE: u8 = 1 << 4;
pub const DEC_PWR_FOR_LOW_PWR: u8 = 1 << 5;
pub const DEC_PWR_FOR_LOCK_LEVEL: u8 = 1 << 6;
pub const DEC_PWR_FOR_GAIN_LOCK_EXIT: u8 = 1 << 7;
pub const DIG_GAIN_EN: u8 = 1 << 2;
pub const ADC_OVERRANGE_SAMPLE_SIZE: u8 = 0x07;
pub const IMMED_GAIN_CHANGE_LARGE_ADC: u8 = 1 << 3;
pub const IMMED_GAIN_CHANGE_LARGE_LMT: u8 = 1 << 4;
pub const MANUAL_DECR_STEP_SIZE: u8 = 0x07 << 2;
pub const LARGE_LMT_INC_STEPS: u8 = 0x07 << 5;
pub const MANUAL_INCR_STEP_SIZE: u8 = 0x07 << 2;
pub const LARGE_ADC_INC_STEPS: u8 = 0x07 << 5;
pub const MAXIMUM_DIGITAL_GAIN: u8 = 0x1F;
pub const AGC_LOCK_LEVEL_MASK: u8 = 0x7F;
pub const PREVENT_GAIN_INC: u8 = 1 << 7;
pub const INNER_LOW_THRESH: u8 = 0x7F;
pub const LARGE_EXCEED_COUNTER: u8 = 0x0F << 4;
pub const SMALL_EXCEED_COUNTER: u8 = 0x0F;
pub const INNER_HIGH_DEC_STEPS: u8 = 0x0F << 4;
pub const INNER_LOW_INC_STEPS: u8 = 0x0F;
pub const OUTER_HIGH_THRESH: u8 = 0x0F << 4;
pub const OUTER_LOW_THRESH: u8 = 0x0F;
pub const OUTER_HIGH_DEC_STEPS: u8 = 0x0F << 4;
pub const OUTER_LOW_INC_STEPS: u8 = 0x0F;
pub const DIG_SATURATION_EXCEED_COUNTER: u8 = 0x0F << 4;
pub const ENABLE_SYNC_FOR_GAIN_COUNTER: u8 = 1 << 3;
pub const DIG_GAIN_STEP_SIZE: u8 = 0x07 << 5;
pub const ENERGY_DETECT_COUNT: u8 = 0x1F;
pub const INCREMENT_GAIN_STEP: u8 = 0x07 << 5;
pub const FAST_THRESH: u8 = 0x3F;
pub const FAST_FINAL_SETTLING_STEPS: u8 = 0x03 << 6;
pub const FAST_FINAL_OVERRANGE_COUNT: u8 = 0x07 << 5;
pub const FAST_OPTIMIZED_GAIN_OFFSET: u8 = 0x0F;
pub const FAST_GAIN_INC_AFTER_LOCK: u8 = 1 << 0;
pub const FAST_RST_GLA_LARGE_ADC: u8 = 1 << 1;
pub const FAST_RST_GLA_LARGE_LMT: u8 = 1 << 2;

/* RSSI */
pub const RSSI_MODE_SELECT: u8 = 0x07 << 2;
pub const DEFAULT_RSSI_MEAS_MODE: u8 = 1 << 0;
pub const RSSI_MEAS_DURATION_LOW: u8 = 0x0F;
pub const RSSI_MEAS_DURATION_HIGH: u8 = 0x0F << 4;

pub const DOUBLE_GAIN_COUNTER: u8 = 1 << 1;
pub const DEC_POWER_MEASUREMENT_DURATION: u8 = 0x0F;
pub const SETTLING_DELAY: u8 = 0x1F;
pub const PEAK_OVERLOAD_WAIT_TIME: u8 = 0x1F;
pub const AGC_ATTACK_DELAY_MASK: u8 = 0x3F;
pub const FORCE_PD_RESET_RX1: u8 = 1 << 6;
pub const FORCE_PD_RESET_RX2: u8 = 1 << 7;
pub const SMALL_LMT_OVERLOAD_MASK: u8 = 0x3F;

/* Data port */
pub const DATA_CLK_DELAY: u8 = 0x0F << 4;
pub const DATA_DELAY: u8 = 0x0F;
pub const RX_INPUT_SELECT: u8 = 0x3F;
pub const TX_OUTPUT_SELECT: u8 = 1 << 6;
pub const LVDS_BIAS: u8 = 0x07;
pub const LVDS_RX_ON_CHIP_TERM: u8 = 1 << 5;
pub const SINGLE_PORT_MODE: u8 = 1 << 2;

/* BIST_CONFIG / OBSERVE_CONFIG */
pub const BIST_ENABLE: u8 = 1 << 0;
pub const BIST_CTRL_POINT: u8 = 0x03 << 2;
pub const BIST_POINT_RX: u8 = 2;
pub const DATA_PORT_LOOP_TEST_ENABLE: u8 = 1 << 0;
pub const DATA_PORT_SP_HD_LOOP_TEST_OE: u8 = 1 << 7;

/* Aux converters */
pub const AUXDAC_WORD_LSB: u8 = 0x03;
pub const AUXDAC_VREF: u8 = 0x03 << 2;
pub const AUXDAC_1_RX_OFF: u8 = 1 << 0;
pub const AUXDAC_2_RX_OFF: u8 = 1 << 1;
pub const AUXDAC_1_TX_OFF: u8 = 1 << 2;
pub const AUXDAC_2_TX_OFF: u8 = 1 << 3;
pub const AUXDAC_1_ALERT_OFF: u8 = 1 << 4;
pub const AUXDAC_2_ALERT_OFF: u8 = 1 << 5;
pub const TEMP_SENSOR_DECIMATION: u8 = 0x07;
pub const PERIODIC_TEMP_MEASUREMENT: u8 = 1 << 0;
pub const TEMP_MEASUREMENT_INTERVAL: u8 = 0x7F << 1;
pub const AUX_ADC_DECIMATION: u8 = 0x07 << 1;

/* External LNA and GPO */
pub const EXTERNAL_LNA1_CTRL: u8 = 1 << 0;
pub const EXTERNAL_LNA2_CTRL: u8 = 1 << 1;
pub const GPO_MANUAL_SELECT: u8 = 1 << 4;
pub const AUXDAC_MANUAL_SELECT: u8 = 1 << 6;
pub const EXT_LNA_GAIN: u8 = 0x3F;
pub const GPO_INIT_STATE: u8 = 0x0F;
pub const GPO_MANUAL_CTRL: u8 = 0x0F << 4;
pub const GPO_AUTO_RX: u8 = 0x0F;
pub const GPO_AUTO_TX: u8 = 0x0F << 4;

/* TX monitor */
pub const TX_MON_DURATION: u8 = 0x0F;
pub const ONE_SHOT_MODE: u8 = 1 << 6;
pub const TX_MON_GAIN: u8 = 0x1F;
pub const TX_MON_TRACK: u8 = 1 << 5;
pub const TX_MON_LO_CM: u8 = 0x3F << 2;
pub const TX_MON_FRONT_END_GAIN: u8 = 0x03;

/* Product id */
pub const PRODUCT_ID_MASK: u8 = 0xF8;
pub const REV_MASK: u8 = 0x07;
