//! RX gain tables
//!
//! The full gain table maps a gain index to LNA, mixer, TIA and LPF
//! settings. Three characterized tables cover the carrier range; the table
//! follows the RX LO and is only rewritten when the band changes. The
//! mixer GM sub-table is loaded once at bring-up.

use embedded_hal::delay::DelayNs;

use crate::device::Ad9361;
use crate::error::Result;
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::GainBand;

/// Rows in each full gain table
pub const GAIN_TABLE_ROWS: usize = 77;

/// Size of the on-chip gain table; rows past the table are zeroed
pub const GAIN_TABLE_SIZE: u8 = 90;

/// Both RX channels
const TABLE_SELECT_BOTH: u8 = 0x03;

/// Full table rows for a band
#[must_use]
pub const fn rows(band: GainBand) -> &'static [[u8; 3]; GAIN_TABLE_ROWS] {
    match band {
        GainBand::Low => &GAIN_TABLE_LOW,
        GainBand::Mid => &GAIN_TABLE_MID,
        GainBand::High => &GAIN_TABLE_HIGH,
    }
}

/// Carriers up to 1.3 GHz
const GAIN_TABLE_LOW: [[u8; 3]; GAIN_TABLE_ROWS] = [
    [0x00, 0x00, 0x20], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x01, 0x00],
    [0x00, 0x02, 0x00], [0x00, 0x03, 0x00], [0x00, 0x04, 0x00], [0x00, 0x05, 0x00],
    [0x01, 0x03, 0x20], [0x01, 0x04, 0x00], [0x01, 0x05, 0x00], [0x01, 0x06, 0x00],
    [0x01, 0x07, 0x00], [0x01, 0x08, 0x00], [0x01, 0x09, 0x00], [0x01, 0x0A, 0x00],
    [0x01, 0x0B, 0x00], [0x01, 0x0C, 0x00], [0x01, 0x0D, 0x00], [0x01, 0x0E, 0x00],
    [0x02, 0x09, 0x20], [0x02, 0x0A, 0x00], [0x02, 0x0B, 0x00], [0x02, 0x0C, 0x00],
    [0x02, 0x0D, 0x00], [0x02, 0x0E, 0x00], [0x02, 0x0F, 0x00], [0x02, 0x10, 0x00],
    [0x02, 0x2B, 0x20], [0x02, 0x2C, 0x00], [0x04, 0x28, 0x20], [0x04, 0x29, 0x00],
    [0x04, 0x2A, 0x00], [0x04, 0x2B, 0x00], [0x24, 0x20, 0x20], [0x24, 0x21, 0x00],
    [0x44, 0x20, 0x20], [0x44, 0x21, 0x00], [0x44, 0x22, 0x00], [0x44, 0x23, 0x00],
    [0x44, 0x24, 0x00], [0x44, 0x25, 0x00], [0x44, 0x26, 0x00], [0x44, 0x27, 0x00],
    [0x44, 0x28, 0x00], [0x44, 0x29, 0x00], [0x44, 0x2A, 0x00], [0x44, 0x2B, 0x00],
    [0x44, 0x2C, 0x00], [0x44, 0x2D, 0x00], [0x44, 0x2E, 0x00], [0x44, 0x2F, 0x00],
    [0x44, 0x30, 0x00], [0x44, 0x31, 0x00], [0x44, 0x32, 0x00], [0x64, 0x2E, 0x20],
    [0x64, 0x2F, 0x00], [0x64, 0x30, 0x00], [0x64, 0x31, 0x00], [0x64, 0x32, 0x00],
    [0x64, 0x33, 0x00], [0x64, 0x34, 0x00], [0x64, 0x35, 0x00], [0x64, 0x36, 0x00],
    [0x64, 0x37, 0x00], [0x64, 0x38, 0x00], [0x65, 0x38, 0x20], [0x66, 0x38, 0x20],
    [0x67, 0x38, 0x20], [0x68, 0x38, 0x20], [0x69, 0x38, 0x20], [0x6A, 0x38, 0x20],
    [0x6B, 0x38, 0x20], [0x6C, 0x38, 0x20], [0x6D, 0x38, 0x20], [0x6E, 0x38, 0x20],
    [0x6F, 0x38, 0x20],
];

/// Carriers up to 4 GHz
const GAIN_TABLE_MID: [[u8; 3]; GAIN_TABLE_ROWS] = [
    [0x00, 0x00, 0x20], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x01, 0x00],
    [0x00, 0x02, 0x00], [0x00, 0x03, 0x00], [0x00, 0x04, 0x00], [0x00, 0x05, 0x00],
    [0x01, 0x03, 0x20], [0x01, 0x04, 0x00], [0x01, 0x05, 0x00], [0x01, 0x06, 0x00],
    [0x01, 0x07, 0x00], [0x01, 0x08, 0x00], [0x01, 0x09, 0x00], [0x01, 0x0A, 0x00],
    [0x01, 0x0B, 0x00], [0x01, 0x0C, 0x00], [0x01, 0x0D, 0x00], [0x01, 0x0E, 0x00],
    [0x02, 0x09, 0x20], [0x02, 0x0A, 0x00], [0x02, 0x0B, 0x00], [0x02, 0x0C, 0x00],
    [0x02, 0x0D, 0x00], [0x02, 0x0E, 0x00], [0x02, 0x0F, 0x00], [0x02, 0x10, 0x00],
    [0x02, 0x2B, 0x20], [0x02, 0x2C, 0x00], [0x04, 0x27, 0x20], [0x04, 0x28, 0x00],
    [0x04, 0x29, 0x00], [0x04, 0x2A, 0x00], [0x04, 0x2B, 0x00], [0x24, 0x20, 0x20],
    [0x24, 0x21, 0x00], [0x44, 0x20, 0x20], [0x44, 0x21, 0x00], [0x44, 0x22, 0x00],
    [0x44, 0x23, 0x00], [0x44, 0x24, 0x00], [0x44, 0x25, 0x00], [0x44, 0x26, 0x00],
    [0x44, 0x27, 0x00], [0x44, 0x28, 0x00], [0x44, 0x29, 0x00], [0x44, 0x2A, 0x00],
    [0x44, 0x2B, 0x00], [0x44, 0x2C, 0x00], [0x44, 0x2D, 0x00], [0x44, 0x2E, 0x00],
    [0x44, 0x2F, 0x00], [0x44, 0x30, 0x00], [0x44, 0x31, 0x00], [0x44, 0x32, 0x00],
    [0x44, 0x33, 0x00], [0x64, 0x2E, 0x20], [0x64, 0x2F, 0x00], [0x64, 0x30, 0x00],
    [0x64, 0x31, 0x00], [0x64, 0x32, 0x00], [0x64, 0x33, 0x00], [0x64, 0x34, 0x00],
    [0x64, 0x35, 0x00], [0x64, 0x36, 0x00], [0x64, 0x37, 0x00], [0x64, 0x38, 0x00],
    [0x65, 0x38, 0x20], [0x66, 0x38, 0x20], [0x67, 0x38, 0x20], [0x68, 0x38, 0x20],
    [0x69, 0x38, 0x20], [0x6A, 0x38, 0x20], [0x6B, 0x38, 0x20], [0x6C, 0x38, 0x20],
    [0x6D, 0x38, 0x20],
];

/// Carriers up to 6 GHz
const GAIN_TABLE_HIGH: [[u8; 3]; GAIN_TABLE_ROWS] = [
    [0x00, 0x00, 0x20], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x01, 0x00],
    [0x00, 0x02, 0x00], [0x00, 0x03, 0x00], [0x00, 0x04, 0x00], [0x00, 0x05, 0x00],
    [0x01, 0x03, 0x20], [0x01, 0x04, 0x00], [0x01, 0x05, 0x00], [0x01, 0x06, 0x00],
    [0x01, 0x07, 0x00], [0x01, 0x08, 0x00], [0x01, 0x09, 0x00], [0x01, 0x0A, 0x00],
    [0x01, 0x0B, 0x00], [0x01, 0x0C, 0x00], [0x01, 0x0D, 0x00], [0x01, 0x0E, 0x00],
    [0x02, 0x09, 0x20], [0x02, 0x0A, 0x00], [0x02, 0x0B, 0x00], [0x02, 0x0C, 0x00],
    [0x02, 0x0D, 0x00], [0x02, 0x0E, 0x00], [0x02, 0x0F, 0x00], [0x02, 0x10, 0x00],
    [0x02, 0x2B, 0x20], [0x02, 0x2C, 0x00], [0x04, 0x26, 0x20], [0x04, 0x27, 0x00],
    [0x04, 0x28, 0x00], [0x04, 0x29, 0x00], [0x04, 0x2A, 0x00], [0x04, 0x2B, 0x00],
    [0x24, 0x20, 0x20], [0x24, 0x21, 0x00], [0x44, 0x20, 0x20], [0x44, 0x21, 0x00],
    [0x44, 0x22, 0x00], [0x44, 0x23, 0x00], [0x44, 0x24, 0x00], [0x44, 0x25, 0x00],
    [0x44, 0x26, 0x00], [0x44, 0x27, 0x00], [0x44, 0x28, 0x00], [0x44, 0x29, 0x00],
    [0x44, 0x2A, 0x00], [0x44, 0x2B, 0x00], [0x44, 0x2C, 0x00], [0x44, 0x2D, 0x00],
    [0x44, 0x2E, 0x00], [0x44, 0x2F, 0x00], [0x44, 0x30, 0x00], [0x44, 0x31, 0x00],
    [0x64, 0x2E, 0x20], [0x64, 0x2F, 0x00], [0x64, 0x30, 0x00], [0x64, 0x31, 0x00],
    [0x64, 0x32, 0x00], [0x64, 0x33, 0x00], [0x64, 0x34, 0x00], [0x64, 0x35, 0x00],
    [0x64, 0x36, 0x00], [0x64, 0x37, 0x00], [0x65, 0x37, 0x20], [0x66, 0x37, 0x20],
    [0x67, 0x37, 0x20], [0x68, 0x37, 0x20], [0x69, 0x37, 0x20], [0x6A, 0x37, 0x20],
    [0x6B, 0x37, 0x20], [0x6C, 0x37, 0x20], [0x6D, 0x37, 0x20], [0x6E, 0x37, 0x20],
    [0x6F, 0x37, 0x20],
];

const GM_SUB_TABLE_GAIN: [u8; 16] = [
    0x78, 0x74, 0x70, 0x6C, 0x68, 0x64, 0x60, 0x5C, 0x58, 0x54, 0x50, 0x4C, 0x48, 0x30, 0x18, 0x00,
];
const GM_SUB_TABLE_CTRL: [u8; 16] = [
    0x00, 0x0D, 0x15, 0x1B, 0x21, 0x25, 0x29, 0x2C, 0x2F, 0x31, 0x33, 0x34, 0x35, 0x3A, 0x3D, 0x3E,
];
const GM_SUB_TABLE_BIAS: u8 = 0x79;

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Load the gain table for an RX carrier of `freq` Hz.
    ///
    /// Writes nothing when the band is already loaded.
    pub fn load_gain_table(&mut self, freq: u64) -> Result<(), T::Error> {
        let band = GainBand::from_frequency(freq);
        if self.gain_band == Some(band) {
            return Ok(());
        }

        let select = field_prep(TABLE_SELECT_BOTH, regs::RX_GAIN_TABLE_SELECT);
        self.bus.write(regs::GAIN_TABLE_CONFIG, regs::START_GAIN_TABLE_CLOCK | select)?;

        let table = rows(band);
        for index in 0..GAIN_TABLE_SIZE {
            let row = table.get(usize::from(index)).copied().unwrap_or([0; 3]);
            self.bus.write(regs::GAIN_TABLE_ADDRESS, index)?;
            self.bus.write(regs::GAIN_TABLE_WRITE_DATA1, row[0])?;
            self.bus.write(regs::GAIN_TABLE_WRITE_DATA2, row[1])?;
            self.bus.write(regs::GAIN_TABLE_WRITE_DATA3, row[2])?;
            self.bus.write(
                regs::GAIN_TABLE_CONFIG,
                regs::START_GAIN_TABLE_CLOCK | regs::WRITE_GAIN_TABLE | select,
            )?;
            // two dummy writes give the table clock time to latch
            self.bus.write(regs::GAIN_TABLE_READ_DATA1, 0)?;
            self.bus.write(regs::GAIN_TABLE_READ_DATA1, 0)?;
        }

        self.bus.write(regs::GAIN_TABLE_CONFIG, 0)?;
        self.bus.write_flag(regs::AGC_CONFIG_2, regs::AGC_USE_FULL_GAIN_TABLE, true)?;
        self.bus.write(regs::MAX_LMT_FULL_GAIN, (GAIN_TABLE_ROWS - 1) as u8)?;

        self.gain_band = Some(band);
        debug!("gain table loaded for {:?}", band);
        Ok(())
    }

    /// Load the mixer GM sub-table.
    pub fn load_mixer_gm_subtable(&mut self) -> Result<(), T::Error> {
        self.bus.write(regs::GM_SUB_TABLE_CONFIG, regs::START_GM_SUB_TABLE_CLOCK)?;

        // entries are written from the top index down
        for (addr, (&gain, &ctrl)) in (0..16u8).rev().zip(GM_SUB_TABLE_GAIN.iter().zip(&GM_SUB_TABLE_CTRL)) {
            self.bus.write(regs::GM_SUB_TABLE_ADDRESS, addr)?;
            self.bus.write(regs::GM_SUB_TABLE_BIAS_WRITE, GM_SUB_TABLE_BIAS)?;
            self.bus.write(regs::GM_SUB_TABLE_GAIN_WRITE, gain)?;
            self.bus.write(regs::GM_SUB_TABLE_CTRL_WRITE, ctrl)?;
            self.bus.write(
                regs::GM_SUB_TABLE_CONFIG,
                regs::WRITE_GM_SUB_TABLE | regs::START_GM_SUB_TABLE_CLOCK,
            )?;
            self.bus.write(regs::GM_SUB_TABLE_GAIN_READ, 0)?;
            self.bus.write(regs::GM_SUB_TABLE_GAIN_READ, 0)?;
        }

        self.bus.write(regs::GM_SUB_TABLE_CONFIG, 0)
    }
}
