//! Synthesizer fast-lock profiles
//!
//! Each synthesizer has eight profiles of sixteen words in a small RAM.
//! A profile holds everything the synthesizer needs to jump to a stored
//! frequency without a VCO calibration. While a direction is prepared its
//! VCO calibration is off and the selected profile drives the synthesizer.

use embedded_hal::delay::DelayNs;

use crate::config::{FASTLOCK_PROFILES, FASTLOCK_PROFILE_WORDS};
use crate::device::Ad9361;
use crate::error::{Error, Result};
use crate::regs;
use crate::transport::{field_prep, RegisterTransport};
use crate::types::Direction;

/// One stored synthesizer snapshot
pub type FastlockProfile = [u8; FASTLOCK_PROFILE_WORDS];

/// Synthesizer registers captured into a profile, with the bits kept
const PROFILE_SOURCES: [(u16, u8); FASTLOCK_PROFILE_WORDS] = [
    (regs::RX_INTEGER_BYTE_0, 0xFF),
    (regs::RX_INTEGER_BYTE_1, 0x07),
    (regs::RX_FRACT_BYTE_0, 0xFF),
    (regs::RX_FRACT_BYTE_1, 0xFF),
    (regs::RX_FRACT_BYTE_2, 0x7F),
    (regs::RX_VCO_BIAS_1, 0x0F),
    (regs::RX_ALC_VARACTOR, 0xFF),
    (regs::RX_VCO_OUTPUT, 0xFF),
    (regs::RX_CP_CURRENT, 0x3F),
    (regs::RX_LOOP_FILTER_1, 0xFF),
    (regs::RX_LOOP_FILTER_2, 0xFF),
    (regs::RX_LOOP_FILTER_3, 0x0F),
    (regs::RX_VCO_VARACTOR_CTRL_1, 0x0F),
    (regs::RX_VCO_CAL_REF, 0x07),
    (regs::RX_CP_OFFSET, 0xFF),
    (regs::RX_FORCE_VCO_TUNE_0, 0xFF),
];

const fn ready_mask(dir: Direction) -> u8 {
    match dir {
        Direction::Rx => regs::RX_SYNTH_READY_MASK,
        Direction::Tx => regs::TX_SYNTH_READY_MASK,
    }
}

/// Profile RAM address of one word
const fn profile_addr(profile: u8, word: usize) -> u8 {
    field_prep(profile, regs::FAST_LOCK_PROFILE_ADDR) | field_prep(word as u8, regs::FAST_LOCK_PROFILE_WORD)
}

fn check_profile<E>(profile: u8) -> Result<(), E> {
    if profile < FASTLOCK_PROFILES {
        Ok(())
    } else {
        Err(Error::invalid("fast-lock profile", profile))
    }
}

impl<T, D> Ad9361<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Profile driving the synthesizer of `dir`, if prepared
    #[must_use]
    pub const fn fastlock_active(&self, dir: Direction) -> Option<u8> {
        self.fastlock[dir.index()]
    }

    fn fastlock_setup_bits(&self, dir: Direction, profile: u8) -> u8 {
        let pin = match dir {
            Direction::Rx => self.params.rx_fastlock_pincontrol_enable,
            Direction::Tx => self.params.tx_fastlock_pincontrol_enable,
        };
        let mut bits = field_prep(profile, regs::FAST_LOCK_PROFILE) | regs::FAST_LOCK_MODE_ENABLE;
        if pin {
            bits |= regs::FAST_LOCK_PROFILE_PIN_SELECT;
        }
        bits
    }

    /// Put one synthesizer into fast-lock mode on `profile`.
    ///
    /// Does nothing when the direction is already prepared.
    pub fn fastlock_prepare(&mut self, dir: Direction, profile: u8) -> Result<(), T::Error> {
        check_profile(profile)?;
        if self.fastlock[dir.index()].is_some() {
            return Ok(());
        }

        let offs = dir.synth_offset();
        let delay_ns = match dir {
            Direction::Rx => self.params.rx_fastlock_delay_ns,
            Direction::Tx => self.params.tx_fastlock_delay_ns,
        };
        let delay = u8::try_from(delay_ns / 250).unwrap_or(u8::MAX);

        self.bus.write(regs::RX_FAST_LOCK_SETUP_INIT_DELAY + offs, delay)?;
        let setup = self.fastlock_setup_bits(dir, profile);
        self.bus.write(regs::RX_FAST_LOCK_SETUP + offs, setup)?;
        self.bus.write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, 0)?;
        self.bus.write_flag(regs::ENSM_CONFIG_2, ready_mask(dir), true)?;
        self.vco_cal_control(dir, false)?;

        self.fastlock[dir.index()] = Some(profile);
        debug!("{:?} fast-lock prepared on profile {}", dir, profile);
        Ok(())
    }

    /// Leave fast-lock mode.
    ///
    /// Pulses the forced ALC and VCO tune so the synthesizer keeps its
    /// current settings, then re-enables VCO calibration. Does nothing
    /// when the direction is not prepared.
    pub fn fastlock_unprepare(&mut self, dir: Direction) -> Result<(), T::Error> {
        if self.fastlock[dir.index()].is_none() {
            return Ok(());
        }

        let offs = dir.synth_offset();
        self.bus.write(regs::RX_FAST_LOCK_SETUP + offs, 0)?;
        self.bus.write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, 0)?;
        self.bus.write(regs::RX_FAST_LOCK_SETUP_INIT_DELAY + offs, 0)?;

        self.bus.write_flag(regs::RX_FORCE_ALC + offs, regs::FORCE_ALC_ENABLE, true)?;
        self.bus.write_flag(regs::RX_FORCE_VCO_TUNE_1 + offs, regs::FORCE_VCO_TUNE, true)?;
        self.bus.write_flag(regs::RX_FORCE_ALC + offs, regs::FORCE_ALC_ENABLE, false)?;
        self.bus.write_flag(regs::RX_FORCE_VCO_TUNE_1 + offs, regs::FORCE_VCO_TUNE, false)?;

        self.vco_cal_control(dir, true)?;
        self.bus.write_flag(regs::ENSM_CONFIG_2, ready_mask(dir), false)?;

        self.fastlock[dir.index()] = None;
        debug!("{:?} fast-lock released", dir);
        Ok(())
    }

    /// Capture the synthesizer's current settings into `profile`.
    pub fn fastlock_store(&mut self, dir: Direction, profile: u8) -> Result<(), T::Error> {
        check_profile(profile)?;
        let offs = dir.synth_offset();
        let mut words = [0u8; FASTLOCK_PROFILE_WORDS];
        for (word, &(addr, mask)) in words.iter_mut().zip(&PROFILE_SOURCES) {
            *word = self.bus.read(addr + offs)? & mask;
        }
        self.fastlock_load(dir, profile, &words)?;
        info!("{:?} fast-lock profile {} stored", dir, profile);
        Ok(())
    }

    /// Switch the synthesizer to a stored profile, preparing the
    /// direction first if needed.
    pub fn fastlock_recall(&mut self, dir: Direction, profile: u8) -> Result<(), T::Error> {
        check_profile(profile)?;
        match self.fastlock[dir.index()] {
            None => self.fastlock_prepare(dir, profile),
            Some(current) if current == profile => Ok(()),
            Some(_) => {
                let offs = dir.synth_offset();
                self.bus.write_field(regs::RX_FAST_LOCK_SETUP + offs, regs::FAST_LOCK_PROFILE, profile)?;
                self.fastlock[dir.index()] = Some(profile);
                debug!("{:?} fast-lock recalled profile {}", dir, profile);
                Ok(())
            }
        }
    }

    /// Write a saved profile into the profile RAM.
    pub fn fastlock_load(&mut self, dir: Direction, profile: u8, words: &FastlockProfile) -> Result<(), T::Error> {
        check_profile(profile)?;
        let offs = dir.synth_offset();
        self.bus
            .write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, regs::FAST_LOCK_PROGRAM_CLOCK_ENABLE)?;
        for (i, &word) in words.iter().enumerate() {
            self.bus.write(regs::RX_FAST_LOCK_PROGRAM_ADDR + offs, profile_addr(profile, i))?;
            self.bus.write(regs::RX_FAST_LOCK_PROGRAM_DATA + offs, word)?;
            self.bus.write(
                regs::RX_FAST_LOCK_PROGRAM_CTRL + offs,
                regs::FAST_LOCK_PROGRAM_WRITE | regs::FAST_LOCK_PROGRAM_CLOCK_ENABLE,
            )?;
        }
        self.bus.write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, 0)
    }

    /// Read a profile back from the profile RAM.
    pub fn fastlock_save(&mut self, dir: Direction, profile: u8) -> Result<FastlockProfile, T::Error> {
        check_profile(profile)?;
        let offs = dir.synth_offset();
        let mut words = [0u8; FASTLOCK_PROFILE_WORDS];
        self.bus
            .write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, regs::FAST_LOCK_PROGRAM_CLOCK_ENABLE)?;
        for (i, word) in words.iter_mut().enumerate() {
            self.bus.write(regs::RX_FAST_LOCK_PROGRAM_ADDR + offs, profile_addr(profile, i))?;
            *word = self.bus.read(regs::RX_FAST_LOCK_PROGRAM_READ + offs)?;
        }
        self.bus.write(regs::RX_FAST_LOCK_PROGRAM_CTRL + offs, 0)?;
        Ok(words)
    }
}
