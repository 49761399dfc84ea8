//! Register-level AD9361 emulator shared by the integration tests
//!
//! One [`Chip`] handle is the register transport, a clone of it is the
//! delay provider, and the test keeps a third to inspect what happened.
//! The emulator models just enough of the silicon for the driver to run:
//! self-clearing calibrations, lock and status bits, the ENSM state that
//! follows forced transitions and the fast-lock profile RAM.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use ad9361_driver::regs;
use ad9361_driver::{Ad9361, InitParams};
use embedded_hal::delay::DelayNs;

/// Register space covered by the emulator
const REGISTERS: usize = 0x400;

/// Predicate deciding whether a TX quadrature run at an RX NCO phase
/// converges
pub type QuadPredicate = fn(u8) -> bool;

struct State {
    regs: [u8; REGISTERS],
    writes: Vec<(u16, u8)>,
    reads: HashMap<u16, usize>,
    sleeps_ns: Vec<u32>,
    /// Calibration bits that never clear
    stuck_cal: u8,
    /// Clear VCO lock on both synthesizers
    vco_unlocked: bool,
    quad: Option<QuadPredicate>,
    quad_phases: Vec<u8>,
    fastlock_ram: [[u8; 128]; 2],
}

impl State {
    fn new() -> Self {
        let mut regs = [0u8; REGISTERS];
        regs[usize::from(regs::PRODUCT_ID)] = 0x0A;
        let converged = regs::TX1_LO_CONV | regs::TX1_SSB_CONV;
        regs[usize::from(regs::QUAD_CAL_STATUS_TX1)] = converged;
        regs[usize::from(regs::QUAD_CAL_STATUS_TX2)] = converged;
        Self {
            regs,
            writes: Vec::new(),
            reads: HashMap::new(),
            sleeps_ns: Vec::new(),
            stuck_cal: 0,
            vco_unlocked: false,
            quad: None,
            quad_phases: Vec::new(),
            fastlock_ram: [[0; 128]; 2],
        }
    }

    fn reg(&self, addr: u16) -> u8 {
        self.regs[usize::from(addr)]
    }

    fn read(&mut self, addr: u16) -> u8 {
        *self.reads.entry(addr).or_default() += 1;
        let raw = self.reg(addr);
        let tx = regs::TX_SYNTH_OFFSET;
        match addr {
            regs::CH_1_OVERFLOW => raw | regs::BBPLL_LOCK,
            a if a == regs::RX_CP_OVERRANGE_VCO_LOCK || a == regs::RX_CP_OVERRANGE_VCO_LOCK + tx => {
                if self.vco_unlocked {
                    raw & !regs::VCO_LOCK
                } else {
                    raw | regs::VCO_LOCK
                }
            }
            a if a == regs::RX_CAL_STATUS || a == regs::RX_CAL_STATUS + tx => raw | regs::CP_CAL_VALID,
            a if a == regs::RX_FAST_LOCK_PROGRAM_READ => self.profile_word(0),
            a if a == regs::RX_FAST_LOCK_PROGRAM_READ + tx => self.profile_word(1),
            _ => raw,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.writes.push((addr, value));
        let tx = regs::TX_SYNTH_OFFSET;
        match addr {
            regs::CALIBRATION_CTRL => {
                if value & regs::TX_QUAD_CAL != 0 {
                    self.finish_quad_cal();
                }
                self.regs[usize::from(addr)] = value & self.stuck_cal;
                return;
            }
            regs::ENSM_CONFIG_1 => {
                self.regs[usize::from(regs::STATE)] = self.next_state(value);
            }
            a if a == regs::RX_FAST_LOCK_PROGRAM_CTRL && value & regs::FAST_LOCK_PROGRAM_WRITE != 0 => {
                self.store_profile_word(0);
            }
            a if a == regs::RX_FAST_LOCK_PROGRAM_CTRL + tx && value & regs::FAST_LOCK_PROGRAM_WRITE != 0 => {
                self.store_profile_word(1);
            }
            _ => {}
        }
        self.regs[usize::from(addr)] = value;
    }

    /// ENSM state reached after a write of `config_1`
    fn next_state(&self, config_1: u8) -> u8 {
        let fdd = self.reg(regs::ENSM_MODE) & regs::FDD_MODE != 0;
        let tx_on = config_1 & regs::FORCE_TX_ON != 0;
        let rx_on = config_1 & regs::FORCE_RX_ON != 0;
        if config_1 & regs::FORCE_ALERT_STATE != 0 {
            0x05
        } else if (tx_on && rx_on) || (tx_on && fdd) {
            0x0A
        } else if tx_on {
            0x06
        } else if rx_on {
            0x08
        } else if config_1 & regs::TO_ALERT != 0 {
            0x05
        } else {
            0x00
        }
    }

    fn finish_quad_cal(&mut self) {
        let phase = self.reg(regs::QUAD_CAL_NCO_FREQ_PHASE_OFFSET) & regs::RX_NCO_PHASE_OFFSET;
        self.quad_phases.push(phase);
        if let Some(converges) = self.quad {
            let status = if converges(phase) {
                regs::TX1_LO_CONV | regs::TX1_SSB_CONV
            } else {
                0
            };
            self.regs[usize::from(regs::QUAD_CAL_STATUS_TX1)] = status;
            self.regs[usize::from(regs::QUAD_CAL_STATUS_TX2)] = status;
        }
    }

    fn bank_offset(bank: usize) -> u16 {
        if bank == 0 {
            0
        } else {
            regs::TX_SYNTH_OFFSET
        }
    }

    fn store_profile_word(&mut self, bank: usize) {
        let offs = Self::bank_offset(bank);
        let addr = usize::from(self.reg(regs::RX_FAST_LOCK_PROGRAM_ADDR + offs) & 0x7F);
        self.fastlock_ram[bank][addr] = self.reg(regs::RX_FAST_LOCK_PROGRAM_DATA + offs);
    }

    fn profile_word(&self, bank: usize) -> u8 {
        let offs = Self::bank_offset(bank);
        let addr = usize::from(self.reg(regs::RX_FAST_LOCK_PROGRAM_ADDR + offs) & 0x7F);
        self.fastlock_ram[bank][addr]
    }
}

/// Shared handle to one emulated chip
#[derive(Clone)]
pub struct Chip(Rc<RefCell<State>>);

impl Chip {
    /// Fresh chip reporting an AD9361 product id
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(State::new())))
    }

    /// Register value as stored, without the emulated status bits
    pub fn reg(&self, addr: u16) -> u8 {
        self.0.borrow().reg(addr)
    }

    /// Preset a register without logging a write
    pub fn set_reg(&self, addr: u16, value: u8) {
        self.0.borrow_mut().regs[usize::from(addr)] = value;
    }

    /// Every write since the last [`Self::clear_log`]
    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.0.borrow().writes.clone()
    }

    /// Values written to `addr`, oldest first
    pub fn writes_to(&self, addr: u16) -> Vec<u8> {
        self.0
            .borrow()
            .writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Number of writes since the last [`Self::clear_log`]
    pub fn write_count(&self) -> usize {
        self.0.borrow().writes.len()
    }

    /// Reads of `addr` since the last [`Self::clear_log`]
    pub fn read_count(&self, addr: u16) -> usize {
        self.0.borrow().reads.get(&addr).copied().unwrap_or(0)
    }

    /// Sleeps requested, in nanoseconds
    pub fn sleeps_ns(&self) -> Vec<u32> {
        self.0.borrow().sleeps_ns.clone()
    }

    /// Forget logged writes, reads and sleeps.
    pub fn clear_log(&self) {
        let mut s = self.0.borrow_mut();
        s.writes.clear();
        s.reads.clear();
        s.sleeps_ns.clear();
        s.quad_phases.clear();
    }

    /// Keep the calibration bits in `mask` set forever.
    pub fn stick_calibration(&self, mask: u8) {
        self.0.borrow_mut().stuck_cal = mask;
    }

    /// Report both RF synthesizers unlocked.
    pub fn unlock_vco(&self, unlocked: bool) {
        self.0.borrow_mut().vco_unlocked = unlocked;
    }

    /// Decide TX quadrature convergence per RX NCO phase.
    pub fn quad_converges(&self, predicate: QuadPredicate) {
        self.0.borrow_mut().quad = Some(predicate);
    }

    /// RX NCO phases of every TX quadrature run, oldest first
    pub fn quad_phases(&self) -> Vec<u8> {
        self.0.borrow().quad_phases.clone()
    }

    /// Raw fast-lock RAM of one synthesizer (0 = RX, 1 = TX)
    pub fn fastlock_ram(&self, bank: usize) -> [u8; 128] {
        self.0.borrow().fastlock_ram[bank]
    }
}

impl ad9361_driver::RegisterTransport for Chip {
    type Error = Infallible;

    fn read_register(&mut self, _chip: u8, addr: u16) -> Result<u8, Self::Error> {
        Ok(self.0.borrow_mut().read(addr))
    }

    fn write_register(&mut self, _chip: u8, addr: u16, value: u8) -> Result<(), Self::Error> {
        self.0.borrow_mut().write(addr, value);
        Ok(())
    }
}

impl DelayNs for Chip {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().sleeps_ns.push(ns);
    }
}

/// Driver bound to an emulated chip
pub type Device = Ad9361<Chip, Chip>;

/// Driver over a fresh chip, not yet initialized
pub fn device(params: InitParams) -> (Device, Chip) {
    let chip = Chip::new();
    let dev = Ad9361::new(chip.clone(), chip.clone(), 0, params);
    (dev, chip)
}

/// Driver that completed `init` with `params`, logs cleared
pub fn ready_device(params: InitParams) -> (Device, Chip) {
    let (mut dev, chip) = device(params);
    dev.init().expect("init on emulated chip");
    chip.clear_log();
    (dev, chip)
}
