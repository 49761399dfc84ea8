//! Register transport and timing
//!
//! Every driver algorithm is expressed through the four primitives of
//! [`RegisterTransport`]. [`RegisterBus`] binds a transport, a chip id and
//! a delay provider together and adds field access plus the bounded
//! done-bit poll used by all calibrations.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::config::{CAL_CTRL_POLL_DELAY_US, CAL_POLL_RETRIES, STATUS_POLL_DELAY_US};
use crate::error::{Error, Result};
use crate::regs;

/// Shift a field value down to the mask's lowest set bit.
#[must_use]
pub const fn field_get(value: u8, mask: u8) -> u8 {
    if mask == 0 {
        0
    } else {
        (value & mask) >> mask.trailing_zeros()
    }
}

/// Place a field value at the mask's lowest set bit.
#[must_use]
pub const fn field_prep(value: u8, mask: u8) -> u8 {
    if mask == 0 {
        0
    } else {
        (value << mask.trailing_zeros()) & mask
    }
}

/// Byte-wide register access to one or more chips.
///
/// Block transfers walk the address downward, matching the chip's
/// multi-byte auto-decrement: `buf[i]` belongs to `addr - i`.
pub trait RegisterTransport {
    /// Transport error
    type Error;

    /// Read one register.
    fn read_register(&mut self, chip: u8, addr: u16) -> core::result::Result<u8, Self::Error>;

    /// Write one register.
    fn write_register(
        &mut self,
        chip: u8,
        addr: u16,
        value: u8,
    ) -> core::result::Result<(), Self::Error>;

    /// Read `buf.len()` registers starting at `addr`, descending.
    fn read_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &mut [u8],
    ) -> core::result::Result<(), Self::Error> {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read_register(chip, addr.wrapping_sub(i as u16))?;
        }
        Ok(())
    }

    /// Write `buf.len()` registers starting at `addr`, descending.
    fn write_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &[u8],
    ) -> core::result::Result<(), Self::Error> {
        for (i, &byte) in buf.iter().enumerate() {
            self.write_register(chip, addr.wrapping_sub(i as u16), byte)?;
        }
        Ok(())
    }

    /// Read a field, shifted down to the mask's lowest set bit.
    fn read_field(&mut self, chip: u8, addr: u16, mask: u8) -> core::result::Result<u8, Self::Error> {
        Ok(field_get(self.read_register(chip, addr)?, mask))
    }

    /// Read-modify-write a field.
    fn write_field(
        &mut self,
        chip: u8,
        addr: u16,
        mask: u8,
        value: u8,
    ) -> core::result::Result<(), Self::Error> {
        let old = self.read_register(chip, addr)?;
        self.write_register(chip, addr, (old & !mask) | field_prep(value, mask))
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    type Error = T::Error;

    fn read_register(&mut self, chip: u8, addr: u16) -> core::result::Result<u8, Self::Error> {
        (**self).read_register(chip, addr)
    }

    fn write_register(
        &mut self,
        chip: u8,
        addr: u16,
        value: u8,
    ) -> core::result::Result<(), Self::Error> {
        (**self).write_register(chip, addr, value)
    }

    fn read_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &mut [u8],
    ) -> core::result::Result<(), Self::Error> {
        (**self).read_block(chip, addr, buf)
    }

    fn write_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &[u8],
    ) -> core::result::Result<(), Self::Error> {
        (**self).write_block(chip, addr, buf)
    }
}

/// Errors of the SPI transport
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiError<S, P> {
    /// SPI bus error
    Spi(S),
    /// Chip-select pin error
    Pin(P),
    /// No chip-select registered for this chip id
    NoSuchChip(u8),
}

/// Chip-select lines a single [`SpiTransport`] can drive
pub const MAX_CHIPS: usize = 4;

/// Largest payload of a single SPI instruction
const MAX_TRANSFER: usize = 8;

/// AD9361 SPI protocol over an `embedded-hal` bus.
///
/// Each chip id indexes one chip-select line. The 16-bit instruction word
/// carries the direction in bit 15, byte count minus one in bits 14:12 and
/// the register address in bits 9:0.
pub struct SpiTransport<SPI, CS> {
    spi: SPI,
    cs: heapless::Vec<CS, MAX_CHIPS>,
}

impl<SPI, CS> SpiTransport<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Create a transport for a single chip (chip id 0).
    pub fn new(spi: SPI, cs: CS) -> Self {
        let mut lines = heapless::Vec::new();
        // capacity is at least one
        let _ = lines.push(cs);
        Self { spi, cs: lines }
    }

    /// Register another chip-select; returns its chip id, or the pin if all
    /// lines are taken.
    pub fn add_chip(&mut self, cs: CS) -> core::result::Result<u8, CS> {
        self.cs.push(cs)?;
        Ok((self.cs.len() - 1) as u8)
    }

    /// Release the bus and chip-select lines.
    pub fn free(self) -> (SPI, heapless::Vec<CS, MAX_CHIPS>) {
        (self.spi, self.cs)
    }

    const fn instruction(write: bool, len: usize, addr: u16) -> [u8; 2] {
        let mut cmd = ((len as u16 - 1) & 0x7) << 12 | (addr & 0x3FF);
        if write {
            cmd |= 1 << 15;
        }
        cmd.to_be_bytes()
    }

    fn transfer(
        &mut self,
        chip: u8,
        write: bool,
        addr: u16,
        data: &mut [u8],
    ) -> core::result::Result<(), SpiError<SPI::Error, CS::Error>> {
        let cs = self
            .cs
            .get_mut(usize::from(chip))
            .ok_or(SpiError::NoSuchChip(chip))?;
        let cmd = Self::instruction(write, data.len(), addr);

        cs.set_low().map_err(SpiError::Pin)?;
        let result = self.spi.write(&cmd).and_then(|()| {
            if write {
                self.spi.write(data)
            } else {
                self.spi.read(data)
            }
        });
        let flushed = self.spi.flush();
        cs.set_high().map_err(SpiError::Pin)?;
        result.and(flushed).map_err(SpiError::Spi)
    }
}

impl<SPI, CS> RegisterTransport for SpiTransport<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = SpiError<SPI::Error, CS::Error>;

    fn read_register(&mut self, chip: u8, addr: u16) -> core::result::Result<u8, Self::Error> {
        let mut buf = [0u8];
        self.transfer(chip, false, addr, &mut buf)?;
        Ok(buf[0])
    }

    fn write_register(
        &mut self,
        chip: u8,
        addr: u16,
        value: u8,
    ) -> core::result::Result<(), Self::Error> {
        let mut buf = [value];
        self.transfer(chip, true, addr, &mut buf)
    }

    fn read_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &mut [u8],
    ) -> core::result::Result<(), Self::Error> {
        let mut offset = 0u16;
        for chunk in buf.chunks_mut(MAX_TRANSFER) {
            self.transfer(chip, false, addr.wrapping_sub(offset), chunk)?;
            offset += chunk.len() as u16;
        }
        Ok(())
    }

    fn write_block(
        &mut self,
        chip: u8,
        addr: u16,
        buf: &[u8],
    ) -> core::result::Result<(), Self::Error> {
        let mut offset = 0u16;
        for chunk in buf.chunks(MAX_TRANSFER) {
            let mut tmp = [0u8; MAX_TRANSFER];
            tmp[..chunk.len()].copy_from_slice(chunk);
            self.transfer(chip, true, addr.wrapping_sub(offset), &mut tmp[..chunk.len()])?;
            offset += chunk.len() as u16;
        }
        Ok(())
    }
}

/// One chip's view of a transport plus the time service.
pub struct RegisterBus<T, D> {
    transport: T,
    delay: D,
    chip: u8,
}

impl<T, D> RegisterBus<T, D>
where
    T: RegisterTransport,
    D: DelayNs,
{
    /// Bind a transport and delay provider to a chip id.
    pub const fn new(transport: T, delay: D, chip: u8) -> Self {
        Self {
            transport,
            delay,
            chip,
        }
    }

    /// Chip id used for every access
    #[must_use]
    pub const fn chip(&self) -> u8 {
        self.chip
    }

    /// Release transport and delay.
    pub fn free(self) -> (T, D) {
        (self.transport, self.delay)
    }

    /// Read one register.
    pub fn read(&mut self, addr: u16) -> Result<u8, T::Error> {
        self.transport
            .read_register(self.chip, addr)
            .map_err(Error::Transport)
    }

    /// Write one register.
    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), T::Error> {
        trace!("spi write {:#x} <= {:#x}", addr, value);
        self.transport
            .write_register(self.chip, addr, value)
            .map_err(Error::Transport)
    }

    /// Read a field shifted to bit 0.
    pub fn read_field(&mut self, addr: u16, mask: u8) -> Result<u8, T::Error> {
        self.transport
            .read_field(self.chip, addr, mask)
            .map_err(Error::Transport)
    }

    /// Read-modify-write a field.
    pub fn write_field(&mut self, addr: u16, mask: u8, value: u8) -> Result<(), T::Error> {
        self.transport
            .write_field(self.chip, addr, mask, value)
            .map_err(Error::Transport)
    }

    /// Set or clear all bits of `mask`.
    pub fn write_flag(&mut self, addr: u16, mask: u8, set: bool) -> Result<(), T::Error> {
        self.write_field(addr, mask, if set { 0xFF } else { 0 })
    }

    /// Descending block read.
    pub fn read_block(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), T::Error> {
        self.transport
            .read_block(self.chip, addr, buf)
            .map_err(Error::Transport)
    }

    /// Descending block write.
    pub fn write_block(&mut self, addr: u16, buf: &[u8]) -> Result<(), T::Error> {
        self.transport
            .write_block(self.chip, addr, buf)
            .map_err(Error::Transport)
    }

    /// Blocking sleep in microseconds.
    pub fn sleep_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Blocking sleep in milliseconds.
    pub fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Poll `addr` until the field under `mask` equals `done`.
    ///
    /// Makes at most [`CAL_POLL_RETRIES`] reads and sleeps after every
    /// miss: 1.2 ms on the calibration control register, 120 µs elsewhere.
    /// Writes issued before the poll are left in place on timeout.
    pub fn poll_field(&mut self, addr: u16, mask: u8, done: u8) -> Result<(), T::Error> {
        let wait_us = if addr == regs::CALIBRATION_CTRL {
            CAL_CTRL_POLL_DELAY_US
        } else {
            STATUS_POLL_DELAY_US
        };

        for _ in 0..CAL_POLL_RETRIES {
            if self.read_field(addr, mask)? == done {
                return Ok(());
            }
            self.sleep_us(wait_us);
        }

        error!("calibration timeout (reg {:#x}, mask {:#x})", addr, mask);
        Err(Error::CalibrationTimeout { reg: addr, mask })
    }
}
