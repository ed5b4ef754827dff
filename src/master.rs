// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bus-master side of the register protocol.
//!
//! [`RomiMaster`] talks to the robot from a host controller (e.g. a Raspberry Pi) over any
//! `embedded-hal` 1.0 I2C bus. Reads move the register pointer with a one-byte write, give the
//! slave's interrupt [`POINTER_SETTLE_US`] to run, then read. Writes send the pointer and the data
//! in one transaction and settle afterwards.
//!
//! Example:
//! ```no_run
//! # use embedded_hal::{delay::DelayNs, i2c::I2c};
//! # use romi_slave::master::{MasterError, RomiMaster};
//! # fn drive<I: I2c, D: DelayNs>(bus: I, delay: D) -> Result<(), MasterError<I::Error>> {
//! let mut romi = RomiMaster::new(bus, delay);
//! romi.set_motors(150, -150)?;
//! let (left, right) = romi.encoders()?;
//! # let _ = (left, right);
//! # Ok(())
//! # }
//! ```

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::{ANALOG_CHANNELS, DEVICE_ADDRESS, NOTE_CAPACITY, POINTER_SETTLE_US};
use crate::protocol::{reg, NoteScript, NoteScriptError, SharedRecord, RECORD_LEN};

/// Error type for `RomiMaster` operations.
#[derive(Debug, PartialEq)]
pub enum MasterError<E> {
    /// Underlying I2C bus error.
    Bus(E),
    /// Note script does not fit the record.
    Notes(NoteScriptError),
    /// Write longer than the record; nothing was sent.
    FrameTooLong { len: usize },
}

impl<E> From<NoteScriptError> for MasterError<E> {
    fn from(e: NoteScriptError) -> Self {
        MasterError::Notes(e)
    }
}

impl<E: fmt::Debug> fmt::Display for MasterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MasterError::Bus(e) => write!(f, "i2c bus error: {:?}", e),
            MasterError::Notes(e) => write!(f, "{}", e),
            MasterError::FrameTooLong { len } => {
                write!(f, "{} data bytes exceed the {}-byte record", len, RECORD_LEN)
            }
        }
    }
}

/// Host-side handle on one robot.
pub struct RomiMaster<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> RomiMaster<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Talk to the robot at the default address.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: DEVICE_ADDRESS,
        }
    }

    /// Talk to a robot strapped to a different address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Consume the wrapper and return the bus and delay.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Read `buf.len()` registers starting at `register`.
    pub fn read_registers(
        &mut self,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), MasterError<I2C::Error>> {
        self.i2c
            .write(self.address, &[register])
            .map_err(MasterError::Bus)?;
        self.delay.delay_us(POINTER_SETTLE_US);
        self.i2c.read(self.address, buf).map_err(MasterError::Bus)
    }

    /// Write `data` to consecutive registers starting at `register`.
    ///
    /// More than `RECORD_LEN` bytes is refused before touching the bus.
    pub fn write_registers(
        &mut self,
        register: u8,
        data: &[u8],
    ) -> Result<(), MasterError<I2C::Error>> {
        let len = data.len();
        if len > RECORD_LEN {
            return Err(MasterError::FrameTooLong { len });
        }
        let mut frame = [0u8; 1 + RECORD_LEN];
        frame[0] = register;
        frame[1..=len].copy_from_slice(&data[..len]);

        self.i2c
            .write(self.address, &frame[..=len])
            .map_err(MasterError::Bus)?;
        self.delay.delay_us(POINTER_SETTLE_US);
        Ok(())
    }

    pub fn set_leds(
        &mut self,
        yellow: bool,
        green: bool,
        red: bool,
    ) -> Result<(), MasterError<I2C::Error>> {
        self.write_registers(reg::LEDS, &[yellow as u8, green as u8, red as u8])
    }

    pub fn set_motors(&mut self, left: i16, right: i16) -> Result<(), MasterError<I2C::Error>> {
        let mut data = [0u8; 4];
        data[..2].copy_from_slice(&left.to_le_bytes());
        data[2..].copy_from_slice(&right.to_le_bytes());
        self.write_registers(reg::MOTORS, &data)
    }

    /// Queue a tune. The robot clears the play flag when it finishes.
    pub fn play_notes(&mut self, notes: &str) -> Result<(), MasterError<I2C::Error>> {
        let script = NoteScript::new(notes)?;
        let mut data = [0u8; 1 + NOTE_CAPACITY];
        data[0] = 1;
        data[1..].copy_from_slice(&script.to_wire());
        self.write_registers(reg::PLAY_NOTES, &data)
    }

    /// True while the last queued tune has not finished.
    pub fn is_playing(&mut self) -> Result<bool, MasterError<I2C::Error>> {
        let mut flag = [0u8; 1];
        self.read_registers(reg::PLAY_NOTES, &mut flag)?;
        Ok(flag[0] != 0)
    }

    /// Button A, B, C states.
    pub fn buttons(&mut self) -> Result<[bool; 3], MasterError<I2C::Error>> {
        let mut raw = [0u8; 3];
        self.read_registers(reg::BUTTONS, &mut raw)?;
        Ok(raw.map(|b| b != 0))
    }

    pub fn battery_millivolts(&mut self) -> Result<u16, MasterError<I2C::Error>> {
        let mut raw = [0u8; 2];
        self.read_registers(reg::BATTERY, &mut raw)?;
        Ok(u16::from_le_bytes(raw))
    }

    pub fn analogs(&mut self) -> Result<[u16; ANALOG_CHANNELS], MasterError<I2C::Error>> {
        let mut raw = [0u8; 2 * ANALOG_CHANNELS];
        self.read_registers(reg::ANALOGS, &mut raw)?;

        let mut samples = [0u16; ANALOG_CHANNELS];
        for (sample, pair) in samples.iter_mut().zip(raw.chunks_exact(2)) {
            *sample = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(samples)
    }

    /// `(left, right)` encoder counts.
    pub fn encoders(&mut self) -> Result<(i16, i16), MasterError<I2C::Error>> {
        let mut raw = [0u8; 4];
        self.read_registers(reg::ENCODERS, &mut raw)?;
        Ok((
            i16::from_le_bytes([raw[0], raw[1]]),
            i16::from_le_bytes([raw[2], raw[3]]),
        ))
    }

    /// Read the whole record in one transaction.
    pub fn read_record(&mut self) -> Result<SharedRecord, MasterError<I2C::Error>> {
        let mut raw = [0u8; RECORD_LEN];
        self.read_registers(0x00, &mut raw)?;
        Ok(SharedRecord::from_bytes(&raw))
    }
}
