// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C register slave transport.
//!
//! Presents the shared record as byte-addressed registers. The hardware layer feeds bus events in
//! from the I2C interrupt:
//!
//! - [`RegisterSlave::on_address`] when our address matches (with the transfer direction),
//! - [`RegisterSlave::on_receive`] for each byte the master writes,
//! - [`RegisterSlave::on_transmit`] for each byte the master reads,
//! - [`RegisterSlave::on_nack`] when the master NACKs a byte it read,
//! - [`RegisterSlave::on_stop`] at the STOP condition.
//!
//! A write transaction starts with the register pointer, followed by data bytes at
//! auto-incrementing addresses. Data is staged locally and committed to the shared mailbox in one
//! step when the transaction ends, so the control loop never sees half a transaction. A read
//! transaction snapshots the published record when it starts and serves every byte from that
//! snapshot. The pointer carries over between transactions.
//!
//! Nothing here blocks; every handler runs to completion.

use core::fmt;

use crate::config::SlaveConfig;
use crate::protocol::{is_master_writable, RecordBytes, RECORD_LEN};
use crate::shared::{Mailbox, SharedBuffer};

/// Transfer direction, from the bus master's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Master writes to us.
    Write,
    /// Master reads from us.
    Read,
}

/// Transport-level errors. Counted and logged, never passed to the control loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// Register pointer or data address past the end of the record.
    AddressOutOfRange { address: usize },
    /// Master tried to write a register owned by the control loop.
    ReadOnlyRegister { address: usize },
    /// Byte event outside a transaction of the matching direction.
    UnexpectedByte,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::AddressOutOfRange { address } => {
                write!(f, "register 0x{:02X} is outside the record", address)
            }
            TransportError::ReadOnlyRegister { address } => {
                write!(f, "register 0x{:02X} is read-only for the master", address)
            }
            TransportError::UnexpectedByte => f.write_str("byte outside a transaction"),
        }
    }
}

/// Running transaction counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Write transactions seen (including pointer-only writes).
    pub writes: u32,
    /// Read transactions seen.
    pub reads: u32,
    /// Write transactions that staged at least one byte.
    pub commits: u32,
    /// Errors of any kind.
    pub errors: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Write transaction, next byte is the register pointer.
    AwaitPointer,
    /// Write transaction, data bytes.
    Writing,
    /// Read transaction, serving from `snapshot`.
    Reading,
}

/// Register slave bound to a shared buffer.
pub struct RegisterSlave<'a> {
    shared: &'a SharedBuffer,
    config: SlaveConfig,
    phase: Phase,
    pointer: usize,
    /// Bytes handed out in the current read.
    sent: usize,
    staged: Mailbox,
    snapshot: RecordBytes,
    stats: TransportStats,
    last_error: Option<TransportError>,
}

impl<'a> RegisterSlave<'a> {
    pub fn new(shared: &'a SharedBuffer, config: SlaveConfig) -> Self {
        Self {
            shared,
            config,
            phase: Phase::Idle,
            pointer: 0,
            sent: 0,
            staged: Mailbox::new(),
            snapshot: [0; RECORD_LEN],
            stats: TransportStats::default(),
            last_error: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    #[inline]
    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Most recent error, if any.
    #[inline]
    pub fn last_error(&self) -> Option<TransportError> {
        self.last_error
    }

    /// Current register pointer.
    #[inline]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// True between an address match and the end of its transaction.
    #[inline]
    pub fn in_transaction(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Address matched. A match while a write is open is a repeated START and ends that write.
    pub fn on_address(&mut self, direction: Direction) {
        self.finish_write();

        match direction {
            Direction::Write => {
                self.stats.writes = self.stats.writes.wrapping_add(1);
                self.staged.clear();
                self.phase = Phase::AwaitPointer;
            }
            Direction::Read => {
                self.stats.reads = self.stats.reads.wrapping_add(1);
                self.snapshot = self.shared.snapshot();
                self.sent = 0;
                self.phase = Phase::Reading;
            }
        }
    }

    /// The master wrote `byte`.
    ///
    /// Rejected data bytes are dropped; the pointer still advances past them.
    pub fn on_receive(&mut self, byte: u8) -> Result<(), TransportError> {
        match self.phase {
            Phase::AwaitPointer => {
                self.pointer = byte as usize;
                self.phase = Phase::Writing;
                if self.pointer >= RECORD_LEN {
                    return Err(self.fail(TransportError::AddressOutOfRange {
                        address: self.pointer,
                    }));
                }
                Ok(())
            }
            Phase::Writing => {
                let address = self.advance();
                if address >= RECORD_LEN {
                    Err(self.fail(TransportError::AddressOutOfRange { address }))
                } else if !is_master_writable(address) {
                    Err(self.fail(TransportError::ReadOnlyRegister { address }))
                } else {
                    self.staged.stage(address, byte);
                    Ok(())
                }
            }
            Phase::Idle | Phase::Reading => Err(self.fail(TransportError::UnexpectedByte)),
        }
    }

    /// The master wants the next byte. Always returns something to put on the wire.
    pub fn on_transmit(&mut self) -> u8 {
        if self.phase != Phase::Reading {
            self.fail(TransportError::UnexpectedByte);
            return self.config.read_fill;
        }

        let address = self.advance();
        self.sent += 1;
        match self.snapshot.get(address) {
            Some(&byte) => byte,
            None => {
                self.fail(TransportError::AddressOutOfRange { address });
                self.config.read_fill
            }
        }
    }

    /// The master NACKed the last byte it read.
    ///
    /// The peripheral asks for one byte ahead of the master's clock, so the last byte handed out
    /// was never sent. Step the pointer back over it.
    pub fn on_nack(&mut self) {
        if self.phase == Phase::Reading && self.sent > 0 {
            self.sent -= 1;
            self.pointer -= 1;
        }
    }

    /// STOP condition: end of the current transaction.
    pub fn on_stop(&mut self) {
        self.finish_write();
        self.phase = Phase::Idle;
    }

    /// Run a complete write transaction (`bytes[0]` is the register pointer).
    ///
    /// Every byte is processed; the first error is returned.
    pub fn handle_write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.on_address(Direction::Write);
        let result = self.receive_all(bytes);
        self.on_stop();
        result
    }

    /// Run a complete read transaction from the current pointer.
    pub fn handle_read(&mut self, buf: &mut [u8]) {
        self.on_address(Direction::Read);
        for b in buf.iter_mut() {
            *b = self.on_transmit();
        }
        self.on_stop();
    }

    /// Write `bytes`, repeated START, then read into `buf`.
    pub fn handle_write_read(&mut self, bytes: &[u8], buf: &mut [u8]) -> Result<(), TransportError> {
        self.on_address(Direction::Write);
        let result = self.receive_all(bytes);
        self.on_address(Direction::Read);
        for b in buf.iter_mut() {
            *b = self.on_transmit();
        }
        self.on_stop();
        result
    }

    fn receive_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut result = Ok(());
        for &byte in bytes {
            if let Err(e) = self.on_receive(byte) {
                result = result.and(Err(e));
            }
        }
        result
    }

    /// Return the pointer and move it forward.
    #[inline]
    fn advance(&mut self) -> usize {
        let address = self.pointer;
        self.pointer = self.pointer.saturating_add(1);
        address
    }

    fn finish_write(&mut self) {
        if !matches!(self.phase, Phase::AwaitPointer | Phase::Writing) {
            return;
        }
        if !self.staged.is_empty() {
            self.shared.commit(&self.staged);
            self.stats.commits = self.stats.commits.wrapping_add(1);
            log::debug!("i2c: committed write ending at 0x{:02X}", self.pointer);
        }
        self.staged.clear();
        self.phase = Phase::Idle;
    }

    fn fail(&mut self, error: TransportError) -> TransportError {
        self.stats.errors = self.stats.errors.wrapping_add(1);
        self.last_error = Some(error);
        log::trace!("i2c: {}", error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{reg, SharedRecord};
    use crate::shared::RecordBuffer;

    #[test]
    fn write_is_staged_until_stop() {
        let shared = SharedBuffer::new();
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        slave.on_address(Direction::Write);
        slave.on_receive(reg::LEDS).unwrap();
        slave.on_receive(1).unwrap();
        assert!(!shared.pending());

        slave.on_receive(1).unwrap();
        slave.on_stop();
        assert!(shared.pending());
        assert_eq!(slave.stats().commits, 1);
    }

    #[test]
    fn read_serves_published_snapshot() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        buffer.record_mut().battery_millivolts = 0x1C20;
        buffer.publish();

        let mut out = [0u8; 2];
        slave.handle_write_read(&[reg::BATTERY], &mut out).unwrap();
        assert_eq!(u16::from_le_bytes(out), 0x1C20);
        assert_eq!(slave.pointer(), reg::BATTERY as usize + 2);
    }

    #[test]
    fn read_is_not_torn_by_publish_mid_transaction() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        buffer.record_mut().left_encoder = 0x0101;
        buffer.publish();

        slave.handle_write(&[reg::LEFT_ENCODER]).unwrap();
        slave.on_address(Direction::Read);
        let lo = slave.on_transmit();

        buffer.record_mut().left_encoder = 0x0202;
        buffer.publish();

        let hi = slave.on_transmit();
        slave.on_stop();
        assert_eq!(i16::from_le_bytes([lo, hi]), 0x0101);
    }

    #[test]
    fn pointer_carries_over_between_transactions() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        buffer.record_mut().button_b = true;
        buffer.publish();

        slave.handle_write(&[reg::BUTTON_A]).unwrap();
        let mut a = [0u8; 1];
        let mut b = [0u8; 1];
        slave.handle_read(&mut a);
        slave.handle_read(&mut b);
        assert_eq!((a[0], b[0]), (0, 1));
    }

    #[test]
    fn loop_owned_registers_reject_writes() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        let err = slave.handle_write(&[reg::BATTERY, 0xFF, 0xFF]).unwrap_err();
        assert_eq!(
            err,
            TransportError::ReadOnlyRegister {
                address: reg::BATTERY as usize
            }
        );
        assert_eq!(slave.stats().errors, 2);
        assert!(!shared.pending());

        buffer.pull_latest();
        assert_eq!(*buffer.record(), SharedRecord::default());
    }

    #[test]
    fn mixed_write_keeps_master_bytes() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        // red LED (master) then button A (loop)
        let result = slave.handle_write(&[reg::LED_RED, 1, 1]);
        assert!(result.is_err());

        buffer.pull_latest();
        assert!(buffer.record().red);
        assert!(!buffer.record().button_a);
    }

    #[test]
    fn out_of_range_reads_return_fill() {
        let shared = SharedBuffer::new();
        let config = SlaveConfig::default().with_read_fill(0xEE);
        let mut slave = RegisterSlave::new(&shared, config);

        assert_eq!(
            slave.handle_write(&[0x40]),
            Err(TransportError::AddressOutOfRange { address: 0x40 })
        );

        let mut out = [0u8; 3];
        slave.handle_read(&mut out);
        assert_eq!(out, [0xEE; 3]);

        slave.handle_write(&[(RECORD_LEN - 1) as u8]).unwrap();
        slave.handle_read(&mut out);
        assert_eq!(&out[1..], &[0xEE, 0xEE]);
    }

    #[test]
    fn bytes_outside_a_transaction_are_errors() {
        let shared = SharedBuffer::new();
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        assert_eq!(slave.on_receive(1), Err(TransportError::UnexpectedByte));
        assert_eq!(slave.on_transmit(), SlaveConfig::default().read_fill);
        assert_eq!(slave.last_error(), Some(TransportError::UnexpectedByte));
        assert!(!slave.in_transaction());
    }

    #[test]
    fn nack_rewinds_the_byte_fetched_ahead() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        buffer.record_mut().button_a = true;
        buffer.record_mut().button_b = true;
        buffer.publish();

        slave.handle_write(&[reg::BUTTON_A]).unwrap();
        let mut seen = [0u8; 3];
        for b in seen.iter_mut() {
            // one byte on the wire, one fetched ahead, then NACK and STOP
            slave.on_address(Direction::Read);
            *b = slave.on_transmit();
            let _ = slave.on_transmit();
            slave.on_nack();
            slave.on_stop();
        }

        assert_eq!(seen, [1, 1, 0]);
        assert_eq!(slave.pointer(), reg::BUTTON_A as usize + 3);
    }

    #[test]
    fn nack_outside_a_read_is_ignored() {
        let shared = SharedBuffer::new();
        let mut slave = RegisterSlave::new(&shared, SlaveConfig::default());

        slave.handle_write(&[reg::MOTORS]).unwrap();
        slave.on_nack();
        assert_eq!(slave.pointer(), reg::MOTORS as usize);

        // a read that never sent a byte has nothing to rewind
        slave.on_address(Direction::Read);
        slave.on_nack();
        slave.on_stop();
        assert_eq!(slave.pointer(), reg::MOTORS as usize);
    }
}
