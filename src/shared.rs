// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Double-buffered shared record.
//!
//! The record exists in three places:
//!
//! - the **working copy**, owned by the control loop through [`RecordBuffer`] and mutated freely,
//! - the **published copy**, the bytes the slave transport serves to the bus master,
//! - the **mailbox**, master writes staged by the transport and not yet pulled by the loop.
//!
//! The published copy and the mailbox live in [`SharedBuffer`] behind a
//! `critical_section::Mutex`. Every hand-off between the two execution contexts is one critical
//! section moving the whole record (or a whole staged transaction), so neither side ever sees a
//! half-updated record. Interrupts are masked for at most one record copy plus a 64-bit mask
//! merge.
//!
//! ```no_run
//! use romi_slave::shared::{RecordBuffer, SharedBuffer};
//!
//! static SHARED: SharedBuffer = SharedBuffer::new();
//!
//! let mut buffer = RecordBuffer::new(&SHARED);
//! loop {
//!     buffer.pull_latest();
//!     // ... read commands, write telemetry through buffer.record_mut() ...
//!     buffer.publish();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::protocol::{RecordBytes, SharedRecord, MASTER_WRITABLE, RECORD_LEN};

/// Master bytes staged for the loop, with one dirty bit per register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Mailbox {
    bytes: RecordBytes,
    dirty: u64,
}

impl Mailbox {
    pub(crate) const fn new() -> Self {
        Self {
            bytes: [0; RECORD_LEN],
            dirty: 0,
        }
    }

    /// Stage `byte` at `address`. Callers check the address against the record.
    #[inline]
    pub(crate) fn stage(&mut self, address: usize, byte: u8) {
        self.bytes[address] = byte;
        self.dirty |= 1 << address;
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.dirty == 0
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.dirty = 0;
    }

    /// Fold a newer mailbox into this one; its bytes win.
    fn merge(&mut self, newer: &Mailbox) {
        for address in dirty_addresses(newer.dirty) {
            self.bytes[address] = newer.bytes[address];
        }
        self.dirty |= newer.dirty;
    }

    fn apply_to(&self, target: &mut RecordBytes) {
        for address in dirty_addresses(self.dirty) {
            target[address] = self.bytes[address];
        }
    }
}

fn dirty_addresses(mut mask: u64) -> impl Iterator<Item = usize> {
    core::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let address = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(address)
    })
}

/// Bus-side state touched by both contexts.
struct BusSide {
    published: RecordBytes,
    mailbox: Mailbox,
    commits: u32,
}

/// Published record plus staged master writes. Lives in static storage.
pub struct SharedBuffer {
    bus: Mutex<RefCell<BusSide>>,
}

impl SharedBuffer {
    /// An all-zero record with nothing staged.
    pub const fn new() -> Self {
        Self {
            bus: Mutex::new(RefCell::new(BusSide {
                published: [0; RECORD_LEN],
                mailbox: Mailbox::new(),
                commits: 0,
            })),
        }
    }

    /// Copy of the most recently published record bytes.
    pub fn snapshot(&self) -> RecordBytes {
        critical_section::with(|cs| self.bus.borrow_ref(cs).published)
    }

    /// True if master writes are waiting for the next `pull_latest()`.
    pub fn pending(&self) -> bool {
        critical_section::with(|cs| !self.bus.borrow_ref(cs).mailbox.is_empty())
    }

    /// Number of master write transactions committed so far.
    pub fn commits(&self) -> u32 {
        critical_section::with(|cs| self.bus.borrow_ref(cs).commits)
    }

    /// Commit one finished master write transaction to the mailbox.
    ///
    /// Only master-owned registers are kept, whatever the caller staged.
    pub(crate) fn commit(&self, staged: &Mailbox) {
        let mut staged = *staged;
        staged.dirty &= MASTER_WRITABLE;
        if staged.is_empty() {
            return;
        }

        critical_section::with(|cs| {
            let mut bus = self.bus.borrow_ref_mut(cs);
            bus.mailbox.merge(&staged);
            bus.commits = bus.commits.wrapping_add(1);
        });
    }

    /// Hand the mailbox to the loop, leaving it empty.
    fn take_mailbox(&self) -> Mailbox {
        critical_section::with(|cs| {
            let mut bus = self.bus.borrow_ref_mut(cs);
            core::mem::replace(&mut bus.mailbox, Mailbox::new())
        })
    }

    /// Replace the published copy. Staged bytes the loop has not pulled yet stay on top.
    fn publish_bytes(&self, mut bytes: RecordBytes) {
        critical_section::with(|cs| {
            let mut bus = self.bus.borrow_ref_mut(cs);
            bus.mailbox.apply_to(&mut bytes);
            bus.published = bytes;
        });
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The control loop's handle on the shared record: the working copy plus the hand-off points.
pub struct RecordBuffer<'a> {
    shared: &'a SharedBuffer,
    working: SharedRecord,
    /// Master-owned bytes exactly as the master last wrote them.
    master_raw: RecordBytes,
}

impl<'a> RecordBuffer<'a> {
    /// Start from whatever is currently published.
    pub fn new(shared: &'a SharedBuffer) -> Self {
        let bytes = shared.snapshot();
        Self {
            shared,
            working: SharedRecord::from_bytes(&bytes),
            master_raw: bytes,
        }
    }

    /// Bring master writes staged since the last call into the working copy.
    ///
    /// Call at the top of every iteration, before reading any field.
    pub fn pull_latest(&mut self) {
        let staged = self.shared.take_mailbox();
        if staged.is_empty() {
            return;
        }

        let mut bytes = self.working.to_bytes();
        staged.apply_to(&mut bytes);
        staged.apply_to(&mut self.master_raw);
        self.working = SharedRecord::from_bytes(&bytes);
    }

    /// Make the working copy visible to the bus master in one step.
    ///
    /// Master-owned bytes the loop left alone go out exactly as the master wrote them, so a flag
    /// written as 2 reads back as 2. A field the loop changed (the play flag it clears) goes out
    /// in its encoded form.
    pub fn publish(&mut self) {
        let mut bytes = self.working.to_bytes();
        let unchanged = SharedRecord::from_bytes(&self.master_raw).to_bytes();
        for address in dirty_addresses(MASTER_WRITABLE) {
            if bytes[address] == unchanged[address] {
                bytes[address] = self.master_raw[address];
            } else {
                self.master_raw[address] = bytes[address];
            }
        }
        self.shared.publish_bytes(bytes);
    }

    /// Working copy.
    #[inline]
    pub fn record(&self) -> &SharedRecord {
        &self.working
    }

    /// Mutable working copy. Changes stay private until `publish()`.
    #[inline]
    pub fn record_mut(&mut self) -> &mut SharedRecord {
        &mut self.working
    }

    /// The shared side this buffer hands off to.
    #[inline]
    pub fn shared(&self) -> &'a SharedBuffer {
        self.shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::reg;

    fn stage_motors(shared: &SharedBuffer, left: i16, right: i16) {
        let mut mailbox = Mailbox::new();
        for (i, b) in left.to_le_bytes().iter().chain(&right.to_le_bytes()).enumerate() {
            mailbox.stage(reg::MOTORS as usize + i, *b);
        }
        shared.commit(&mailbox);
    }

    #[test]
    fn master_writes_wait_for_pull() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        stage_motors(&shared, 150, -150);
        assert!(shared.pending());
        assert_eq!(buffer.record().left_motor, 0);

        buffer.pull_latest();
        assert_eq!(buffer.record().left_motor, 150);
        assert_eq!(buffer.record().right_motor, -150);
        assert!(!shared.pending());
    }

    #[test]
    fn loop_writes_wait_for_publish() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        buffer.record_mut().battery_millivolts = 7200;
        assert_eq!(shared.snapshot()[reg::BATTERY as usize], 0);

        buffer.publish();
        let published = SharedRecord::from_bytes(&shared.snapshot());
        assert_eq!(published.battery_millivolts, 7200);
    }

    #[test]
    fn commit_drops_loop_owned_bytes() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        let mut mailbox = Mailbox::new();
        mailbox.stage(reg::BATTERY as usize, 0xAA);
        mailbox.stage(reg::LED_RED as usize, 1);
        shared.commit(&mailbox);

        buffer.pull_latest();
        assert!(buffer.record().red);
        assert_eq!(buffer.record().battery_millivolts, 0);
    }

    #[test]
    fn publish_keeps_unpulled_master_bytes() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        buffer.pull_latest();
        stage_motors(&shared, 42, 43);
        buffer.record_mut().left_encoder = 9;
        buffer.publish();

        let published = SharedRecord::from_bytes(&shared.snapshot());
        assert_eq!(published.left_motor, 42);
        assert_eq!(published.left_encoder, 9);

        // still delivered to the loop on the next pull
        assert!(shared.pending());
        buffer.pull_latest();
        assert_eq!(buffer.record().right_motor, 43);
    }

    #[test]
    fn later_commits_win() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        stage_motors(&shared, 1, 2);
        stage_motors(&shared, 3, 4);
        assert_eq!(shared.commits(), 2);

        buffer.pull_latest();
        assert_eq!((buffer.record().left_motor, buffer.record().right_motor), (3, 4));
    }

    #[test]
    fn publish_keeps_raw_master_flag_bytes() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        let mut mailbox = Mailbox::new();
        mailbox.stage(reg::LED_YELLOW as usize, 2);
        mailbox.stage(reg::LED_GREEN as usize, 0x80);
        shared.commit(&mailbox);

        buffer.pull_latest();
        assert!(buffer.record().yellow && buffer.record().green);
        buffer.publish();
        buffer.pull_latest();
        buffer.publish();

        let published = shared.snapshot();
        assert_eq!(published[reg::LED_YELLOW as usize], 2);
        assert_eq!(published[reg::LED_GREEN as usize], 0x80);
    }

    #[test]
    fn loop_cleared_play_flag_publishes_zero() {
        let shared = SharedBuffer::new();
        let mut buffer = RecordBuffer::new(&shared);

        let mut mailbox = Mailbox::new();
        mailbox.stage(reg::PLAY_NOTES as usize, 5);
        shared.commit(&mailbox);

        buffer.pull_latest();
        buffer.publish();
        assert_eq!(shared.snapshot()[reg::PLAY_NOTES as usize], 5);

        buffer.record_mut().play_notes = false;
        buffer.publish();
        assert_eq!(shared.snapshot()[reg::PLAY_NOTES as usize], 0);

        // a later loop-side set goes out encoded
        buffer.record_mut().play_notes = true;
        buffer.publish();
        assert_eq!(shared.snapshot()[reg::PLAY_NOTES as usize], 1);
    }

    #[test]
    fn dirty_addresses_visits_each_bit() {
        let mut seen = [false; 64];
        for address in dirty_addresses((1 << 0) | (1 << 7) | (1 << 42)) {
            seen[address] = true;
        }
        assert_eq!(seen.iter().filter(|&&s| s).count(), 3);
        assert!(seen[0] && seen[7] && seen[42]);
    }
}
