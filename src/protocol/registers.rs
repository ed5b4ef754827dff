// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Register map of the shared record.
//!
//! Register addresses map directly onto the packed, little-endian encoding of
//! [`SharedRecord`](crate::protocol::SharedRecord), in field declaration order. Any change here is
//! a breaking protocol change for the bus master.

use crate::config::{ANALOG_CHANNELS, NOTE_CAPACITY, REGISTER_WINDOW};

// Register addresses
pub mod reg {
    pub const LEDS: u8 = 0x00;
    pub const LED_YELLOW: u8 = 0x00;
    pub const LED_GREEN: u8 = 0x01;
    pub const LED_RED: u8 = 0x02;
    pub const BUTTONS: u8 = 0x03;
    pub const BUTTON_A: u8 = 0x03;
    pub const BUTTON_B: u8 = 0x04;
    pub const BUTTON_C: u8 = 0x05;
    pub const MOTORS: u8 = 0x06;
    pub const LEFT_MOTOR: u8 = 0x06;
    pub const RIGHT_MOTOR: u8 = 0x08;
    pub const BATTERY: u8 = 0x0A;
    pub const ANALOGS: u8 = 0x0C;
    pub const PLAY_NOTES: u8 = 0x18;
    pub const NOTES: u8 = 0x19;
    pub const ENCODERS: u8 = 0x27;
    pub const LEFT_ENCODER: u8 = 0x27;
    pub const RIGHT_ENCODER: u8 = 0x29;
}

/// Encoded size of the record, in bytes.
pub const RECORD_LEN: usize = 3 // indicator flags
    + 3 // button flags
    + 2 * 2 // motor commands
    + 2 // battery
    + ANALOG_CHANNELS * 2
    + 1 // play flag
    + NOTE_CAPACITY
    + 2 * 2; // encoders

const _: () = assert!(
    RECORD_LEN <= REGISTER_WINDOW,
    "shared record no longer fits the I2C register window"
);
const _: () = assert!(
    REGISTER_WINDOW <= 64,
    "dirty masks are 64 bits wide"
);
const _: () = assert!(reg::ENCODERS as usize + 4 == RECORD_LEN);

/// Bit mask with bits `start..start + len` set.
const fn span(start: u8, len: usize) -> u64 {
    let mut mask = 0u64;
    let mut i = 0;
    while i < len {
        mask |= 1 << (start as usize + i);
        i += 1;
    }
    mask
}

/// Registers the bus master may write. Everything else is owned by the control loop.
pub const MASTER_WRITABLE: u64 =
    span(reg::LEDS, 3) | span(reg::MOTORS, 4) | span(reg::PLAY_NOTES, 1 + NOTE_CAPACITY);

/// Mask with one bit per record byte.
pub const RECORD_MASK: u64 = span(0, RECORD_LEN);

/// True if the bus master owns the register at `address`.
#[inline]
pub fn is_master_writable(address: usize) -> bool {
    address < RECORD_LEN && (MASTER_WRITABLE >> address) & 1 != 0
}
