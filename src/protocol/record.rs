// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The shared record and its packed little-endian encoding.

use crate::config::{ANALOG_CHANNELS, NOTE_CAPACITY};
use crate::protocol::notes::NoteScript;
use crate::protocol::registers::{reg, RECORD_LEN};

/// Encoded record bytes, indexed by register address.
pub type RecordBytes = [u8; RECORD_LEN];

/// State shared between the control loop and the bus master.
///
/// Field order is the wire order. Ownership:
/// - master writes: indicator flags, motor commands, play flag, notes
/// - loop writes: buttons, battery, analog samples, encoders, and clearing `play_notes`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SharedRecord {
    pub yellow: bool,
    pub green: bool,
    pub red: bool,

    pub button_a: bool,
    pub button_b: bool,
    pub button_c: bool,

    /// Left motor speed command.
    pub left_motor: i16,
    /// Right motor speed command.
    pub right_motor: i16,

    pub battery_millivolts: u16,
    /// Raw ADC counts, one per analog channel.
    pub analog: [u16; ANALOG_CHANNELS],

    /// Set by the master to start `notes`; cleared by the loop once playback finishes.
    pub play_notes: bool,
    pub notes: NoteScript,

    pub left_encoder: i16,
    pub right_encoder: i16,
}

#[inline]
fn get_u16(bytes: &RecordBytes, at: u8) -> u16 {
    let at = at as usize;
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

#[inline]
fn get_i16(bytes: &RecordBytes, at: u8) -> i16 {
    get_u16(bytes, at) as i16
}

#[inline]
fn put_u16(bytes: &mut RecordBytes, at: u8, value: u16) {
    let at = at as usize;
    bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn put_i16(bytes: &mut RecordBytes, at: u8, value: i16) {
    put_u16(bytes, at, value as u16);
}

impl SharedRecord {
    /// Encode into register order.
    pub fn to_bytes(&self) -> RecordBytes {
        let mut bytes = [0u8; RECORD_LEN];

        bytes[reg::LED_YELLOW as usize] = self.yellow as u8;
        bytes[reg::LED_GREEN as usize] = self.green as u8;
        bytes[reg::LED_RED as usize] = self.red as u8;

        bytes[reg::BUTTON_A as usize] = self.button_a as u8;
        bytes[reg::BUTTON_B as usize] = self.button_b as u8;
        bytes[reg::BUTTON_C as usize] = self.button_c as u8;

        put_i16(&mut bytes, reg::LEFT_MOTOR, self.left_motor);
        put_i16(&mut bytes, reg::RIGHT_MOTOR, self.right_motor);

        put_u16(&mut bytes, reg::BATTERY, self.battery_millivolts);
        for (i, &sample) in self.analog.iter().enumerate() {
            put_u16(&mut bytes, reg::ANALOGS + 2 * i as u8, sample);
        }

        bytes[reg::PLAY_NOTES as usize] = self.play_notes as u8;
        let notes = reg::NOTES as usize;
        bytes[notes..notes + NOTE_CAPACITY].copy_from_slice(&self.notes.to_wire());

        put_i16(&mut bytes, reg::LEFT_ENCODER, self.left_encoder);
        put_i16(&mut bytes, reg::RIGHT_ENCODER, self.right_encoder);

        bytes
    }

    /// Decode from register order. Any non-zero flag byte reads as `true`.
    pub fn from_bytes(bytes: &RecordBytes) -> Self {
        let flag = |at: u8| bytes[at as usize] != 0;

        let mut analog = [0u16; ANALOG_CHANNELS];
        for (i, sample) in analog.iter_mut().enumerate() {
            *sample = get_u16(bytes, reg::ANALOGS + 2 * i as u8);
        }

        let notes = reg::NOTES as usize;
        let mut field = [0u8; NOTE_CAPACITY];
        field.copy_from_slice(&bytes[notes..notes + NOTE_CAPACITY]);

        Self {
            yellow: flag(reg::LED_YELLOW),
            green: flag(reg::LED_GREEN),
            red: flag(reg::LED_RED),

            button_a: flag(reg::BUTTON_A),
            button_b: flag(reg::BUTTON_B),
            button_c: flag(reg::BUTTON_C),

            left_motor: get_i16(bytes, reg::LEFT_MOTOR),
            right_motor: get_i16(bytes, reg::RIGHT_MOTOR),

            battery_millivolts: get_u16(bytes, reg::BATTERY),
            analog,

            play_notes: flag(reg::PLAY_NOTES),
            notes: NoteScript::from_wire(field),

            left_encoder: get_i16(bytes, reg::LEFT_ENCODER),
            right_encoder: get_i16(bytes, reg::RIGHT_ENCODER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_register_map() {
        let record = SharedRecord {
            green: true,
            button_c: true,
            left_motor: 150,
            right_motor: -150,
            battery_millivolts: 7412,
            analog: [1, 2, 3, 4, 5, 0x0FFF],
            play_notes: true,
            notes: NoteScript::new("c4").unwrap(),
            left_encoder: -2,
            right_encoder: 0x1234,
            ..Default::default()
        };

        let bytes = record.to_bytes();
        assert_eq!(&bytes[0x00..0x03], &[0, 1, 0]);
        assert_eq!(&bytes[0x03..0x06], &[0, 0, 1]);
        assert_eq!(&bytes[0x06..0x0A], &[0x96, 0x00, 0x6A, 0xFF]);
        assert_eq!(&bytes[0x0A..0x0C], &7412u16.to_le_bytes());
        assert_eq!(&bytes[0x16..0x18], &[0xFF, 0x0F]);
        assert_eq!(bytes[0x18], 1);
        assert_eq!(&bytes[0x19..0x1C], &[b'c', b'4', 0]);
        assert_eq!(&bytes[0x27..0x2B], &[0xFE, 0xFF, 0x34, 0x12]);

        assert_eq!(SharedRecord::from_bytes(&bytes), record);
    }

    #[test]
    fn nonzero_flag_bytes_decode_true() {
        let mut bytes = [0u8; RECORD_LEN];
        bytes[reg::LED_RED as usize] = 0x80;
        bytes[reg::PLAY_NOTES as usize] = 0xFF;
        let record = SharedRecord::from_bytes(&bytes);
        assert!(record.red);
        assert!(record.play_notes);
        assert!(!record.yellow);
    }
}
