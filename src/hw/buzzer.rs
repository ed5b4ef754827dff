// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Active piezo buzzer on a GPIO pin.
//!
//! The buzzer oscillates by itself, so a tune is played as one timed beep per note letter
//! (`a`..`g`) and a silent slot per rest (`r`). Everything else in the script (octave, volume,
//! duration and accidental marks) only paces the sequence.

use stm32f7xx_hal::gpio::{self, Output, PinState, PushPull};

use crate::config::NOTE_CAPACITY;

/// Length of one note slot (ms).
const SLOT_MS: u32 = 125;
/// Sounding part of a slot; the rest is the gap between notes (ms).
const BEEP_MS: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Beep,
    Rest,
}

pub struct Buzzer<const P: char, const N: u8> {
    pin: gpio::Pin<P, N, Output<PushPull>>,
    slots: [Slot; NOTE_CAPACITY],
    len: usize,
    index: usize,
    elapsed_ms: u32,
}

impl<const P: char, const N: u8> Buzzer<P, N> {
    pub fn new<MODE>(pin: gpio::Pin<P, N, MODE>) -> Self {
        let mut pin = pin.into_push_pull_output();
        pin.set_state(PinState::Low);
        Self {
            pin,
            slots: [Slot::Rest; NOTE_CAPACITY],
            len: 0,
            index: 0,
            elapsed_ms: 0,
        }
    }

    /// Start `notes` from the beginning, replacing anything playing.
    pub fn play(&mut self, notes: &str) {
        self.len = 0;
        for b in notes.bytes() {
            let slot = match b.to_ascii_lowercase() {
                b'a'..=b'g' => Slot::Beep,
                b'r' => Slot::Rest,
                _ => continue,
            };
            if self.len == self.slots.len() {
                break;
            }
            self.slots[self.len] = slot;
            self.len += 1;
        }
        self.index = 0;
        self.elapsed_ms = 0;
        self.drive();
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.index < self.len
    }

    /// Advance the sequence by `ms` milliseconds.
    pub fn tick(&mut self, ms: u32) {
        if !self.is_playing() {
            return;
        }
        self.elapsed_ms += ms;
        while self.is_playing() && self.elapsed_ms >= SLOT_MS {
            self.elapsed_ms -= SLOT_MS;
            self.index += 1;
        }
        self.drive();
    }

    fn drive(&mut self) {
        let sounding = self.is_playing()
            && self.slots[self.index] == Slot::Beep
            && self.elapsed_ms < BEEP_MS;
        self.pin
            .set_state(if sounding { PinState::High } else { PinState::Low });
    }
}
