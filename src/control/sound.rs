// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Play-notes hand-off between the bus master and the control loop.
//!
//! The master writes a note script and sets `play_notes`. The loop starts the tune once, waits
//! for the buzzer to finish, then clears `play_notes` so the master can see completion and
//! re-arm.

use crate::control::peripherals::TunePlayer;
use crate::protocol::SharedRecord;

/// Sequencer state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SoundState {
    Idle,
    Playing,
}

/// What a single `update()` did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SoundEvent {
    None,
    Started,
    Finished,
}

pub struct SoundSequencer {
    state: SoundState,
}

impl SoundSequencer {
    pub const fn new() -> Self {
        Self {
            state: SoundState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> SoundState {
        self.state
    }

    /// Advance one loop iteration.
    ///
    /// - Idle and `play_notes` set: start the tune.
    /// - Playing and the player is done: clear `play_notes`.
    ///
    /// `play_notes` is never cleared while playing, and re-asserting it while playing does
    /// nothing.
    pub fn update<P: TunePlayer>(&mut self, record: &mut SharedRecord, player: &mut P) -> SoundEvent {
        match self.state {
            SoundState::Idle if record.play_notes => {
                player.play(record.notes.as_str());
                self.state = SoundState::Playing;
                SoundEvent::Started
            }
            SoundState::Playing if !player.is_playing() => {
                record.play_notes = false;
                self.state = SoundState::Idle;
                SoundEvent::Finished
            }
            _ => SoundEvent::None,
        }
    }
}

impl Default for SoundSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::NoteScript;

    #[derive(Default)]
    struct FakeBuzzer {
        started: u32,
        last: [u8; 14],
        remaining: u32,
    }

    impl TunePlayer for FakeBuzzer {
        fn play(&mut self, notes: &str) {
            self.started += 1;
            self.last = [0; 14];
            self.last[..notes.len()].copy_from_slice(notes.as_bytes());
            self.remaining = 3;
        }

        fn is_playing(&mut self) -> bool {
            self.remaining > 0
        }
    }

    #[test]
    fn plays_once_and_clears_flag_when_finished() {
        let mut seq = SoundSequencer::new();
        let mut buzzer = FakeBuzzer::default();
        let mut record = SharedRecord {
            play_notes: true,
            notes: NoteScript::new("l8cdef").unwrap(),
            ..Default::default()
        };

        assert_eq!(seq.update(&mut record, &mut buzzer), SoundEvent::Started);
        assert_eq!(&buzzer.last[..6], b"l8cdef");

        while buzzer.remaining > 0 {
            assert_eq!(seq.update(&mut record, &mut buzzer), SoundEvent::None);
            assert!(record.play_notes);
            buzzer.remaining -= 1;
        }

        assert_eq!(seq.update(&mut record, &mut buzzer), SoundEvent::Finished);
        assert!(!record.play_notes);
        assert_eq!(seq.state(), SoundState::Idle);
        assert_eq!(buzzer.started, 1);
    }

    #[test]
    fn idle_without_trigger_does_nothing() {
        let mut seq = SoundSequencer::new();
        let mut buzzer = FakeBuzzer::default();
        let mut record = SharedRecord::default();

        for _ in 0..5 {
            assert_eq!(seq.update(&mut record, &mut buzzer), SoundEvent::None);
        }
        assert_eq!(buzzer.started, 0);
    }
}
