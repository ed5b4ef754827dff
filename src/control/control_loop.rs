// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Foreground control loop.
//!
//! One call to [`ControlLoop::step`] is one iteration:
//!
//! 1. `pull_latest()` the master's writes,
//! 2. drive LEDs and motors from master-owned fields,
//! 3. sample buttons, battery, analog inputs and encoders into loop-owned fields,
//! 4. advance the play-notes sequencer,
//! 5. `publish()`.
//!
//! Typical usage pattern:
//!
//! ```no_run
//! # use romi_slave::control::{ControlLoop, Robot};
//! # use romi_slave::shared::SharedBuffer;
//! # fn run<R: Robot>(robot: &mut R, shared: &SharedBuffer) -> ! {
//! let mut control = ControlLoop::new(shared);
//! loop {
//!     control.step(robot);
//! }
//! # }
//! ```

use crate::control::peripherals::Robot;
use crate::control::sound::{SoundEvent, SoundSequencer, SoundState};
use crate::protocol::SharedRecord;
use crate::shared::{RecordBuffer, SharedBuffer};

pub struct ControlLoop<'a> {
    buffer: RecordBuffer<'a>,
    sound: SoundSequencer,
    iterations: u32,
}

impl<'a> ControlLoop<'a> {
    pub fn new(shared: &'a SharedBuffer) -> Self {
        Self {
            buffer: RecordBuffer::new(shared),
            sound: SoundSequencer::new(),
            iterations: 0,
        }
    }

    /// Run one iteration.
    pub fn step<R: Robot>(&mut self, robot: &mut R) {
        self.buffer.pull_latest();

        let commands = *self.buffer.record();
        robot.set_indicators(commands.yellow, commands.green, commands.red);
        robot.set_speeds(commands.left_motor, commands.right_motor);

        let record = self.buffer.record_mut();
        sample_hardware(record, robot);

        match self.sound.update(record, robot) {
            SoundEvent::Started => log::debug!("sound: playing {:?}", record.notes),
            SoundEvent::Finished => log::debug!("sound: finished"),
            SoundEvent::None => {}
        }

        self.buffer.publish();
        self.iterations = self.iterations.wrapping_add(1);
    }

    /// Working copy as of the last step.
    #[inline]
    pub fn record(&self) -> &SharedRecord {
        self.buffer.record()
    }

    #[inline]
    pub fn sound_state(&self) -> SoundState {
        self.sound.state()
    }

    /// Completed iterations (wraps).
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Write the loop-owned telemetry fields. Touches nothing the master owns.
fn sample_hardware<R: Robot>(record: &mut SharedRecord, robot: &mut R) {
    let [a, b, c] = robot.buttons();
    record.button_a = a;
    record.button_b = b;
    record.button_c = c;

    record.battery_millivolts = robot.battery_millivolts();
    record.analog = robot.read_all();

    let (left, right) = robot.counts();
    record.left_encoder = left;
    record.right_encoder = right;
}
