// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hardware collaborators used by the control loop.
//!
//! Each trait is the narrow slice of a peripheral driver the loop needs. Hardware reads are not
//! fallible here: a driver that cannot get a fresh value returns its last one.

use crate::config::ANALOG_CHANNELS;

/// Yellow / green / red indicator LEDs.
pub trait Indicators {
    fn set_indicators(&mut self, yellow: bool, green: bool, red: bool);
}

/// The three momentary push buttons, `true` while pressed.
pub trait Buttons {
    fn buttons(&mut self) -> [bool; 3];
}

/// Left and right drive motors.
pub trait DriveMotors {
    /// Signed speed commands; the driver clamps to its symmetric range.
    fn set_speeds(&mut self, left: i16, right: i16);
}

/// Battery voltage sense.
pub trait BatterySense {
    fn battery_millivolts(&mut self) -> u16;
}

/// Analog inputs, sampled as raw ADC counts.
pub trait AnalogInputs {
    /// Raw sample of `channel` (`0..ANALOG_CHANNELS`).
    fn read_analog(&mut self, channel: usize) -> u16;

    /// Sample every channel in order.
    fn read_all(&mut self) -> [u16; ANALOG_CHANNELS] {
        let mut samples = [0u16; ANALOG_CHANNELS];
        for (channel, sample) in samples.iter_mut().enumerate() {
            *sample = self.read_analog(channel);
        }
        samples
    }
}

/// Buzzer tune playback.
pub trait TunePlayer {
    /// Start playing `notes`, replacing anything already playing.
    fn play(&mut self, notes: &str);

    /// True until the current tune has finished.
    fn is_playing(&mut self) -> bool;
}

/// Quadrature wheel encoders. Counts wrap around at the `i16` limits.
pub trait WheelEncoders {
    /// `(left, right)` counts.
    fn counts(&mut self) -> (i16, i16);
}

/// Everything the control loop drives or samples.
pub trait Robot:
    Indicators + Buttons + DriveMotors + BatterySense + AnalogInputs + TunePlayer + WheelEncoders
{
}

impl<T> Robot for T where
    T: Indicators + Buttons + DriveMotors + BatterySense + AnalogInputs + TunePlayer + WheelEncoders
{
}
