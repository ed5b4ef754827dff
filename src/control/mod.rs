// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Loop
//!
//! The foreground side of the robot: everything that runs between two `pull_latest()` /
//! `publish()` hand-offs.
//!
//! ## Modules
//!
//! - [`control_loop`] - One iteration of read-commands, sample-hardware, publish.
//! - [`peripherals`] - Traits for the hardware the loop drives and samples.
//! - [`scaling`] - Motor duty and ADC unit conversions.
//! - [`sound`] - Play-notes hand-off state machine.

pub mod control_loop;
pub mod peripherals;
pub mod scaling;
pub mod sound;

pub use control_loop::ControlLoop;
pub use peripherals::{
    AnalogInputs, BatterySense, Buttons, DriveMotors, Indicators, Robot, TunePlayer, WheelEncoders,
};
pub use sound::{SoundEvent, SoundSequencer, SoundState};
