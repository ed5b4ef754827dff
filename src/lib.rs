// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Romi Slave Firmware
//!
//! Firmware for a small differential-drive robot, written in Rust, targeting an STM32F777 MCU.
//! The robot's LEDs, buttons, motors, buzzer, battery sense, analog inputs and wheel encoders are
//! exposed to a host controller as a block of I2C registers.
//!
//! The core is a double-buffered record shared between the I2C interrupt and the foreground
//! control loop: the loop works on a private copy, takes master writes with `pull_latest()` and
//! hands its results back with `publish()`. Neither side ever observes a half-written record.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`config`] | Addresses, timing and scaling constants; `SlaveConfig` |
//! | [`protocol`] | Register map, record codec, note scripts |
//! | [`shared`] | Working / published copies and the master mailbox |
//! | [`transport`] | Interrupt-driven I2C register slave state machine |
//! | [`control`] | Control loop, sound hand-off, hardware traits |
//! | [`master`] | Host-side client over any `embedded-hal` I2C bus |
//! | [`lsm6`] | Host-side driver for the LSM6 IMU on the same bus |
//! | `hw` | STM32F7 peripheral wrappers and the assembled board (ARM only) |
//!
//! ## Getting Started
//!
//! Run the host-side tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod lsm6;
pub mod master;
pub mod protocol;
pub mod shared;
pub mod transport;

#[cfg(target_arch = "arm")]
pub mod hw;
