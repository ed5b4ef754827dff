// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

pub mod adc;
pub mod board;
pub mod buzzer;
pub mod encoder;
pub mod i2c_slave;
pub mod led;
pub mod motor;
pub mod pins;
pub mod usart;

pub use adc::Adc;
pub use board::Board;
pub use buzzer::Buzzer;
pub use encoder::Encoder;
pub use i2c_slave::I2cSlave;
pub use led::Led;
pub use motor::Motor;
pub use pins::BoardPins;
pub use usart::{ConsoleLogger, Usart};
