// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Firmware configuration.
//!
//! Compile-time constants shared by the protocol core and the board support code, plus the
//! runtime [`SlaveConfig`] handed to the register transport.

/// 7-bit I2C address the robot answers on.
pub const DEVICE_ADDRESS: u8 = 20;

/// Largest register window the slave transport can expose, in bytes.
pub const REGISTER_WINDOW: usize = 64;

/// Byte served when the master reads past the end of the record.
pub const READ_FILL: u8 = 0x00;

/// Number of analog channels sampled every loop iteration.
pub const ANALOG_CHANNELS: usize = 6;

/// Capacity of the note script field, in bytes.
pub const NOTE_CAPACITY: usize = 14;

/// Control loop period (ms).
pub const LOOP_PERIOD_MS: u32 = 10;

/// Motor speed command that maps to full PWM duty. Larger commands are clamped.
pub const MOTOR_MAX_SPEED: i16 = 300;

/// Battery sense divider: the ADC sees `1 / BATTERY_DIVIDER` of the pack voltage.
pub const BATTERY_DIVIDER: u32 = 3;

/// ADC reference voltage (mV).
pub const ADC_VREF_MV: u32 = 3300;

/// Full-scale count of the 12-bit ADC.
pub const ADC_FULL_SCALE: u32 = 4095;

/// Tune played once at power-up.
pub const STARTUP_TUNE: &str = "v10>>g16>>>c16";

/// Settle time the master waits after moving the register pointer (µs).
pub const POINTER_SETTLE_US: u32 = 100;

/// I2C1 TIMINGR word (setup/hold delays for slave mode at 216 MHz PCLK1/4).
pub const I2C_TIMINGR: u32 = 0x0010_0000;

/// Runtime configuration for the register transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlaveConfig {
    /// 7-bit bus address.
    pub address: u8,
    /// Byte served for reads outside the record.
    pub read_fill: u8,
}

impl SlaveConfig {
    pub const fn new() -> Self {
        Self {
            address: DEVICE_ADDRESS,
            read_fill: READ_FILL,
        }
    }

    /// Answer on a different 7-bit address.
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address & 0x7F;
        self
    }

    /// Serve `fill` for reads outside the record.
    pub const fn with_read_fill(mut self, fill: u8) -> Self {
        self.read_fill = fill;
        self
    }
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let cfg = SlaveConfig::default().with_address(0x94).with_read_fill(0xFF);
        assert_eq!(cfg.address, 0x14);
        assert_eq!(cfg.read_fill, 0xFF);
        assert_eq!(SlaveConfig::new().address, 20);
    }
}
