// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! I2C1 in slave mode, driven from its event interrupt.
//!
//! The peripheral does the electrical work (address match, clock stretching, ACK). This wrapper
//! turns its status flags into [`RegisterSlave`] events; call [`I2cSlave::service`] from the
//! `I2C1_EV` handler.
//!
//! Pins: SCL on PB8, SDA on PB9 (AF4, open drain).

use stm32f7xx_hal::pac;

use crate::config::{SlaveConfig, I2C_TIMINGR};
use crate::transport::{Direction, RegisterSlave};

pub struct I2cSlave {
    i2c: pac::I2C1,
}

impl I2cSlave {
    /// Enable I2C1 as a slave answering on `config.address`.
    pub fn i2c1(i2c1: pac::I2C1, config: &SlaveConfig) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.i2c1en().set_bit());

        // Disable while configuring
        i2c1.cr1.modify(|_, w| w.pe().clear_bit());

        i2c1.timingr.write(|w| unsafe { w.bits(I2C_TIMINGR) });

        // 7-bit own address lives in OA1[7:1]
        i2c1.oar1.write(|w| w.oa1en().clear_bit());
        i2c1.oar1.write(|w| {
            w.oa1()
                .bits((config.address as u16) << 1)
                .oa1mode()
                .clear_bit()
                .oa1en()
                .set_bit()
        });

        i2c1.cr1.modify(|_, w| {
            w.addrie()
                .set_bit()
                .rxie()
                .set_bit()
                .txie()
                .set_bit()
                .stopie()
                .set_bit()
                .nackie()
                .set_bit()
                .errie()
                .set_bit()
                .pe()
                .set_bit()
        });

        Self { i2c: i2c1 }
    }

    /// Forward every pending bus event to `slave`. Runs to completion.
    pub fn service(&mut self, slave: &mut RegisterSlave<'_>) {
        let isr = self.i2c.isr.read();

        // A byte received just before a repeated START belongs to the old transaction.
        if isr.rxne().bit_is_set() {
            let byte = self.i2c.rxdr.read().rxdata().bits();
            let _ = slave.on_receive(byte);
        }

        if isr.addr().bit_is_set() {
            let direction = if isr.dir().bit_is_set() {
                // Drop whatever a previous read left in TXDR.
                self.i2c.isr.modify(|_, w| w.txe().set_bit());
                Direction::Read
            } else {
                Direction::Write
            };
            slave.on_address(direction);
            self.i2c.icr.write(|w| w.addrcf().set_bit());
        }

        if self.i2c.isr.read().txis().bit_is_set() {
            let byte = slave.on_transmit();
            self.i2c.txdr.write(|w| w.txdata().bits(byte));
        }

        if isr.nackf().bit_is_set() {
            slave.on_nack();
            self.i2c.icr.write(|w| w.nackcf().set_bit());
        }

        if isr.berr().bit_is_set() || isr.arlo().bit_is_set() || isr.ovr().bit_is_set() {
            log::warn!("i2c1 bus fault, isr={:#010x}", isr.bits());
            self.i2c.icr.write(|w| {
                w.berrcf()
                    .set_bit()
                    .arlocf()
                    .set_bit()
                    .ovrcf()
                    .set_bit()
            });
            slave.on_stop();
        }

        if isr.stopf().bit_is_set() {
            slave.on_stop();
            self.i2c.icr.write(|w| w.stopcf().set_bit());
        }
    }

    #[inline]
    pub fn free(self) -> pac::I2C1 {
        self.i2c
    }
}
