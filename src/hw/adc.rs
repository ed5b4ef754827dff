// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Blocking single-channel ADC1 reads through the PAC.
//!
//! Example:
//! ```no_run
//! let adc = Adc::adc1(dp.ADC1);
//! let raw = adc.read(10);
//! ```

use stm32f7xx_hal::pac;

pub struct Adc {
    adc: pac::ADC1,
}

impl Adc {
    /// Enable and configure ADC1: 12-bit, right-aligned, software trigger.
    pub fn adc1(adc1: pac::ADC1) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.adc1en().set_bit());

        // PCLK2 / 4
        let common = unsafe { &*pac::ADC_COMMON::ptr() };
        common.ccr.modify(|_, w| w.adcpre().div4());

        adc1.cr2.modify(|_, w| w.adon().clear_bit());
        adc1.cr1.modify(|_, w| w.res().bits(0b00));
        adc1.cr2.modify(|_, w| {
            w.cont().clear_bit();
            w.align().right();
            w.exten().disabled();
            w
        });

        // Longest sample time on every channel; the sources are high impedance.
        adc1.smpr1.write(|w| unsafe { w.bits(0x07FF_FFFF) });
        adc1.smpr2.write(|w| unsafe { w.bits(0x3FFF_FFFF) });

        // One conversion per sequence
        adc1.sqr1.modify(|_, w| w.l().bits(0));

        adc1.cr2.modify(|_, w| w.adon().set_bit());

        Self { adc: adc1 }
    }

    /// Convert `channel` once and return the raw 12-bit count.
    pub fn read(&self, channel: u8) -> u16 {
        self.adc
            .sqr3
            .modify(|_, w| unsafe { w.sq1().bits(channel & 0x1F) });
        self.adc.cr2.modify(|_, w| w.swstart().set_bit());

        while self.adc.sr.read().eoc().bit_is_clear() {}

        self.adc.dr.read().data().bits()
    }

    #[inline]
    pub fn free(self) -> pac::ADC1 {
        self.adc
    }
}
