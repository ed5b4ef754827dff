// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel encoders on STM32F7 timers in quadrature mode.
//!
//! TIM2 counts the left wheel and TIM3 the right. The record carries 16-bit counts that wrap, so
//! both timers are read through their low 16 bits.

use stm32f7xx_hal::pac;

pub struct Encoder<TIM> {
    tim: TIM,
}

impl<TIM> Encoder<TIM> {
    #[inline]
    pub fn free(self) -> TIM {
        self.tim
    }
}

/// Encoder mode 3 (count on both TI1 and TI2 edges), CH1/CH2 mapped to TI1/TI2, non-inverted.
macro_rules! quadrature_setup {
    ($tim:expr) => {{
        $tim.cr1.modify(|_, w| w.cen().clear_bit());
        $tim.smcr.modify(|_, w| w.sms().bits(0b011));
        $tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());
        $tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });
    }};
}

impl Encoder<pac::TIM2> {
    /// Left wheel encoder (PA0/PA1).
    pub fn tim2(tim2: pac::TIM2) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        quadrature_setup!(tim2);
        tim2.arr.write(|w| w.bits(0xFFFF_FFFF));
        tim2.cnt.write(|w| w.bits(0));
        tim2.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim: tim2 }
    }

    /// Signed count, wrapping at the `i16` limits.
    #[inline]
    pub fn count(&self) -> i16 {
        self.tim.cnt.read().cnt().bits() as u16 as i16
    }
}

impl Encoder<pac::TIM3> {
    /// Right wheel encoder (PA6/PA7).
    pub fn tim3(tim3: pac::TIM3) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        quadrature_setup!(tim3);
        tim3.arr.write(|w| unsafe { w.bits(0xFFFF) });
        tim3.cnt.write(|w| unsafe { w.bits(0) });
        tim3.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim: tim3 }
    }

    /// Signed count, wrapping at the `i16` limits.
    #[inline]
    pub fn count(&self) -> i16 {
        self.tim.cnt.read().cnt().bits() as i16
    }
}
