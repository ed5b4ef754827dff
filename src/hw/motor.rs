// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Drive motor on a two-input H-bridge (IN1/IN2 PWM).
//!
//! Forward drives IN1 with PWM and holds IN2 low; reverse swaps them. Zero coasts.

use stm32f7xx_hal::prelude::*;

use crate::control::scaling::motor_duty;

pub struct Motor<In1, In2> {
    in1: In1,
    in2: In2,
    speed: i16,
}

impl<In1, In2> Motor<In1, In2>
where
    In1: _embedded_hal_PwmPin<Duty = u16>,
    In2: _embedded_hal_PwmPin<Duty = u16>,
{
    /// Take both PWM channels, enabled at zero duty.
    pub fn new(mut in1: In1, mut in2: In2) -> Self {
        in1.set_duty(0);
        in2.set_duty(0);
        in1.enable();
        in2.enable();
        Self { in1, in2, speed: 0 }
    }

    /// Signed speed in `±MOTOR_MAX_SPEED`; larger commands are clamped.
    pub fn set_speed(&mut self, speed: i16) {
        if speed == self.speed {
            return;
        }
        let (forward, reverse) = motor_duty(speed, self.in1.get_max_duty());
        self.in1.set_duty(forward);
        self.in2.set_duty(reverse);
        self.speed = speed;
    }

    #[inline]
    pub fn speed(&self) -> i16 {
        self.speed
    }

    pub fn free(mut self) -> (In1, In2) {
        self.in1.set_duty(0);
        self.in2.set_duty(0);
        (self.in1, self.in2)
    }
}
