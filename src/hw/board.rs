// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The assembled robot: every peripheral the control loop touches, behind the collaborator traits.

use stm32f7xx_hal::{
    gpio::{gpioa, Analog},
    pac,
    prelude::*,
};

use super::{
    adc::Adc,
    buzzer::Buzzer,
    encoder::Encoder,
    led::Led,
    motor::Motor,
    pins::{AnalogPins, ButtonPins, LedPins, ANALOG_ADC_CHANNELS, BATTERY_ADC_CHANNEL},
};
use crate::control::peripherals::{
    AnalogInputs, BatterySense, Buttons, DriveMotors, Indicators, TunePlayer, WheelEncoders,
};
use crate::control::scaling;

pub struct Board<LA, LB, RA, RB> {
    yellow: Led<'D', 9>,
    green: Led<'D', 10>,
    red: Led<'D', 8>,
    buttons: ButtonPins,
    left_motor: Motor<LA, LB>,
    right_motor: Motor<RA, RB>,
    adc: Adc,
    _analog: AnalogPins,
    _battery: gpioa::PA3<Analog>,
    left_encoder: Encoder<pac::TIM2>,
    right_encoder: Encoder<pac::TIM3>,
    buzzer: Buzzer<'B', 0>,
}

impl<LA, LB, RA, RB> Board<LA, LB, RA, RB>
where
    LA: _embedded_hal_PwmPin<Duty = u16>,
    LB: _embedded_hal_PwmPin<Duty = u16>,
    RA: _embedded_hal_PwmPin<Duty = u16>,
    RB: _embedded_hal_PwmPin<Duty = u16>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        leds: LedPins,
        buttons: ButtonPins,
        motors: (Motor<LA, LB>, Motor<RA, RB>),
        adc: Adc,
        analog: AnalogPins,
        battery: gpioa::PA3<Analog>,
        encoders: (Encoder<pac::TIM2>, Encoder<pac::TIM3>),
        buzzer: Buzzer<'B', 0>,
    ) -> Self {
        Self {
            yellow: Led::active_high(leds.yellow),
            green: Led::active_high(leds.green),
            red: Led::active_high(leds.red),
            buttons,
            left_motor: motors.0,
            right_motor: motors.1,
            adc,
            _analog: analog,
            _battery: battery,
            left_encoder: encoders.0,
            right_encoder: encoders.1,
            buzzer,
        }
    }

    /// Advance time-based peripherals by `ms` milliseconds.
    #[inline]
    pub fn tick(&mut self, ms: u32) {
        self.buzzer.tick(ms);
    }
}

impl<LA, LB, RA, RB> Indicators for Board<LA, LB, RA, RB> {
    fn set_indicators(&mut self, yellow: bool, green: bool, red: bool) {
        self.yellow.set(yellow);
        self.green.set(green);
        self.red.set(red);
    }
}

impl<LA, LB, RA, RB> Buttons for Board<LA, LB, RA, RB> {
    fn buttons(&mut self) -> [bool; 3] {
        [
            self.buttons.a.is_low(),
            self.buttons.b.is_low(),
            self.buttons.c.is_low(),
        ]
    }
}

impl<LA, LB, RA, RB> DriveMotors for Board<LA, LB, RA, RB>
where
    LA: _embedded_hal_PwmPin<Duty = u16>,
    LB: _embedded_hal_PwmPin<Duty = u16>,
    RA: _embedded_hal_PwmPin<Duty = u16>,
    RB: _embedded_hal_PwmPin<Duty = u16>,
{
    fn set_speeds(&mut self, left: i16, right: i16) {
        self.left_motor.set_speed(left);
        self.right_motor.set_speed(right);
    }
}

impl<LA, LB, RA, RB> BatterySense for Board<LA, LB, RA, RB> {
    fn battery_millivolts(&mut self) -> u16 {
        scaling::battery_millivolts(self.adc.read(BATTERY_ADC_CHANNEL))
    }
}

impl<LA, LB, RA, RB> AnalogInputs for Board<LA, LB, RA, RB> {
    fn read_analog(&mut self, channel: usize) -> u16 {
        match ANALOG_ADC_CHANNELS.get(channel) {
            Some(&adc_channel) => self.adc.read(adc_channel),
            None => 0,
        }
    }
}

impl<LA, LB, RA, RB> TunePlayer for Board<LA, LB, RA, RB> {
    fn play(&mut self, notes: &str) {
        self.buzzer.play(notes);
    }

    fn is_playing(&mut self) -> bool {
        self.buzzer.is_playing()
    }
}

impl<LA, LB, RA, RB> WheelEncoders for Board<LA, LB, RA, RB> {
    fn counts(&mut self) -> (i16, i16) {
        (self.left_encoder.count(), self.right_encoder.count())
    }
}
