// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 robot controller board.

use stm32f7xx_hal::{
    gpio::{
        gpioa, gpiob, gpioc, gpiod, gpioe, Alternate, Analog, Input, OpenDrain, Output, PullUp,
        PushPull,
    },
    pac,
    prelude::*,
};

/// ADC1 channels behind `AnalogPins`, in record order.
pub const ANALOG_ADC_CHANNELS: [u8; 6] = [10, 11, 12, 13, 14, 15];

/// ADC1 channel of the battery sense divider.
pub const BATTERY_ADC_CHANNEL: u8 = 3;

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub leds: LedPins,
    pub buttons: ButtonPins,
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub encoder: EncoderPins,
    pub motors: MotorPins,
    pub analog: AnalogPins,
    pub battery: gpioa::PA3<Analog>, // ADC1_IN3
    pub buzzer: gpiob::PB0<Output<PushPull>>,
}

pub struct LedPins {
    pub red: gpiod::PD8<Output<PushPull>>,
    pub yellow: gpiod::PD9<Output<PushPull>>,
    pub green: gpiod::PD10<Output<PushPull>>,
}

/// Buttons A/B/C, active low with internal pull-ups.
pub struct ButtonPins {
    pub a: gpioe::PE7<Input<PullUp>>,
    pub b: gpioe::PE8<Input<PullUp>>,
    pub c: gpioe::PE9<Input<PullUp>>,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// Host link. External pull-ups are on the host side.
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// TIM2/TIM3 Quadrature Encoder Inputs
pub struct EncoderPins {
    pub tim2_ch1: gpioa::PA0<Alternate<1>>,
    pub tim2_ch2: gpioa::PA1<Alternate<1>>,

    pub tim3_ch1: gpioa::PA6<Alternate<2>>,
    pub tim3_ch2: gpioa::PA7<Alternate<2>>,
}

/// H-bridge inputs on TIM4.
pub struct MotorPins {
    pub left_in1: gpiod::PD12<Alternate<2>>,  // TIM4_CH1
    pub left_in2: gpiod::PD13<Alternate<2>>,  // TIM4_CH2
    pub right_in1: gpiod::PD14<Alternate<2>>, // TIM4_CH3
    pub right_in2: gpiod::PD15<Alternate<2>>, // TIM4_CH4
}

/// General analog inputs, ADC1_IN10..IN15.
pub struct AnalogPins {
    pub a0: gpioc::PC0<Analog>,
    pub a1: gpioc::PC1<Analog>,
    pub a2: gpioc::PC2<Analog>,
    pub a3: gpioc::PC3<Analog>,
    pub a4: gpioc::PC4<Analog>,
    pub a5: gpioc::PC5<Analog>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(
        gpioa: pac::GPIOA,
        gpiob: pac::GPIOB,
        gpioc: pac::GPIOC,
        gpiod: pac::GPIOD,
        gpioe: pac::GPIOE,
    ) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpioc = gpioc.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            leds: LedPins {
                red: gpiod.pd8.into_push_pull_output(),
                yellow: gpiod.pd9.into_push_pull_output(),
                green: gpiod.pd10.into_push_pull_output(),
            },

            buttons: ButtonPins {
                a: gpioe.pe7.into_pull_up_input(),
                b: gpioe.pe8.into_pull_up_input(),
                c: gpioe.pe9.into_pull_up_input(),
            },

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            encoder: EncoderPins {
                tim2_ch1: gpioa.pa0.into_alternate::<1>(),
                tim2_ch2: gpioa.pa1.into_alternate::<1>(),
                tim3_ch1: gpioa.pa6.into_alternate::<2>(),
                tim3_ch2: gpioa.pa7.into_alternate::<2>(),
            },

            motors: MotorPins {
                left_in1: gpiod.pd12.into_alternate::<2>(),
                left_in2: gpiod.pd13.into_alternate::<2>(),
                right_in1: gpiod.pd14.into_alternate::<2>(),
                right_in2: gpiod.pd15.into_alternate::<2>(),
            },

            analog: AnalogPins {
                a0: gpioc.pc0.into_analog(),
                a1: gpioc.pc1.into_analog(),
                a2: gpioc.pc2.into_analog(),
                a3: gpioc.pc3.into_analog(),
                a4: gpioc.pc4.into_analog(),
                a5: gpioc.pc5.into_analog(),
            },

            battery: gpioa.pa3.into_analog(),
            buzzer: gpiob.pb0.into_push_pull_output(),
        }
    }
}
