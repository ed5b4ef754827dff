// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Robot firmware entry point.
//!
//! The foreground runs the control loop every `LOOP_PERIOD_MS`. The I2C1 event and error
//! interrupts feed the register transport. The two meet only in `SHARED`.

#![cfg_attr(target_arch = "arm", no_std, no_main)]

#[cfg(target_arch = "arm")]
mod firmware {
    use core::cell::RefCell;

    use cortex_m::peripheral::NVIC;
    use cortex_m_rt::entry;
    use critical_section::Mutex;
    use log::LevelFilter;
    use panic_halt as _;

    use hal::{
        pac::{self, interrupt},
        prelude::*,
        serial::{Config, Serial},
        timer::{Channel1, Channel2, Channel3, Channel4},
    };
    use stm32f7xx_hal as hal;

    use romi_slave::{
        config::{SlaveConfig, LOOP_PERIOD_MS, STARTUP_TUNE},
        control::{ControlLoop, TunePlayer},
        hw::{
            usart, Adc, Board, BoardPins, Buzzer, ConsoleLogger, Encoder, I2cSlave, Motor, Usart,
        },
        shared::SharedBuffer,
        transport::RegisterSlave,
    };

    static SHARED: SharedBuffer = SharedBuffer::new();

    static LOGGER: ConsoleLogger<pac::USART1> = ConsoleLogger::new(LevelFilter::Info);

    static BUS: Mutex<RefCell<Option<(I2cSlave, RegisterSlave<'static>)>>> =
        Mutex::new(RefCell::new(None));

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let cp = cortex_m::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.sysclk(216.MHz()).freeze();
        let mut delay = cp.SYST.delay(&clocks);

        let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOC, dp.GPIOD, dp.GPIOE);

        // USART1 (DBG)
        let usart_cfg = Config {
            baud_rate: 115_200.bps(),
            ..Default::default()
        };
        let serial = Serial::new(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks, usart_cfg);
        LOGGER.attach(Usart::new(serial));
        // Fails only when a logger is already installed, which then stays in place.
        usart::init(&LOGGER).ok();

        // TIM4 PWM, 20 kHz
        let (left_in1, left_in2, right_in1, right_in2) = dp
            .TIM4
            .pwm_hz(
                (
                    Channel1::new(pins.motors.left_in1),
                    Channel2::new(pins.motors.left_in2),
                    Channel3::new(pins.motors.right_in1),
                    Channel4::new(pins.motors.right_in2),
                ),
                20.kHz(),
                &clocks,
            )
            .split();

        let mut board = Board::new(
            pins.leds,
            pins.buttons,
            (
                Motor::new(left_in1, left_in2),
                Motor::new(right_in1, right_in2),
            ),
            Adc::adc1(dp.ADC1),
            pins.analog,
            pins.battery,
            (Encoder::tim2(dp.TIM2), Encoder::tim3(dp.TIM3)),
            Buzzer::new(pins.buzzer),
        );

        // I2C1 slave
        let config = SlaveConfig::default();
        let i2c = I2cSlave::i2c1(dp.I2C1, &config);
        let _i2c_pins = pins.i2c1;
        critical_section::with(|cs| {
            BUS.borrow_ref_mut(cs)
                .replace((i2c, RegisterSlave::new(&SHARED, config)));
        });
        unsafe {
            NVIC::unmask(pac::Interrupt::I2C1_EV);
            NVIC::unmask(pac::Interrupt::I2C1_ER);
        }

        log::info!("romi-slave up at i2c address {}", config.address);

        let mut control = ControlLoop::new(&SHARED);
        board.play(STARTUP_TUNE);

        loop {
            control.step(&mut board);
            delay.delay_ms(LOOP_PERIOD_MS);
            board.tick(LOOP_PERIOD_MS);
        }
    }

    fn service_bus() {
        critical_section::with(|cs| {
            if let Some((i2c, slave)) = BUS.borrow_ref_mut(cs).as_mut() {
                i2c.service(slave);
            }
        });
    }

    #[interrupt]
    fn I2C1_EV() {
        service_bus();
    }

    #[interrupt]
    fn I2C1_ER() {
        service_bus();
    }
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
