// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debug console on a USART.
//!
//! [`Usart`] is a blocking transmit-only wrapper. [`ConsoleLogger`] installs it as the `log`
//! backend so every `log::info!` and friends lands on the debug terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::cell::RefCell;
use core::fmt::{self, Write as _};

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// `log` backend writing one CRLF-terminated line per record.
///
/// Lives in a `static`; the USART is attached once the clocks are up. Records logged before that
/// are dropped.
pub struct ConsoleLogger<U: Instance> {
    console: Mutex<RefCell<Option<Usart<U>>>>,
    level: LevelFilter,
}

impl<U: Instance> ConsoleLogger<U> {
    pub const fn new(level: LevelFilter) -> Self {
        Self {
            console: Mutex::new(RefCell::new(None)),
            level,
        }
    }

    /// Hand the console USART to the logger.
    pub fn attach(&self, usart: Usart<U>) {
        critical_section::with(|cs| {
            self.console.borrow_ref_mut(cs).replace(usart);
        });
    }
}

impl<U> Log for ConsoleLogger<U>
where
    U: Instance + Send,
{
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        critical_section::with(|cs| {
            if let Some(usart) = self.console.borrow_ref_mut(cs).as_mut() {
                let _ = write!(usart, "[{}] {}\r\n", record.level(), record.args());
            }
        });
    }

    fn flush(&self) {
        critical_section::with(|cs| {
            if let Some(usart) = self.console.borrow_ref_mut(cs).as_mut() {
                usart.flush();
            }
        });
    }
}

/// Install `logger` as the global `log` backend at its configured level.
pub fn init<U>(logger: &'static ConsoleLogger<U>) -> Result<(), SetLoggerError>
where
    U: Instance + Send,
{
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}
